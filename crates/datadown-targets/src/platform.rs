//! Host operating system, CPU architecture, and the composite platform key.
//!
//! Names follow the vocabulary the precompiled bindings are published under
//! (`linux`, `darwin`, `win32` / `x64`, `arm64`), not Rust's own
//! `std::env::consts` names. Hosts outside the vocabulary are still
//! representable so they can be reported as unsupported.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{Result, TargetError};

/// Operating system component of a platform key.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum OperatingSystem {
    Linux,
    Darwin,
    Win32,
    /// Any operating system outside the known vocabulary.
    Other(String),
}

impl OperatingSystem {
    /// Parse a binding-vocabulary name (`linux`, `darwin`, `win32`).
    pub fn from_name(name: &str) -> Self {
        match name {
            "linux" => Self::Linux,
            "darwin" => Self::Darwin,
            "win32" => Self::Win32,
            other => Self::Other(other.to_string()),
        }
    }

    /// Map a `std::env::consts::OS` value into the binding vocabulary.
    pub fn from_rust_os(os: &str) -> Self {
        match os {
            "linux" => Self::Linux,
            "macos" => Self::Darwin,
            "windows" => Self::Win32,
            other => Self::Other(other.to_string()),
        }
    }

    /// The operating system of the running process.
    pub fn host() -> Self {
        Self::from_rust_os(std::env::consts::OS)
    }

    pub fn as_str(&self) -> &str {
        match self {
            Self::Linux => "linux",
            Self::Darwin => "darwin",
            Self::Win32 => "win32",
            Self::Other(name) => name,
        }
    }

    /// File extension of a dynamic library on this operating system.
    ///
    /// Unknown systems fall back to `so`; they never have a table entry, so
    /// no artifact is ever derived for them.
    pub fn library_extension(&self) -> &'static str {
        match self {
            Self::Darwin => "dylib",
            Self::Win32 => "dll",
            Self::Linux | Self::Other(_) => "so",
        }
    }
}

impl fmt::Display for OperatingSystem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl From<String> for OperatingSystem {
    fn from(s: String) -> Self {
        Self::from_name(&s)
    }
}

impl From<OperatingSystem> for String {
    fn from(os: OperatingSystem) -> Self {
        os.as_str().to_string()
    }
}

/// CPU architecture component of a platform key.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum Architecture {
    X64,
    Arm64,
    /// Any architecture outside the known vocabulary.
    Other(String),
}

impl Architecture {
    /// Parse a binding-vocabulary name (`x64`, `arm64`).
    pub fn from_name(name: &str) -> Self {
        match name {
            "x64" => Self::X64,
            "arm64" => Self::Arm64,
            other => Self::Other(other.to_string()),
        }
    }

    /// Map a `std::env::consts::ARCH` value into the binding vocabulary.
    pub fn from_rust_arch(arch: &str) -> Self {
        match arch {
            "x86_64" => Self::X64,
            "aarch64" => Self::Arm64,
            other => Self::Other(other.to_string()),
        }
    }

    /// The architecture of the running process.
    pub fn host() -> Self {
        Self::from_rust_arch(std::env::consts::ARCH)
    }

    pub fn as_str(&self) -> &str {
        match self {
            Self::X64 => "x64",
            Self::Arm64 => "arm64",
            Self::Other(name) => name,
        }
    }
}

impl fmt::Display for Architecture {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl From<String> for Architecture {
    fn from(s: String) -> Self {
        Self::from_name(&s)
    }
}

impl From<Architecture> for String {
    fn from(arch: Architecture) -> Self {
        arch.as_str().to_string()
    }
}

/// Composite `(os, arch)` identity of a host, displayed as `<os>-<arch>`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct PlatformKey {
    pub os: OperatingSystem,
    pub arch: Architecture,
}

impl PlatformKey {
    pub const fn new(os: OperatingSystem, arch: Architecture) -> Self {
        Self { os, arch }
    }

    /// Form the key of the running process.
    pub fn host() -> Self {
        Self::new(OperatingSystem::host(), Architecture::host())
    }

    /// Form a key from binding-vocabulary names, e.g. `("darwin", "arm64")`.
    pub fn from_names(os: &str, arch: &str) -> Self {
        Self::new(OperatingSystem::from_name(os), Architecture::from_name(arch))
    }
}

impl fmt::Display for PlatformKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}", self.os, self.arch)
    }
}

impl FromStr for PlatformKey {
    type Err = TargetError;

    fn from_str(s: &str) -> Result<Self> {
        match s.split_once('-') {
            Some((os, arch)) if !os.is_empty() && !arch.is_empty() => {
                Ok(Self::from_names(os, arch))
            }
            _ => Err(TargetError::InvalidPlatformKey { key: s.to_string() }),
        }
    }
}

impl TryFrom<String> for PlatformKey {
    type Error = TargetError;

    fn try_from(s: String) -> Result<Self> {
        s.parse()
    }
}

impl From<PlatformKey> for String {
    fn from(key: PlatformKey) -> Self {
        key.to_string()
    }
}
