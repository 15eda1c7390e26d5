//! The static platform table and artifact naming.
//!
//! Every platform the bindings are published for has exactly one row here.
//! Supporting a new platform means adding a row and making sure the external
//! build pipeline produces `index.<triple>.<ext>` for it.

use std::collections::HashSet;

use serde::Serialize;

use crate::platform::{Architecture, OperatingSystem, PlatformKey};
use crate::triple::TargetTriple;

/// One row of the platform table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PlatformEntry {
    pub key: PlatformKey,
    pub triple: TargetTriple,
}

impl PlatformEntry {
    pub const fn new(key: PlatformKey, triple: TargetTriple) -> Self {
        Self { key, triple }
    }

    /// Expected artifact file name, `index.<triple>.<ext>`.
    pub fn artifact_filename(&self) -> String {
        format!("index.{}.{}", self.triple, self.key.os.library_extension())
    }
}

/// Supported platforms, in the order they are reported.
pub static PLATFORMS: [PlatformEntry; 4] = [
    PlatformEntry::new(
        PlatformKey::new(OperatingSystem::Linux, Architecture::X64),
        TargetTriple::from_static("x86_64-unknown-linux-gnu"),
    ),
    PlatformEntry::new(
        PlatformKey::new(OperatingSystem::Darwin, Architecture::X64),
        TargetTriple::from_static("x86_64-apple-darwin"),
    ),
    PlatformEntry::new(
        PlatformKey::new(OperatingSystem::Darwin, Architecture::Arm64),
        TargetTriple::from_static("aarch64-apple-darwin"),
    ),
    PlatformEntry::new(
        PlatformKey::new(OperatingSystem::Win32, Architecture::X64),
        TargetTriple::from_static("x86_64-pc-windows-msvc"),
    ),
];

/// Find the table row for a platform key.
pub fn lookup(key: &PlatformKey) -> Option<&'static PlatformEntry> {
    PLATFORMS.iter().find(|entry| &entry.key == key)
}

/// All supported platform keys, in table order.
pub fn supported_keys() -> Vec<PlatformKey> {
    PLATFORMS.iter().map(|entry| entry.key.clone()).collect()
}

/// A problem found in a platform table.
#[derive(Debug, Clone)]
pub struct ValidationIssue {
    /// Severity: "error" or "warning".
    pub severity: &'static str,
    /// Human-readable description.
    pub message: String,
}

/// Check a platform table for structural correctness.
///
/// Returns `Ok(())` if valid, or `Err(issues)` with a list of problems.
pub fn validate_table(entries: &[PlatformEntry]) -> Result<(), Vec<ValidationIssue>> {
    let mut issues = Vec::new();
    let mut keys = HashSet::new();
    let mut triples = HashSet::new();

    for entry in entries {
        // 1. Keys are unique, otherwise lookup is order-dependent
        if !keys.insert(&entry.key) {
            issues.push(ValidationIssue {
                severity: "error",
                message: format!("platform key '{}' appears more than once", entry.key),
            });
        }

        // 2. Each triple names exactly one artifact
        if !triples.insert(&entry.triple) {
            issues.push(ValidationIssue {
                severity: "error",
                message: format!("target triple '{}' appears more than once", entry.triple),
            });
        }

        // 3. Keys use the known vocabulary
        if let OperatingSystem::Other(os) = &entry.key.os {
            issues.push(ValidationIssue {
                severity: "error",
                message: format!("platform key '{}' has unknown operating system '{os}'", entry.key),
            });
        }
        if let Architecture::Other(arch) = &entry.key.arch {
            issues.push(ValidationIssue {
                severity: "error",
                message: format!("platform key '{}' has unknown architecture '{arch}'", entry.key),
            });
        }

        // 4. Triple is well-formed
        if let Err(e) = entry.triple.check() {
            issues.push(ValidationIssue {
                severity: "error",
                message: e.to_string(),
            });
            continue;
        }

        // 5. Triple OS agrees with the key's OS
        let expected_os = match entry.key.os {
            OperatingSystem::Linux => Some("linux"),
            OperatingSystem::Darwin => Some("darwin"),
            OperatingSystem::Win32 => Some("windows"),
            OperatingSystem::Other(_) => None,
        };
        if let Some(expected) = expected_os {
            if entry.triple.os() != Some(expected) {
                issues.push(ValidationIssue {
                    severity: "error",
                    message: format!(
                        "platform key '{}' maps to '{}' whose OS is not '{expected}'",
                        entry.key, entry.triple
                    ),
                });
            }
        }

        // 6. Triple arch agrees with the key's arch
        let expected_arch = match entry.key.arch {
            Architecture::X64 => Some("x86_64"),
            Architecture::Arm64 => Some("aarch64"),
            Architecture::Other(_) => None,
        };
        if let Some(expected) = expected_arch {
            if entry.triple.arch() != Some(expected) {
                issues.push(ValidationIssue {
                    severity: "warning",
                    message: format!(
                        "platform key '{}' maps to '{}' whose arch is not '{expected}'",
                        entry.key, entry.triple
                    ),
                });
            }
        }
    }

    if issues.is_empty() {
        Ok(())
    } else {
        Err(issues)
    }
}
