//! Target triples identifying a compiled binding artifact.

use std::borrow::Cow;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::{Result, TargetError};

/// A build target identifier such as `x86_64-unknown-linux-gnu`.
///
/// Shaped `arch-vendor-os[-env]`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TargetTriple(Cow<'static, str>);

impl TargetTriple {
    /// Wrap a triple known at compile time. Not validated; see [`TargetTriple::parse`].
    pub const fn from_static(triple: &'static str) -> Self {
        Self(Cow::Borrowed(triple))
    }

    /// Parse and validate a triple.
    pub fn parse(triple: &str) -> Result<Self> {
        let parsed = Self(Cow::Owned(triple.to_string()));
        parsed.check()?;
        Ok(parsed)
    }

    /// Validate the `arch-vendor-os[-env]` shape.
    pub fn check(&self) -> Result<()> {
        let parts: Vec<&str> = self.0.split('-').collect();
        if !(3..=4).contains(&parts.len()) {
            return Err(TargetError::InvalidTriple {
                triple: self.0.to_string(),
                detail: format!("expected 3 or 4 components, found {}", parts.len()),
            });
        }
        if let Some(pos) = parts.iter().position(|p| p.is_empty()) {
            return Err(TargetError::InvalidTriple {
                triple: self.0.to_string(),
                detail: format!("component {} is empty", pos + 1),
            });
        }
        Ok(())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    fn component(&self, index: usize) -> Option<&str> {
        self.0.split('-').nth(index)
    }

    /// CPU architecture component, e.g. `x86_64`.
    pub fn arch(&self) -> Option<&str> {
        self.component(0)
    }

    /// Vendor component, e.g. `unknown`, `apple`, `pc`.
    pub fn vendor(&self) -> Option<&str> {
        self.component(1)
    }

    /// Operating system component, e.g. `linux`, `darwin`, `windows`.
    pub fn os(&self) -> Option<&str> {
        self.component(2)
    }

    /// Environment/ABI component if present, e.g. `gnu`, `msvc`.
    pub fn env(&self) -> Option<&str> {
        self.component(3)
    }
}

impl fmt::Display for TargetTriple {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
