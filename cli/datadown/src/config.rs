//! `datadown.toml` configuration discovery.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use datadown_ffi::OutputFormat;
use datadown_loader::ResolverConfig;
use serde::{Deserialize, Serialize};

/// File name searched for from the working directory upward.
pub const CONFIG_FILE: &str = "datadown.toml";

/// The top-level configuration structure.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DatadownConfig {
    /// Native binding location.
    #[serde(default)]
    pub binding: BindingConfig,
    /// Conversion defaults.
    #[serde(default)]
    pub convert: ConvertConfig,
}

/// `[binding]` section.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct BindingConfig {
    /// Directory holding `index.<triple>.<ext>`, relative to the config file.
    #[serde(default)]
    pub directory: Option<PathBuf>,
}

/// `[convert]` section.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ConvertConfig {
    /// Default output format.
    #[serde(default)]
    pub format: Option<String>,
}

impl DatadownConfig {
    /// Search upward from `start_dir` for a `datadown.toml` file, parse and
    /// return it along with the directory it was found in.
    pub fn find_and_load(start_dir: &Path) -> Result<Option<(Self, PathBuf)>> {
        let mut dir = start_dir.to_path_buf();
        loop {
            let candidate = dir.join(CONFIG_FILE);
            if candidate.is_file() {
                let content = std::fs::read_to_string(&candidate)
                    .with_context(|| format!("reading {}", candidate.display()))?;
                let config: DatadownConfig = toml::from_str(&content)
                    .with_context(|| format!("parsing {}", candidate.display()))?;
                log::debug!("using configuration {}", candidate.display());
                return Ok(Some((config, dir)));
            }
            if !dir.pop() {
                break;
            }
        }
        Ok(None)
    }

    /// Parse a configuration from a TOML string.
    #[cfg(test)]
    pub fn from_str(s: &str) -> Result<Self> {
        toml::from_str(s).context("parsing datadown.toml")
    }

    /// Resolver settings, with a relative binding directory anchored at `config_dir`.
    pub fn resolver_config(&self, config_dir: &Path) -> ResolverConfig {
        ResolverConfig {
            binding_dir: self.binding.directory.as_ref().map(|d| config_dir.join(d)),
        }
    }

    /// Configured default output format, if any.
    pub fn default_format(&self) -> Result<Option<OutputFormat>> {
        self.convert
            .format
            .as_deref()
            .map(|f| f.parse::<OutputFormat>().context("[convert] format in datadown.toml"))
            .transpose()
    }
}
