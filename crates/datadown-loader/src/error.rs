//! Binding resolution errors.
//!
//! Both variants are terminal: host identity does not change within a
//! process, and a missing or broken artifact does not fix itself.

use std::error::Error as StdError;
use std::path::PathBuf;

use datadown_targets::PlatformKey;

/// Why a binding could not be produced.
#[derive(Debug, thiserror::Error)]
pub enum BindingError {
    /// The host's platform key has no row in the platform table. No file was touched.
    #[error("unsupported platform: {key}. supported platforms: {}", join_keys(.supported))]
    UnsupportedPlatform {
        /// The host's key.
        key: PlatformKey,
        /// Every supported key, in table order.
        supported: Vec<PlatformKey>,
    },

    /// The platform is supported but its artifact could not be loaded.
    #[error("failed to load native binding for {key}. expected file: {filename}")]
    BindingLoadFailure {
        /// The host's key.
        key: PlatformKey,
        /// Derived artifact file name, `index.<triple>.<ext>`.
        filename: String,
        /// Full path of the load attempt.
        path: PathBuf,
        /// Underlying failure.
        #[source]
        cause: LoadCause,
    },
}

impl BindingError {
    /// The platform key resolution was attempted for.
    pub fn platform(&self) -> &PlatformKey {
        match self {
            Self::UnsupportedPlatform { key, .. } | Self::BindingLoadFailure { key, .. } => key,
        }
    }
}

/// Result type for binding resolution.
pub type Result<T> = std::result::Result<T, BindingError>;

/// Render an error and its `source` chain as `outer: inner: ...`.
///
/// Each layer's message holds only its own part, so nothing repeats.
pub fn report(err: &(dyn StdError + 'static)) -> String {
    let mut out = err.to_string();
    let mut source = err.source();
    while let Some(cause) = source {
        out.push_str(": ");
        out.push_str(&cause.to_string());
        source = cause.source();
    }
    out
}

fn join_keys(keys: &[PlatformKey]) -> String {
    keys.iter().map(|k| k.to_string()).collect::<Vec<_>>().join(", ")
}

/// Underlying reason an artifact failed to load.
#[derive(Debug, thiserror::Error)]
pub enum LoadCause {
    /// The artifact file could not be accessed (typically not found).
    #[error("I/O error")]
    Io(#[from] std::io::Error),

    /// The dynamic loader rejected the file (corrupt, wrong architecture, unresolved symbols).
    #[error("dynamic loader error")]
    Library(#[from] libloading::Error),

    /// The module loaded but lacks a required export.
    #[error("missing export '{symbol}'")]
    MissingExport {
        symbol: &'static str,
        source: libloading::Error,
    },

    /// The module implements a different ABI version.
    #[error("ABI version mismatch: module implements {found}, expected {expected}")]
    AbiMismatch { expected: u32, found: u32 },
}
