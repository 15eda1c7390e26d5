//! Error types for platform and target operations.

/// Errors that can occur while parsing platform keys or target triples.
#[derive(Debug, thiserror::Error)]
pub enum TargetError {
    /// A target triple did not have the `arch-vendor-os[-env]` shape.
    #[error("invalid target triple '{triple}': {detail}")]
    InvalidTriple {
        /// The offending triple.
        triple: String,
        /// Description of the problem.
        detail: String,
    },

    /// A platform key was not of the form `<os>-<arch>`.
    #[error("invalid platform key '{key}': expected <os>-<arch>")]
    InvalidPlatformKey {
        /// The offending key.
        key: String,
    },
}

/// Result type for target operations.
pub type Result<T> = std::result::Result<T, TargetError>;
