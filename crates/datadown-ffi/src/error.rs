//! Conversion errors reported across the module boundary.

use crate::abi;

/// Errors produced by a conversion module's `convert` operation.
///
/// The loader passes these through unchanged; interpreting them is up to the caller.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ConversionError {
    /// The requested format name is not one of the known output formats.
    #[error("invalid format '{format}' (use json|yaml|toml|xml)")]
    InvalidFormat { format: String },

    /// The module does not support the requested format.
    #[error("unsupported format: {message}")]
    UnsupportedFormat { message: String },

    /// The module failed to convert the input.
    #[error("conversion failed: {message}")]
    Failed { message: String },

    /// The input could not be passed to or read by the module.
    #[error("invalid input: {message}")]
    InvalidInput { message: String },

    /// The module hit an internal error (e.g. a caught panic).
    #[error("internal error in conversion module: {message}")]
    Internal { message: String },

    /// The module returned a status code outside the contract.
    #[error("conversion module returned status {status}: {message}")]
    Unknown { status: i32, message: String },

    /// The module returned output that is not valid UTF-8.
    #[error("conversion module returned non-UTF-8 output")]
    InvalidUtf8,
}

/// Result type for conversion calls.
pub type Result<T> = std::result::Result<T, ConversionError>;

impl ConversionError {
    /// Status code this error is reported with across the boundary.
    pub fn status(&self) -> i32 {
        match self {
            Self::InvalidFormat { .. } | Self::UnsupportedFormat { .. } => abi::STATUS_INVALID_FORMAT,
            Self::Failed { .. } => abi::STATUS_FAILED,
            Self::InvalidInput { .. } => abi::STATUS_INVALID_INPUT,
            Self::Internal { .. } | Self::InvalidUtf8 => abi::STATUS_INTERNAL,
            Self::Unknown { status, .. } => *status,
        }
    }

    /// Message written into the output buffer alongside [`status`](Self::status).
    pub fn message(&self) -> String {
        match self {
            Self::UnsupportedFormat { message }
            | Self::Failed { message }
            | Self::InvalidInput { message }
            | Self::Internal { message }
            | Self::Unknown { message, .. } => message.clone(),
            Self::InvalidFormat { .. } | Self::InvalidUtf8 => self.to_string(),
        }
    }

    /// Rebuild an error from a non-zero status and the module's message.
    pub fn from_status(status: i32, message: String) -> Self {
        match status {
            abi::STATUS_INVALID_FORMAT => Self::UnsupportedFormat { message },
            abi::STATUS_FAILED => Self::Failed { message },
            abi::STATUS_INVALID_INPUT => Self::InvalidInput { message },
            abi::STATUS_INTERNAL => Self::Internal { message },
            status => Self::Unknown { status, message },
        }
    }
}
