//! C ABI contract between datadown and its precompiled conversion modules.
//!
//! A conversion module is a dynamic library exporting three symbols:
//!
//! ```text
//! uint32_t datadown_abi_version(void);
//! int32_t  datadown_convert(const uint8_t *input, size_t input_len,
//!                           const uint8_t *format, size_t format_len,
//!                           DatadownBuffer *out);
//! void     datadown_free_buffer(DatadownBuffer buf);
//! ```
//!
//! ## Modules
//!
//! - [`abi`]: Symbol names, function pointer types, status codes, buffer layout
//! - [`format`]: The closed set of output formats
//! - [`error`]: Conversion errors reported across the boundary
//! - [`import`]: Safe calls into a loaded module
//! - [`export`]: Helpers for implementing a module in Rust

pub mod abi;
pub mod error;
pub mod export;
pub mod format;
pub mod import;

// Re-export key types for convenience
pub use abi::{DatadownBuffer, ABI_VERSION};
pub use error::{ConversionError, Result};
pub use format::OutputFormat;
pub use import::NativeExports;
