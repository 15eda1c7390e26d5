//! Helpers for implementing a conversion module in Rust.
//!
//! A module only has to supply a `Fn(&str, OutputFormat) -> Result<String, ConversionError>`;
//! [`export_binding!`](crate::export_binding) generates the three exported
//! symbols around it. Panics never cross the boundary: they are caught and
//! reported as [`STATUS_INTERNAL`](crate::abi::STATUS_INTERNAL).

use std::panic::{self, AssertUnwindSafe};
use std::ptr;
use std::slice;

use crate::abi::{self, DatadownBuffer};
use crate::error::{ConversionError, Result};
use crate::format::OutputFormat;

/// Move bytes into a buffer owned by this module.
pub fn into_buffer(bytes: Vec<u8>) -> DatadownBuffer {
    let boxed = bytes.into_boxed_slice();
    let len = boxed.len();
    let ptr = Box::into_raw(boxed) as *mut u8;
    DatadownBuffer { ptr, len }
}

/// Release a buffer previously produced by [`into_buffer`]. Null buffers are ignored.
///
/// # Safety
///
/// `buf` must come from [`into_buffer`] in this module and must not be freed twice.
pub unsafe fn free_buffer(buf: DatadownBuffer) {
    if buf.ptr.is_null() {
        return;
    }
    drop(Box::from_raw(ptr::slice_from_raw_parts_mut(buf.ptr, buf.len)));
}

/// Read a `(pointer, length)` pair as UTF-8.
///
/// # Safety
///
/// If non-null, `data` must be valid for reads of `len` bytes.
unsafe fn read_str<'a>(data: *const u8, len: usize, what: &str) -> Result<&'a str> {
    if data.is_null() {
        if len == 0 {
            return Ok("");
        }
        return Err(ConversionError::InvalidInput {
            message: format!("{what} pointer is null but length is {len}"),
        });
    }
    let bytes = slice::from_raw_parts(data, len);
    std::str::from_utf8(bytes).map_err(|e| ConversionError::InvalidInput {
        message: format!("{what} is not valid UTF-8: {e}"),
    })
}

/// Body of an exported `datadown_convert`.
///
/// Validates the arguments, runs `convert`, and writes either the output or
/// the error message into `*out`. Returns the status code.
///
/// # Safety
///
/// Pointer arguments must satisfy the contract in [`crate::abi`]: `input` and
/// `format` valid for their lengths (or null with length 0), `out` valid for
/// writes or null.
pub unsafe fn export_convert<F>(
    input: *const u8,
    input_len: usize,
    format: *const u8,
    format_len: usize,
    out: *mut DatadownBuffer,
    convert: F,
) -> i32
where
    F: FnOnce(&str, OutputFormat) -> Result<String>,
{
    if out.is_null() {
        return abi::STATUS_INVALID_INPUT;
    }

    let result = read_str(input, input_len, "input").and_then(|input| {
        let format: OutputFormat = read_str(format, format_len, "format")?.parse()?;
        match panic::catch_unwind(AssertUnwindSafe(|| convert(input, format))) {
            Ok(result) => result,
            Err(payload) => {
                let message = payload
                    .downcast_ref::<&str>()
                    .map(|s| s.to_string())
                    .or_else(|| payload.downcast_ref::<String>().cloned())
                    .unwrap_or_else(|| "panic in converter".to_string());
                log::warn!("conversion module caught panic: {message}");
                Err(ConversionError::Internal { message })
            }
        }
    });

    match result {
        Ok(text) => {
            *out = into_buffer(text.into_bytes());
            abi::STATUS_OK
        }
        Err(err) => {
            *out = into_buffer(err.message().into_bytes());
            err.status()
        }
    }
}

/// Define the three exported symbols of a conversion module around a Rust
/// conversion function.
///
/// ```ignore
/// fn convert(input: &str, format: OutputFormat) -> datadown_ffi::Result<String> { ... }
/// datadown_ffi::export_binding!(convert);
/// ```
#[macro_export]
macro_rules! export_binding {
    ($convert:path) => {
        #[no_mangle]
        pub extern "C" fn datadown_abi_version() -> u32 {
            $crate::abi::ABI_VERSION
        }

        /// # Safety
        ///
        /// See [`datadown_ffi::export::export_convert`].
        #[no_mangle]
        pub unsafe extern "C" fn datadown_convert(
            input: *const u8,
            input_len: usize,
            format: *const u8,
            format_len: usize,
            out: *mut $crate::abi::DatadownBuffer,
        ) -> i32 {
            $crate::export::export_convert(input, input_len, format, format_len, out, $convert)
        }

        /// # Safety
        ///
        /// See [`datadown_ffi::export::free_buffer`].
        #[no_mangle]
        pub unsafe extern "C" fn datadown_free_buffer(buf: $crate::abi::DatadownBuffer) {
            $crate::export::free_buffer(buf)
        }
    };
}
