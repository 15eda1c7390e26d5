//! Raw ABI: symbol names, function pointer types, status codes, and the
//! buffer type used to return text.
//!
//! All strings cross the boundary as UTF-8 bytes plus a length, never as
//! NUL-terminated C strings. Buffers returned by a module are owned by the
//! module and must be released with its own `datadown_free_buffer`.

use std::ptr;

/// Version of this ABI. A module reporting a different version is rejected at load time.
pub const ABI_VERSION: u32 = 1;

/// `uint32_t datadown_abi_version(void)`
pub const SYMBOL_ABI_VERSION: &str = "datadown_abi_version";
/// `int32_t datadown_convert(...)`
pub const SYMBOL_CONVERT: &str = "datadown_convert";
/// `void datadown_free_buffer(DatadownBuffer)`
pub const SYMBOL_FREE_BUFFER: &str = "datadown_free_buffer";

/// Every symbol a module must export.
pub const REQUIRED_SYMBOLS: [&str; 3] = [SYMBOL_ABI_VERSION, SYMBOL_CONVERT, SYMBOL_FREE_BUFFER];

/// Success; the output buffer holds the converted text.
pub const STATUS_OK: i32 = 0;
/// Unknown or unsupported output format.
pub const STATUS_INVALID_FORMAT: i32 = 1;
/// The conversion itself failed.
pub const STATUS_FAILED: i32 = 2;
/// Null pointers or non-UTF-8 input.
pub const STATUS_INVALID_INPUT: i32 = 3;
/// Unexpected condition inside the module, including caught panics.
pub const STATUS_INTERNAL: i32 = 99;

/// Text returned by a module: converted output on success, an error message otherwise.
#[repr(C)]
#[derive(Debug)]
pub struct DatadownBuffer {
    pub ptr: *mut u8,
    pub len: usize,
}

impl DatadownBuffer {
    pub const fn empty() -> Self {
        Self {
            ptr: ptr::null_mut(),
            len: 0,
        }
    }

    pub fn is_null(&self) -> bool {
        self.ptr.is_null()
    }
}

impl Default for DatadownBuffer {
    fn default() -> Self {
        Self::empty()
    }
}

/// Type of `datadown_abi_version`.
pub type AbiVersionFn = unsafe extern "C" fn() -> u32;

/// Type of `datadown_convert`.
pub type ConvertFn = unsafe extern "C" fn(
    input: *const u8,
    input_len: usize,
    format: *const u8,
    format_len: usize,
    out: *mut DatadownBuffer,
) -> i32;

/// Type of `datadown_free_buffer`.
pub type FreeBufferFn = unsafe extern "C" fn(buf: DatadownBuffer);
