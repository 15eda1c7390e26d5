//! Safe calls into a loaded conversion module.

use std::slice;

use crate::abi::{self, AbiVersionFn, ConvertFn, DatadownBuffer, FreeBufferFn};
use crate::error::{ConversionError, Result};
use crate::format::OutputFormat;

/// The resolved export surface of a conversion module.
#[derive(Debug, Clone, Copy)]
pub struct NativeExports {
    abi_version: AbiVersionFn,
    convert: ConvertFn,
    free_buffer: FreeBufferFn,
}

impl NativeExports {
    /// Bundle the three exported functions.
    ///
    /// # Safety
    ///
    /// The pointers must implement the contract in [`crate::abi`] and stay
    /// callable for as long as the returned value (or any copy) is used. For
    /// a dynamically loaded module that means the library must stay loaded.
    pub unsafe fn new(abi_version: AbiVersionFn, convert: ConvertFn, free_buffer: FreeBufferFn) -> Self {
        Self {
            abi_version,
            convert,
            free_buffer,
        }
    }

    /// ABI version reported by the module.
    pub fn abi_version(&self) -> u32 {
        // SAFETY: guaranteed callable by the contract of `new`.
        unsafe { (self.abi_version)() }
    }

    /// Convert `input` to `format` through the module.
    pub fn convert(&self, input: &str, format: OutputFormat) -> Result<String> {
        let format_name = format.as_str();
        let mut out = DatadownBuffer::empty();

        // SAFETY: input and format are valid UTF-8 slices for the duration of
        // the call, `out` is a valid writable buffer, and the function pointer
        // is guaranteed callable by the contract of `new`.
        let status = unsafe {
            (self.convert)(
                input.as_ptr(),
                input.len(),
                format_name.as_ptr(),
                format_name.len(),
                &mut out,
            )
        };

        let bytes = self.take(out);
        log::debug!("convert to {format_name}: status {status}, {} bytes", bytes.len());

        if status == abi::STATUS_OK {
            String::from_utf8(bytes).map_err(|_| ConversionError::InvalidUtf8)
        } else {
            let message = String::from_utf8_lossy(&bytes).into_owned();
            Err(ConversionError::from_status(status, message))
        }
    }

    /// Copy a module-owned buffer and hand it back to the module.
    fn take(&self, buf: DatadownBuffer) -> Vec<u8> {
        if buf.is_null() {
            return Vec::new();
        }
        // SAFETY: a non-null buffer written by `datadown_convert` is valid for
        // `len` bytes until it is passed to `datadown_free_buffer`.
        let bytes = unsafe { slice::from_raw_parts(buf.ptr, buf.len).to_vec() };
        // SAFETY: the buffer came from this module and is freed exactly once.
        unsafe { (self.free_buffer)(buf) };
        bytes
    }
}
