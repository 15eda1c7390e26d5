//! Conversion module exporting every symbol but reporting ABI version 7.

use datadown_ffi::abi::DatadownBuffer;
use datadown_ffi::export;

#[no_mangle]
pub extern "C" fn datadown_abi_version() -> u32 {
    7
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
    out: *mut DatadownBuffer,
) -> i32 {
    export::export_convert(input, input_len, format, format_len, out, |input, _| {
        Ok(input.to_string())
    })
}

/// # Safety
///
/// See [`datadown_ffi::export::free_buffer`].
#[no_mangle]
pub unsafe extern "C" fn datadown_free_buffer(buf: DatadownBuffer) {
    export::free_buffer(buf)
}
