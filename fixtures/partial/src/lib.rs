//! Conversion module missing `datadown_convert` and `datadown_free_buffer`.

#[no_mangle]
pub extern "C" fn datadown_abi_version() -> u32 {
    datadown_ffi::ABI_VERSION
}
