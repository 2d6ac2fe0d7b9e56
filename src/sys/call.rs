//! Conversions for values returned through the raw host imports.
#![cfg_attr(not(target_family = "wasm"), allow(dead_code, unused_macros))]

use crate::{GuestError, GuestResult};
use std::{
    ffi::CStr,
    os::raw::{c_char, c_void},
};

/// Wraps a raw host import call, turning its error return into a
/// [`GuestResult`].
macro_rules! host_call {
    ($call:expr) => {
        unsafe { $crate::sys::call::host_result($call) }
    };
}
#[allow(unused_imports)]
pub(crate) use host_call;

/// Interprets the return value of a host import.
///
/// # Safety
///
/// `err` must be null or a `malloc` allocated C string that nothing else
/// frees.
pub(crate) unsafe fn host_result(err: *const c_char) -> GuestResult<()> {
    match unsafe { take_host_string(err) } {
        None => Ok(()),
        Some(msg) => Err(GuestError::Host(msg)),
    }
}

/// Copies a host-allocated C string and releases it.
///
/// # Safety
///
/// Same as [`host_result`].
pub(crate) unsafe fn take_host_string(ptr: *const c_char) -> Option<String> {
    if ptr.is_null() {
        return None;
    }
    let s = unsafe { CStr::from_ptr(ptr) }.to_string_lossy().into_owned();
    unsafe { libc::free(ptr as *mut c_void) };
    Some(s)
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::entries::test_support::malloc_c_string;

    #[test]
    fn null_is_success() {
        assert_eq!(host_call!(std::ptr::null()), Ok(()));
    }

    #[test]
    fn message_is_copied_and_released() {
        let err = host_call!(malloc_c_string("Oh no!"));
        assert_eq!(err, Err(GuestError::Host("Oh no!".to_owned())));
    }

    #[test]
    fn output_strings_are_taken() {
        let os = unsafe { take_host_string(malloc_c_string("linux")) };
        assert_eq!(os.as_deref(), Some("linux"));
    }
}
