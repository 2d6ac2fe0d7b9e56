//! The production [`Host`], backed by the `firm` wasm imports.
//!
//! Native test builds compile this module too, with the imports defined
//! in-process over a [`MemoryHost`](crate::MemoryHost).

use crate::{
    ChannelKind, Element, GuestError, GuestResult, HostProcessResult, OwnedChannelData,
    ProcessRequest,
    entries::raw_count,
    sys::{
        Availability, Host,
        call::{host_call, take_host_string},
    },
};
use std::{ffi::CStr, os::raw::c_char, ptr};

/// Host backed by the raw imports of the sandbox runtime.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct WasiHost;

fn take_output_string(ptr: *const c_char, what: &str) -> GuestResult<String> {
    // SAFETY: the host allocated the string for us to release.
    unsafe { take_host_string(ptr) }
        .ok_or_else(|| GuestError::Host(format!("host returned no {what}")))
}

impl Host for WasiHost {
    fn availability(&self, key: &CStr) -> GuestResult<Availability> {
        let mut available: ffi::ApiSize = 0;
        let mut closed = false;
        host_call!(ffi::__input_available(key.as_ptr(), &mut available, &mut closed))?;
        Ok(Availability { available: available as usize, closed })
    }

    fn channel_kind(&self, key: &CStr) -> GuestResult<ChannelKind> {
        let mut kind = ffi::CHANNEL_KIND_NULL;
        host_call!(ffi::__channel_type(key.as_ptr(), &mut kind))?;
        ChannelKind::try_from(kind)
    }

    fn read<T: Element>(&self, key: &CStr, max_count: usize) -> GuestResult<Vec<T>> {
        let mut data = OwnedChannelData::new();
        host_call!(ffi::__input_data(key.as_ptr(), raw_count(max_count)?, data.as_mut_ptr()))?;
        data.into_vec(&key.to_string_lossy())
    }

    fn output_closed(&self, key: &CStr) -> GuestResult<bool> {
        let mut closed = false;
        host_call!(ffi::__channel_closed(key.as_ptr(), &mut closed))?;
        Ok(closed)
    }

    fn append<T: Element>(&self, key: &CStr, items: &[T]) -> GuestResult<()> {
        T::with_raw(items, |data| host_call!(ffi::__append_output(key.as_ptr(), data)))?
    }

    fn close_output(&self, key: &CStr) -> GuestResult<()> {
        host_call!(ffi::__close_output(key.as_ptr()))
    }

    fn map_attachment(&self, name: &CStr, unpack: bool) -> GuestResult<String> {
        let mut path: *const c_char = ptr::null();
        host_call!(ffi::__map_attachment(name.as_ptr(), unpack, &mut path))?;
        take_output_string(path, "attachment path")
    }

    fn host_path_exists(&self, path: &CStr) -> GuestResult<bool> {
        let mut exists = false;
        host_call!(ffi::__host_path_exists(path.as_ptr(), &mut exists))?;
        Ok(exists)
    }

    fn host_os(&self) -> GuestResult<String> {
        let mut name: *const c_char = ptr::null();
        host_call!(ffi::__host_os(&mut name))?;
        take_output_string(name, "host OS name")
    }

    fn start_process(&self, request: &ProcessRequest) -> GuestResult<HostProcessResult> {
        let mut pid = 0u64;
        let mut exit_code = 0i64;
        request.with_raw(|raw| {
            host_call!(ffi::__start_host_process(raw, &mut pid, &mut exit_code))
        })??;
        Ok(if request.wait() {
            HostProcessResult::exited(pid, exit_code)
        } else {
            HostProcessResult::running(pid)
        })
    }

    fn set_error(&self, message: &CStr) -> GuestResult<()> {
        host_call!(ffi::__set_error(message.as_ptr()))
    }

    fn connect(&self, address: &CStr) -> GuestResult<i32> {
        let mut fd = -1i32;
        host_call!(ffi::__connect(address.as_ptr(), &mut fd))?;
        Ok(fd)
    }
}
