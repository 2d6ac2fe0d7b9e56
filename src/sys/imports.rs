//! Definitions of the host imports for native test builds.
//!
//! Off wasm the imports declared by `ffi` carry no link module, so these
//! `no_mangle` functions satisfy them. Each one forwards to the
//! [`MemoryHost`] installed for the calling thread and answers the way the
//! runtime does: arrays, strings and error messages are `malloc` allocated
//! and released by the guest.
//!
//! Nothing here may panic, since a panic cannot unwind out of an
//! `extern "C"` function.

use crate::{
    ChannelKind, Element, GuestError, GuestResult, Host, HostProcess, MemoryHost,
    OwnedChannelData,
    entries::{
        raw_count,
        test_support::{malloc_array, malloc_c_bytes, malloc_c_string},
    },
};
use std::{
    cell::RefCell,
    collections::HashMap,
    ffi::CStr,
    os::raw::c_char,
    ptr, slice,
};

thread_local! {
    static HOST: RefCell<Option<MemoryHost>> = const { RefCell::new(None) };
}

/// Routes the imports called from this thread to `host`.
pub(crate) fn install(host: &MemoryHost) {
    HOST.with(|h| *h.borrow_mut() = Some(host.clone()));
}

/// Runs `f` against the installed host and encodes its result as the
/// nullable error string every import returns.
fn serve(f: impl FnOnce(&MemoryHost) -> GuestResult<()>) -> *const c_char {
    let host = HOST.with(|h| h.borrow().clone());
    let res = host
        .ok_or_else(|| GuestError::Host("no host installed for this thread".to_owned()))
        .and_then(|host| f(&host));
    match res {
        Ok(()) => ptr::null(),
        Err(e) => malloc_c_string(&e.to_string()),
    }
}

/// Borrows a C string argument.
///
/// # Safety
///
/// `ptr` must be a valid NUL-terminated string for the duration of the call.
unsafe fn arg<'a>(ptr: *const c_char) -> &'a CStr {
    unsafe { CStr::from_ptr(ptr) }
}

/// Deep-copies a raw array into `malloc` allocations, text elements
/// included.
///
/// # Safety
///
/// `raw.array` must hold `raw.count` elements of the kind in `raw.kind`.
unsafe fn copy_raw(raw: &ffi::ChannelData) -> GuestResult<ffi::ChannelData> {
    let kind = ChannelKind::try_from(raw.kind)?;
    let len = raw.count as usize;
    let array = if len == 0 {
        malloc_array::<u8>(&[])
    } else if kind == ChannelKind::Text {
        let ptrs = unsafe { slice::from_raw_parts(raw.array as *const *const c_char, len) };
        let copies: Vec<*mut c_char> =
            ptrs.iter().map(|p| malloc_c_bytes(unsafe { CStr::from_ptr(*p) }.to_bytes())).collect();
        malloc_array(&copies)
    } else {
        let width = kind.raw_width();
        let bytes = unsafe { slice::from_raw_parts(raw.array as *const u8, len * width) };
        malloc_array(bytes)
    };
    Ok(ffi::ChannelData { kind: raw.kind, count: raw.count, array })
}

/// Calls the generic `$f::<T>(..)` for the element type of `$kind`.
macro_rules! by_kind {
    ($kind:expr, $f:ident($($arg:expr),*)) => {
        match $kind {
            ChannelKind::Text => $f::<String>($($arg),*),
            ChannelKind::Integer => $f::<i64>($($arg),*),
            ChannelKind::Float => $f::<f64>($($arg),*),
            ChannelKind::Boolean => $f::<bool>($($arg),*),
            ChannelKind::Byte => $f::<u8>($($arg),*),
        }
    };
}

fn read<T: Element>(host: &MemoryHost, key: &CStr, size: usize) -> GuestResult<ffi::ChannelData> {
    let items = host.read::<T>(key, size)?;
    // SAFETY: `with_raw` lays out `items.len()` elements of `T::KIND`.
    T::with_raw(&items, |raw| unsafe { copy_raw(raw) })?
}

fn append<T: Element>(host: &MemoryHost, key: &CStr, raw: &ffi::ChannelData) -> GuestResult<()> {
    // SAFETY: the guest passes a well-formed array that lives for the call.
    let owned = unsafe { OwnedChannelData::from_raw(copy_raw(raw)?) };
    let items = owned.into_vec::<T>(&key.to_string_lossy())?;
    host.append(key, &items)
}

#[unsafe(no_mangle)]
unsafe extern "C" fn __input_data(
    key: *const c_char,
    size: ffi::ApiSize,
    value_out: *mut ffi::ChannelData,
) -> *const c_char {
    serve(|host| {
        let key = unsafe { arg(key) };
        let data = by_kind!(host.channel_kind(key)?, read(host, key, size as usize))?;
        unsafe { value_out.write(data) };
        Ok(())
    })
}

#[unsafe(no_mangle)]
unsafe extern "C" fn __channel_type(key: *const c_char, type_out: *mut u8) -> *const c_char {
    serve(|host| {
        let kind = host.channel_kind(unsafe { arg(key) })?;
        unsafe { type_out.write(kind.discriminant()) };
        Ok(())
    })
}

#[unsafe(no_mangle)]
unsafe extern "C" fn __channel_closed(key: *const c_char, closed_out: *mut bool) -> *const c_char {
    serve(|host| {
        let closed = host.output_closed(unsafe { arg(key) })?;
        unsafe { closed_out.write(closed) };
        Ok(())
    })
}

#[unsafe(no_mangle)]
unsafe extern "C" fn __input_available(
    key: *const c_char,
    num_available_out: *mut ffi::ApiSize,
    closed_out: *mut bool,
) -> *const c_char {
    serve(|host| {
        let availability = host.availability(unsafe { arg(key) })?;
        let available = raw_count(availability.available)?;
        unsafe {
            num_available_out.write(available);
            closed_out.write(availability.closed);
        }
        Ok(())
    })
}

#[unsafe(no_mangle)]
unsafe extern "C" fn __append_output(
    key: *const c_char,
    values: *const ffi::ChannelData,
) -> *const c_char {
    serve(|host| {
        let key = unsafe { arg(key) };
        let raw = unsafe { &*values };
        by_kind!(ChannelKind::try_from(raw.kind)?, append(host, key, raw))
    })
}

#[unsafe(no_mangle)]
unsafe extern "C" fn __close_output(key: *const c_char) -> *const c_char {
    serve(|host| host.close_output(unsafe { arg(key) }))
}

#[unsafe(no_mangle)]
unsafe extern "C" fn __map_attachment(
    attachment_name: *const c_char,
    unpack: bool,
    path_out: *mut *const c_char,
) -> *const c_char {
    serve(|host| {
        let path = host.map_attachment(unsafe { arg(attachment_name) }, unpack)?;
        unsafe { path_out.write(malloc_c_string(&path)) };
        Ok(())
    })
}

#[unsafe(no_mangle)]
unsafe extern "C" fn __host_path_exists(path: *const c_char, exists: *mut bool) -> *const c_char {
    serve(|host| {
        let found = host.host_path_exists(unsafe { arg(path) })?;
        unsafe { exists.write(found) };
        Ok(())
    })
}

#[unsafe(no_mangle)]
unsafe extern "C" fn __host_os(os_name: *mut *const c_char) -> *const c_char {
    serve(|host| {
        let name = host.host_os()?;
        unsafe { os_name.write(malloc_c_string(&name)) };
        Ok(())
    })
}

#[unsafe(no_mangle)]
unsafe extern "C" fn __start_host_process(
    request: *const ffi::StartProcessRequest,
    pid_out: *mut u64,
    exit_code_out: *mut i64,
) -> *const c_char {
    serve(|host| {
        let raw = unsafe { &*request };
        let command = unsafe { arg(raw.command) }.to_string_lossy().into_owned();
        let vars = unsafe { slice::from_raw_parts(raw.env_vars, raw.num_env_vars as usize) };
        let env: HashMap<String, String> = vars
            .iter()
            .map(|var| unsafe {
                (
                    arg(var.key).to_string_lossy().into_owned(),
                    arg(var.value).to_string_lossy().into_owned(),
                )
            })
            .collect();
        let request =
            HostProcess::new(command).wait(raw.wait).environment_variables(&env).request()?;

        let result = host.start_process(&request)?;
        unsafe {
            pid_out.write(result.pid());
            if let Some(code) = result.exit_code() {
                exit_code_out.write(code);
            }
        }
        Ok(())
    })
}

#[unsafe(no_mangle)]
unsafe extern "C" fn __set_error(msg: *const c_char) -> *const c_char {
    serve(|host| host.set_error(unsafe { arg(msg) }))
}

#[unsafe(no_mangle)]
unsafe extern "C" fn __connect(
    addr: *const c_char,
    file_descriptor_out: *mut i32,
) -> *const c_char {
    serve(|host| {
        let fd = host.connect(unsafe { arg(addr) })?;
        unsafe { file_descriptor_out.write(fd) };
        Ok(())
    })
}

