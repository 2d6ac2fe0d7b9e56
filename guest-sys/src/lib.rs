//! Raw host imports for sandboxed guest functions.
//!
//! Everything here mirrors the host ABI one to one. Every import returns a
//! nullable pointer to a host-allocated, NUL-terminated error message. A null
//! return means success; a non-null return must be released with `free` by
//! the caller.

#![cfg_attr(not(test), warn(unused_crate_dependencies))]
#![allow(non_upper_case_globals, non_camel_case_types, clippy::all)]

use std::os::raw::{c_char, c_void};

/// Size type used for counts across the host boundary.
pub type ApiSize = u32;

/// Discriminant written by the host for a channel without a kind.
pub const CHANNEL_KIND_NULL: u8 = 0;
/// Discriminant for text channels. Elements are `*mut c_char`.
pub const CHANNEL_KIND_TEXT: u8 = 1;
/// Discriminant for integer channels. Elements are `i64`.
pub const CHANNEL_KIND_INTEGER: u8 = 2;
/// Discriminant for floating-point channels. Elements are `f64`.
pub const CHANNEL_KIND_FLOAT: u8 = 3;
/// Discriminant for boolean channels. Elements are one byte each.
pub const CHANNEL_KIND_BOOLEAN: u8 = 4;
/// Discriminant for byte channels. Elements are `u8`.
pub const CHANNEL_KIND_BYTE: u8 = 5;

/// A typed array moving across the host boundary.
///
/// When filled by `__input_data`, `array` is allocated with `malloc` and owned
/// by the guest. For text channels each element is itself a separately
/// allocated C string.
#[repr(C)]
#[derive(Debug)]
pub struct ChannelData {
    pub kind: u8,
    pub count: ApiSize,
    pub array: *const c_void,
}

impl Default for ChannelData {
    fn default() -> Self {
        Self { kind: CHANNEL_KIND_NULL, count: 0, array: std::ptr::null() }
    }
}

/// A key-value pair representing an environment variable.
#[repr(C)]
#[derive(Debug)]
pub struct EnvironmentVariable {
    pub key: *const c_char,
    pub value: *const c_char,
}

/// A request to start a process on the host.
///
/// If `wait` is set the call returns once the process exited and both the pid
/// and exit code are written. Otherwise only the pid is written.
#[repr(C)]
#[derive(Debug)]
pub struct StartProcessRequest {
    pub command: *const c_char,
    pub env_vars: *const EnvironmentVariable,
    pub num_env_vars: ApiSize,
    pub wait: bool,
}

#[cfg_attr(target_family = "wasm", link(wasm_import_module = "firm"))]
unsafe extern "C" {
    pub fn __input_data(key: *const c_char, size: ApiSize, value_out: *mut ChannelData)
    -> *const c_char;

    pub fn __channel_type(key: *const c_char, type_out: *mut u8) -> *const c_char;

    pub fn __channel_closed(key: *const c_char, closed_out: *mut bool) -> *const c_char;

    pub fn __input_available(
        key: *const c_char,
        num_available_out: *mut ApiSize,
        closed_out: *mut bool,
    ) -> *const c_char;

    pub fn __append_output(key: *const c_char, values: *const ChannelData) -> *const c_char;

    pub fn __close_output(key: *const c_char) -> *const c_char;

    pub fn __map_attachment(
        attachment_name: *const c_char,
        unpack: bool,
        path_out: *mut *const c_char,
    ) -> *const c_char;

    pub fn __host_path_exists(path: *const c_char, exists: *mut bool) -> *const c_char;

    pub fn __host_os(os_name: *mut *const c_char) -> *const c_char;

    pub fn __start_host_process(
        request: *const StartProcessRequest,
        pid_out: *mut u64,
        exit_code_out: *mut i64,
    ) -> *const c_char;

    pub fn __set_error(msg: *const c_char) -> *const c_char;

    pub fn __connect(addr: *const c_char, file_descriptor_out: *mut i32) -> *const c_char;
}
