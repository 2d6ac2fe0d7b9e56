use crate::{Guest, GuestError, GuestResult, Host, HostOs};
use std::{ffi::CString, path::Path, path::PathBuf};

fn c_string(what: &str, value: &str) -> GuestResult<CString> {
    CString::new(value).map_err(|e| GuestError::invalid_name(what, value, e))
}

impl<H: Host> Guest<H> {
    /// Maps an attachment into the guest file system.
    ///
    /// The returned path is a file, or a directory when the attachment is
    /// an archive and `unpack` is set.
    pub fn map_attachment(&self, name: &str, unpack: bool) -> GuestResult<PathBuf> {
        let c_name = c_string("attachment name", name)?;
        let path = self.host().map_attachment(&c_name, unpack).map_err(|e| match e {
            GuestError::Host(msg) => {
                GuestError::Host(format!("failed to map attachment \"{name}\": {msg}"))
            }
            e => e,
        })?;
        tracing::debug!(target: "sandbox_guest", attachment = name, %path, "mapped attachment");
        Ok(PathBuf::from(path))
    }

    /// Checks whether `path` exists on the host file system.
    pub fn host_path_exists(&self, path: &Path) -> GuestResult<bool> {
        let s = path.to_str().ok_or_else(|| {
            GuestError::InvalidArgument(format!("path \"{}\" is not valid UTF-8", path.display()))
        })?;
        self.host().host_path_exists(&c_string("path", s)?)
    }

    /// The operating system of the host.
    pub fn host_os(&self) -> GuestResult<HostOs> {
        self.host().host_os()?.parse()
    }

    /// Reports an error message for the running function to the host.
    pub fn set_function_error(&self, message: &str) -> GuestResult<()> {
        self.host().set_error(&c_string("error message", message)?)
    }

    /// Dials `url` and returns the raw descriptor.
    #[cfg_attr(not(any(unix, target_os = "wasi")), allow(dead_code))]
    pub(crate) fn connect_raw(&self, url: &str) -> GuestResult<i32> {
        let fd = self.host().connect(&c_string("address", url)?)?;
        tracing::debug!(target: "sandbox_guest", url, fd, "connected");
        Ok(fd)
    }
}
