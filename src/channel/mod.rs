//! Typed access to input and output channels.

mod access;
use access::{Fill, check_kind, fetch};

mod iter;
pub use iter::{
    BoolIter, ByteIter, DEFAULT_FETCH_SIZE, FloatIter, InputIter, IntIter, IterBuilder, TextIter,
};

mod output;

use crate::{GuestError, GuestResult, Host};
use std::ffi::CString;

#[cfg(any(target_family = "wasm", test))]
use crate::WasiHost;

/// Entry point for a function running inside the sandbox.
///
/// A `Guest` owns the [`Host`] that services its calls. Every channel
/// operation is generic over the element type, which selects the channel
/// kind:
///
/// ```
/// use sandbox_guest::{Guest, MemoryHost};
///
/// let host = MemoryHost::new();
/// host.add_closed_input("flags", [true, false, true]);
/// let guest = Guest::new(host);
///
/// assert_eq!(guest.get_single::<bool>("flags", true).unwrap(), Some(true));
/// let rest = guest.iter::<bool>("flags").fetch_size(1).open().unwrap().collect_all().unwrap();
/// assert_eq!(rest, vec![false, true]);
/// assert_eq!(guest.get_single::<bool>("flags", true).unwrap(), None);
/// ```
#[derive(Debug, Clone, Default)]
pub struct Guest<H> {
    host: H,
}

impl<H: Host> Guest<H> {
    /// Creates a guest serviced by `host`.
    pub const fn new(host: H) -> Self {
        Self { host }
    }

    /// The host servicing this guest.
    pub const fn host(&self) -> &H {
        &self.host
    }

    /// Returns the host.
    pub fn into_host(self) -> H {
        self.host
    }
}

#[cfg(any(target_family = "wasm", test))]
impl Guest<WasiHost> {
    /// The guest of the running sandbox.
    pub const fn wasi() -> Self {
        Self::new(WasiHost)
    }
}

/// Validates a channel name for the host.
pub(crate) fn channel_key(key: &str) -> GuestResult<CString> {
    CString::new(key).map_err(|e| GuestError::invalid_name("channel name", key, e))
}
