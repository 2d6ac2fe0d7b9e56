use crate::{ChannelKind, Element, GuestResult, HostProcessResult, ProcessRequest};
use std::ffi::CStr;

/// Snapshot of an input channel as reported by the host.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Availability {
    /// Number of items that can be read without waiting.
    pub available: usize,
    /// Whether the producer closed the channel.
    pub closed: bool,
}

/// The primitive operations a host runtime offers to a guest.
///
/// Everything in this crate is built on top of these calls. Channel keys
/// arrive already validated as C strings. Implementations report failures as
/// [`GuestError::Host`](crate::GuestError::Host) with the host's message.
///
/// `WasiHost` forwards to the raw imports when compiled
/// for wasm. [`MemoryHost`](crate::MemoryHost) keeps everything in process.
pub trait Host {
    /// Queries how many items of an input channel are ready, and whether it
    /// is closed. Has no side effects.
    fn availability(&self, key: &CStr) -> GuestResult<Availability>;

    /// The kind of a channel.
    fn channel_kind(&self, key: &CStr) -> GuestResult<ChannelKind>;

    /// Consumes up to `max_count` items from an input channel.
    ///
    /// May suspend the calling thread until `max_count` items are available
    /// or the channel closes. An empty result means the channel is closed
    /// and drained.
    fn read<T: Element>(&self, key: &CStr, max_count: usize) -> GuestResult<Vec<T>>;

    /// Whether an output channel has been closed.
    fn output_closed(&self, key: &CStr) -> GuestResult<bool>;

    /// Appends items to an output channel.
    fn append<T: Element>(&self, key: &CStr, items: &[T]) -> GuestResult<()>;

    /// Closes an output channel.
    fn close_output(&self, key: &CStr) -> GuestResult<()>;

    /// Maps an attachment into the guest file system and returns its path.
    fn map_attachment(&self, name: &CStr, unpack: bool) -> GuestResult<String>;

    /// Whether a path exists on the host file system.
    fn host_path_exists(&self, path: &CStr) -> GuestResult<bool>;

    /// Name of the host operating system.
    fn host_os(&self) -> GuestResult<String>;

    /// Starts a process on the host.
    fn start_process(&self, request: &ProcessRequest) -> GuestResult<HostProcessResult>;

    /// Reports the function error message to the host.
    fn set_error(&self, message: &CStr) -> GuestResult<()>;

    /// Opens a connection to `address` (`tcp://host:port` or
    /// `udp://host:port`) and returns its file descriptor.
    fn connect(&self, address: &CStr) -> GuestResult<i32>;
}
