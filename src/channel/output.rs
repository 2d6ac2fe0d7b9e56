use super::{channel_key, check_kind};
use crate::{Element, Guest, GuestError, GuestResult, Host};

impl<H: Host> Guest<H> {
    /// Appends `items` to the output channel `key`.
    ///
    /// The channel must carry `T` and must not have been closed, even when
    /// `items` is empty. An empty append is checked but never forwarded.
    /// Failures are not retried.
    pub fn append_output<T: Element>(&self, key: &str, items: &[T]) -> GuestResult<()> {
        let c_key = channel_key(key)?;
        check_kind::<H, T>(&self.host, &c_key)?;
        if self.host.output_closed(&c_key)? {
            return Err(GuestError::AppendToClosed(key.to_owned()));
        }
        if items.is_empty() {
            return Ok(());
        }
        tracing::trace!(target: "sandbox_guest", channel = key, count = items.len(), "appending output");
        self.host.append(&c_key, items)
    }

    /// Closes the output channel `key`. No further appends will succeed.
    pub fn close_output(&self, key: &str) -> GuestResult<()> {
        let c_key = channel_key(key)?;
        tracing::debug!(target: "sandbox_guest", channel = key, "closing output");
        self.host.close_output(&c_key)
    }
}
