use crate::{Element, Guest, GuestError, GuestResult, Host, channel::channel_key};
use std::ffi::CStr;

/// How a non-blocking fetch treats a channel holding fewer items than
/// requested.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Fill {
    /// Report [`GuestError::Blocked`] unless the whole request can be served.
    Exact,
    /// Serve whatever is available, reporting `Blocked` only when nothing is.
    Available,
}

/// Fetches up to `max_count` items from the input channel `key`.
///
/// An empty result means the channel is closed and drained. In non-blocking
/// mode, [`GuestError::Blocked`] is returned before anything is consumed.
pub(crate) fn fetch<H: Host, T: Element>(
    host: &H,
    key: &CStr,
    blocking: bool,
    max_count: usize,
    fill: Fill,
) -> GuestResult<Vec<T>> {
    if max_count == 0 {
        return Err(GuestError::InvalidArgument("fetch count must be positive".to_owned()));
    }

    let availability = host.availability(key)?;
    let count = if blocking || availability.closed || availability.available >= max_count {
        max_count
    } else if fill == Fill::Available && availability.available > 0 {
        availability.available
    } else {
        return Err(GuestError::Blocked);
    };

    check_kind::<H, T>(host, key)?;

    let items = host.read::<T>(key, count)?;
    tracing::trace!(
        target: "sandbox_guest",
        channel = %key.to_string_lossy(),
        requested = count,
        fetched = items.len(),
        blocking,
        "fetched input"
    );
    Ok(items)
}

/// Fails with [`GuestError::KindMismatch`] unless `key` carries `T`.
pub(crate) fn check_kind<H: Host, T: Element>(host: &H, key: &CStr) -> GuestResult<()> {
    let actual = host.channel_kind(key)?;
    if actual != T::KIND {
        return Err(GuestError::KindMismatch {
            channel: key.to_string_lossy().into_owned(),
            expected: T::KIND,
            actual,
        });
    }
    Ok(())
}

impl<H: Host> Guest<H> {
    /// Reads one item from the input channel `key`.
    ///
    /// Returns `Ok(None)` once the channel is closed and drained. In
    /// non-blocking mode an empty open channel yields
    /// [`GuestError::Blocked`] and nothing is consumed.
    pub fn get_single<T: Element>(&self, key: &str, blocking: bool) -> GuestResult<Option<T>> {
        let key = channel_key(key)?;
        let items = fetch::<H, T>(&self.host, &key, blocking, 1, Fill::Exact)?;
        Ok(items.into_iter().next())
    }

    /// Reads up to `want` items from the input channel `key` in one call.
    ///
    /// A blocking call waits until `want` items are available or the channel
    /// closes, and may therefore return fewer than `want`. A non-blocking
    /// call is all or nothing: unless `want` items are ready or the channel
    /// is closed it returns [`GuestError::Blocked`] without consuming
    /// anything. Returns `Ok(None)` once the channel is closed and drained.
    pub fn get_many<T: Element>(
        &self,
        key: &str,
        blocking: bool,
        want: usize,
    ) -> GuestResult<Option<Vec<T>>> {
        let key = channel_key(key)?;
        let items = fetch::<H, T>(&self.host, &key, blocking, want, Fill::Exact)?;
        Ok((!items.is_empty()).then_some(items))
    }
}
