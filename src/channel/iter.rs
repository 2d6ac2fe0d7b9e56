//! Buffered iteration over input channels.

use super::{Fill, channel_key, check_kind, fetch};
use crate::{Element, Guest, GuestError, GuestResult, Host};
use std::{collections::VecDeque, ffi::CString, fmt};

/// Refill granularity used when none is given.
pub const DEFAULT_FETCH_SIZE: usize = 256;

/// Iterator over boolean input.
pub type BoolIter<'a, H> = InputIter<'a, H, bool>;
/// Iterator over byte input.
pub type ByteIter<'a, H> = InputIter<'a, H, u8>;
/// Iterator over integer input.
pub type IntIter<'a, H> = InputIter<'a, H, i64>;
/// Iterator over floating-point input.
pub type FloatIter<'a, H> = InputIter<'a, H, f64>;
/// Iterator over text input.
pub type TextIter<'a, H> = InputIter<'a, H, String>;

/// Configures and opens an [`InputIter`].
///
/// Created by [`Guest::iter`]. Defaults to blocking reads in batches of
/// [`DEFAULT_FETCH_SIZE`].
#[derive(Debug)]
#[must_use = "builders do nothing unless opened"]
pub struct IterBuilder<'a, H, T> {
    guest: &'a Guest<H>,
    key: String,
    fetch_size: usize,
    blocking: bool,
    _marker: std::marker::PhantomData<fn() -> T>,
}

impl<'a, H: Host, T: Element> IterBuilder<'a, H, T> {
    /// Number of items requested from the host per refill.
    pub fn fetch_size(mut self, fetch_size: usize) -> Self {
        self.fetch_size = fetch_size;
        self
    }

    /// Whether reads may suspend the calling thread.
    pub fn blocking(mut self, blocking: bool) -> Self {
        self.blocking = blocking;
        self
    }

    /// Opens the iterator.
    ///
    /// Fails if the channel name is invalid, the fetch size is zero, or the
    /// channel does not carry `T`.
    pub fn open(self) -> GuestResult<InputIter<'a, H, T>> {
        let key = channel_key(&self.key)?;
        if self.fetch_size == 0 {
            return Err(GuestError::InvalidArgument("fetch size must be positive".to_owned()));
        }
        check_kind::<H, T>(&self.guest.host, &key)?;

        let span = tracing::debug_span!(
            target: "sandbox_guest",
            "input_iter",
            channel = %self.key,
            kind = %T::KIND,
            fetch_size = self.fetch_size,
            blocking = self.blocking,
        );
        span.in_scope(|| tracing::debug!(target: "sandbox_guest", "opened input iterator"));

        Ok(InputIter {
            host: &self.guest.host,
            key,
            fetch_size: self.fetch_size,
            blocking: self.blocking,
            buffer: VecDeque::with_capacity(self.fetch_size.min(DEFAULT_FETCH_SIZE)),
            exhausted: false,
            span,
        })
    }
}

/// A buffered iterator over an input channel.
///
/// When its buffer runs dry the iterator asks the host for `fetch_size` more
/// items, then serves them one at a time without further host calls.
///
/// - In blocking mode a refill waits until `fetch_size` items are available
///   or the channel closes.
/// - In non-blocking mode a refill takes whatever is available, up to
///   `fetch_size`, and reports [`GuestError::Blocked`] only when nothing is.
///
/// Reads return `Ok(None)` once the channel is closed and every item has been
/// served; the iterator then stays exhausted. A host error during a refill
/// leaves the buffer untouched and the next read retries the refill.
///
/// As an [`Iterator`], items are `GuestResult<T>` and iteration ends at end
/// of input.
///
/// ```
/// use sandbox_guest::{Guest, GuestError, MemoryHost};
///
/// let host = MemoryHost::new();
/// host.add_input::<i64>("numbers");
/// host.push("numbers", [1i64, 2]).unwrap();
/// let guest = Guest::new(host.clone());
///
/// let mut iter = guest.open_iterator::<i64>("numbers", 16, false).unwrap();
/// assert_eq!(iter.try_next().unwrap(), Some(1));
/// assert_eq!(iter.try_next().unwrap(), Some(2));
/// assert_eq!(iter.try_next(), Err(GuestError::Blocked));
///
/// host.push("numbers", [3i64]).unwrap();
/// host.close_input("numbers").unwrap();
/// assert_eq!(iter.collect_all().unwrap(), vec![3]);
/// iter.close();
/// ```
pub struct InputIter<'a, H, T> {
    host: &'a H,
    key: CString,
    fetch_size: usize,
    blocking: bool,
    /// Fetched items not yet handed out.
    buffer: VecDeque<T>,
    /// Set once the host reports the channel closed and drained.
    exhausted: bool,
    span: tracing::Span,
}

impl<H, T> fmt::Debug for InputIter<'_, H, T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("InputIter")
            .field("channel", &self.key)
            .field("fetch_size", &self.fetch_size)
            .field("blocking", &self.blocking)
            .field("buffered", &self.buffer.len())
            .field("exhausted", &self.exhausted)
            .finish()
    }
}

impl<H: Host, T: Element> InputIter<'_, H, T> {
    /// The channel name.
    pub fn channel(&self) -> std::borrow::Cow<'_, str> {
        self.key.to_string_lossy()
    }

    /// Number of items requested per refill.
    pub const fn fetch_size(&self) -> usize {
        self.fetch_size
    }

    /// Whether refills may suspend the calling thread.
    pub const fn is_blocking(&self) -> bool {
        self.blocking
    }

    /// Number of items fetched but not yet returned.
    pub fn buffered(&self) -> usize {
        self.buffer.len()
    }

    /// Returns `true` once the channel is closed and every item was served.
    pub fn is_exhausted(&self) -> bool {
        self.exhausted && self.buffer.is_empty()
    }

    /// Reads the next item.
    ///
    /// Returns `Ok(None)` at end of input and [`GuestError::Blocked`] when a
    /// non-blocking refill finds nothing to read.
    pub fn try_next(&mut self) -> GuestResult<Option<T>> {
        if let Some(item) = self.buffer.pop_front() {
            return Ok(Some(item));
        }
        if self.exhausted || !self.refill()? {
            return Ok(None);
        }
        Ok(self.buffer.pop_front())
    }

    /// Refills the empty buffer. Returns `false` at end of input.
    fn refill(&mut self) -> GuestResult<bool> {
        let _guard = self.span.enter();
        let items =
            fetch::<H, T>(self.host, &self.key, self.blocking, self.fetch_size, Fill::Available)?;
        if items.is_empty() {
            self.exhausted = true;
            tracing::debug!(target: "sandbox_guest", "input exhausted");
            return Ok(false);
        }
        tracing::debug!(target: "sandbox_guest", fetched = items.len(), "refilled input buffer");
        self.buffer.extend(items);
        Ok(true)
    }

    /// Reads every remaining item until end of input.
    ///
    /// If a non-blocking refill reports [`GuestError::Blocked`], the items
    /// gathered so far are put back in front of the buffer and `Blocked` is
    /// returned, so nothing is lost. Any other error discards the gathered
    /// items and is returned as is.
    pub fn collect_all(&mut self) -> GuestResult<Vec<T>> {
        let mut out: Vec<T> = Vec::new();
        loop {
            out.extend(self.buffer.drain(..));
            if self.exhausted {
                return Ok(out);
            }
            match self.refill() {
                Ok(true) => {}
                Ok(false) => return Ok(out),
                Err(GuestError::Blocked) => {
                    self.buffer = out.into();
                    return Err(GuestError::Blocked);
                }
                Err(e) => return Err(e),
            }
        }
    }

    /// Closes the iterator, releasing its buffer.
    pub fn close(mut self) {
        let _guard = self.span.enter();
        tracing::debug!(
            target: "sandbox_guest",
            discarded = self.buffer.len(),
            "closed input iterator"
        );
        self.buffer.clear();
    }
}

impl<H: Host, T: Element> Iterator for InputIter<'_, H, T> {
    type Item = GuestResult<T>;

    fn next(&mut self) -> Option<Self::Item> {
        self.try_next().transpose()
    }
}

impl<H, T> Drop for InputIter<'_, H, T> {
    fn drop(&mut self) {
        if !self.buffer.is_empty() {
            let _guard = self.span.enter();
            tracing::warn!(
                target: "sandbox_guest",
                discarded = self.buffer.len(),
                "input iterator dropped with unconsumed items"
            );
        }
    }
}

impl<H: Host> Guest<H> {
    /// Starts building an iterator over the input channel `key`.
    pub fn iter<T: Element>(&self, key: &str) -> IterBuilder<'_, H, T> {
        IterBuilder {
            guest: self,
            key: key.to_owned(),
            fetch_size: DEFAULT_FETCH_SIZE,
            blocking: true,
            _marker: std::marker::PhantomData,
        }
    }

    /// Opens an iterator over the input channel `key` that refills
    /// `fetch_size` items at a time.
    pub fn open_iterator<T: Element>(
        &self,
        key: &str,
        fetch_size: usize,
        blocking: bool,
    ) -> GuestResult<InputIter<'_, H, T>> {
        self.iter::<T>(key).fetch_size(fetch_size).blocking(blocking).open()
    }
}
