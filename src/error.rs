use crate::ChannelKind;

/// An error returned by a guest API call.
///
/// [`GuestError::Blocked`] is not a failure: it reports that a non-blocking
/// call would have had to wait for more data. Nothing was consumed and the
/// caller may retry. End of input is not an error either and is reported as
/// `Ok(None)` by the read operations.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum GuestError {
    /// The call would have blocked the calling thread.
    #[error("call would have blocked the calling thread")]
    Blocked,
    /// The channel carries a different kind of element than requested.
    #[error("expected channel \"{channel}\" to be of kind {expected} but it is {actual}")]
    KindMismatch {
        /// Channel name.
        channel: String,
        /// Kind requested by the caller.
        expected: ChannelKind,
        /// Kind reported by the host.
        actual: ChannelKind,
    },
    /// The output channel was already closed.
    #[error("tried to append output to closed channel \"{0}\"")]
    AppendToClosed(String),
    /// A caller-supplied argument cannot be sent to the host.
    #[error("invalid argument: {0}")]
    InvalidArgument(String),
    /// The host reported a channel kind discriminant this crate does not know.
    #[error("unknown or unsupported channel kind discriminant {0}")]
    UnknownKind(u8),
    /// The host reported an operating system name outside the known set.
    #[error("unknown host operating system \"{0}\"")]
    UnknownHostOs(String),
    /// The host reported a failure. The message is passed through verbatim.
    #[error("{0}")]
    Host(String),
}

impl GuestError {
    /// Returns `true` if this is [`GuestError::Blocked`].
    pub const fn is_blocked(&self) -> bool {
        matches!(self, Self::Blocked)
    }

    /// Builds an [`GuestError::InvalidArgument`] for a name that cannot be
    /// passed to the host.
    pub(crate) fn invalid_name(what: &str, name: &str, reason: impl std::fmt::Display) -> Self {
        Self::InvalidArgument(format!("invalid {what} \"{name}\": {reason}"))
    }
}

/// Result type returned by all guest API calls.
pub type GuestResult<T> = Result<T, GuestError>;
