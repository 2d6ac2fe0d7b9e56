//! Four-way view of a read result.

use crate::{GuestError, GuestResult};

/// Numeric classification of an [`Outcome`], stable across the host
/// boundary.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum OutcomeKind {
    /// The call produced a value.
    Ok = 0,
    /// The call would have blocked.
    Blocked = 1,
    /// The channel is closed and drained.
    EndOfInput = 2,
    /// The host or the client reported a failure.
    Error = 3,
}

/// A flattened read result: exactly one of value, blocked, end of input or
/// error.
///
/// Read operations return `GuestResult<Option<T>>`, which is convenient with
/// `?`. Convert into an `Outcome` when a single `match` over all four cases
/// reads better.
///
/// ```
/// use sandbox_guest::{Outcome, GuestError};
///
/// let read: Result<Option<i64>, GuestError> = Ok(None);
/// match Outcome::from(read) {
///     Outcome::Ok(v) => println!("got {v}"),
///     Outcome::Blocked => println!("try later"),
///     Outcome::EndOfInput => println!("done"),
///     Outcome::Error(msg) => eprintln!("{msg}"),
/// }
/// ```
#[derive(Debug, Clone, PartialEq)]
pub enum Outcome<T> {
    /// The call produced a value.
    Ok(T),
    /// The call would have blocked. Nothing was consumed.
    Blocked,
    /// The channel is closed and fully drained.
    EndOfInput,
    /// The call failed with the given message.
    Error(String),
}

impl<T> Outcome<T> {
    /// Returns the numeric classification.
    pub const fn kind(&self) -> OutcomeKind {
        match self {
            Self::Ok(_) => OutcomeKind::Ok,
            Self::Blocked => OutcomeKind::Blocked,
            Self::EndOfInput => OutcomeKind::EndOfInput,
            Self::Error(_) => OutcomeKind::Error,
        }
    }

    /// Returns `true` if a value was produced.
    pub const fn is_ok(&self) -> bool {
        matches!(self, Self::Ok(_))
    }

    /// Returns `true` if the call would have blocked.
    pub const fn is_blocked(&self) -> bool {
        matches!(self, Self::Blocked)
    }

    /// Returns `true` if the channel is closed and drained.
    pub const fn is_end_of_input(&self) -> bool {
        matches!(self, Self::EndOfInput)
    }

    /// Returns `true` on failure.
    pub const fn is_err(&self) -> bool {
        matches!(self, Self::Error(_))
    }

    /// Returns the value, if any.
    pub fn ok(self) -> Option<T> {
        match self {
            Self::Ok(v) => Some(v),
            _ => None,
        }
    }

    /// Maps the contained value.
    pub fn map<U, F: FnOnce(T) -> U>(self, f: F) -> Outcome<U> {
        match self {
            Self::Ok(v) => Outcome::Ok(f(v)),
            Self::Blocked => Outcome::Blocked,
            Self::EndOfInput => Outcome::EndOfInput,
            Self::Error(msg) => Outcome::Error(msg),
        }
    }
}

impl<T> From<GuestResult<Option<T>>> for Outcome<T> {
    fn from(res: GuestResult<Option<T>>) -> Self {
        match res {
            Ok(Some(v)) => Self::Ok(v),
            Ok(None) => Self::EndOfInput,
            Err(GuestError::Blocked) => Self::Blocked,
            Err(e) => Self::Error(e.to_string()),
        }
    }
}
