//! Channel elements and their transport.
//!
//! [`Element`] ties each Rust element type to its [`ChannelKind`] and to the
//! raw array layout used across the host boundary. [`OwnedChannelData`] owns
//! arrays allocated by the host and releases them exactly once.
mod codec;
pub use codec::{Element, Values};
pub(crate) use codec::raw_count;

mod kind;
pub use kind::ChannelKind;

mod raw;
pub use raw::OwnedChannelData;

#[cfg(test)]
pub(crate) use raw::test_support;
