//! Typed channel access for functions running inside a sandbox.
//!
//! # Overview
//!
//! A sandboxed function exchanges data with its host through named
//! *channels*. Each channel carries elements of one kind (text, integers,
//! floats, booleans or bytes), is appended to by one side and consumed by the
//! other, and is closed exactly once. This crate turns the handful of raw
//! host imports (fetch, availability, append, close) into typed operations
//! with well-defined blocking, end-of-input and error behavior:
//!
//! - [`Guest::get_single`] reads one item.
//! - [`Guest::get_many`] reads a bounded batch.
//! - [`Guest::iter`] / [`Guest::open_iterator`] open a buffered
//!   [`InputIter`] that refills in chunks of a chosen fetch size.
//! - [`Guest::append_output`] and [`Guest::close_output`] write output.
//!
//! Every operation is generic over the element type through the sealed
//! [`Element`] trait, implemented for `String`, `i64`, `f64`, `bool` and
//! `u8`.
//!
//! # Quick Start
//!
//! ```
//! use sandbox_guest::{Guest, GuestResult, MemoryHost};
//!
//! fn double(guest: &Guest<MemoryHost>) -> GuestResult<()> {
//!     let mut input = guest.iter::<i64>("numbers").fetch_size(64).open()?;
//!     while let Some(n) = input.try_next()? {
//!         guest.append_output("doubled", &[n * 2])?;
//!     }
//!     input.close();
//!     guest.close_output("doubled")
//! }
//!
//! let host = MemoryHost::new();
//! host.add_closed_input("numbers", [1i64, 2, 3]);
//! host.add_output::<i64>("doubled");
//!
//! double(&Guest::new(host.clone())).unwrap();
//! assert_eq!(host.output::<i64>("doubled").unwrap(), vec![2, 4, 6]);
//! ```
//!
//! # Read results
//!
//! Reads return `GuestResult<Option<T>>`:
//!
//! | result                       | meaning                                   |
//! |------------------------------|-------------------------------------------|
//! | `Ok(Some(value))`            | a value was read                          |
//! | `Ok(None)`                   | the channel is closed and fully drained   |
//! | `Err(GuestError::Blocked)`   | a non-blocking read would have waited     |
//! | `Err(other)`                 | the host or the caller made a mistake     |
//!
//! [`Outcome`] flattens these four cases into one enum when that reads
//! better.
//!
//! # Hosts
//!
//! The [`Host`] trait is the seam between this crate and the runtime. When
//! compiled for wasm, `WasiHost` forwards to the raw imports re-exported as
//! [`ffi`] and `Guest::wasi()` is the guest of the running sandbox.
//! [`MemoryHost`] keeps channels in process, for tests and local runs.
//!
//! # Host utilities
//!
//! Besides channels, the host maps attachments ([`Guest::map_attachment`]),
//! answers file system and OS queries ([`Guest::host_path_exists`],
//! [`Guest::host_os`]), starts processes ([`HostProcess`]), records the
//! function error ([`Guest::set_function_error`]) and opens sockets
//! (`TcpStream`, `UdpSocket`).
//!
//! # Logging
//!
//! Events are emitted with [`tracing`] under the `sandbox_guest` target. Each
//! iterator records a debug span with its channel and fetch size.

#![warn(
    missing_copy_implementations,
    missing_debug_implementations,
    missing_docs,
    unreachable_pub,
    clippy::missing_const_for_fn,
    rustdoc::all
)]
#![cfg_attr(not(test), warn(unused_crate_dependencies))]
#![deny(unused_must_use, rust_2018_idioms)]
#![cfg_attr(docsrs, feature(doc_cfg))]

pub extern crate sandbox_guest_sys as ffi;

pub mod channel;
pub use channel::{
    BoolIter, ByteIter, DEFAULT_FETCH_SIZE, FloatIter, Guest, InputIter, IntIter, IterBuilder,
    TextIter,
};

pub mod entries;
pub use entries::{ChannelKind, Element, OwnedChannelData, Values};

mod error;
pub use error::{GuestError, GuestResult};

mod outcome;
pub use outcome::{Outcome, OutcomeKind};

pub mod sys;
#[cfg(any(target_family = "wasm", test))]
pub use sys::WasiHost;
#[cfg(any(unix, target_os = "wasi"))]
pub use sys::{ConnectAddress, TcpStream, ToConnectAddress, UdpSocket};
pub use sys::{
    Availability, Host, HostOs, HostProcess, HostProcessResult, MemoryHost, ProcessRequest,
};
