//! Host adapters and host utilities.

pub(crate) mod call;

mod host;
pub use host::{Availability, Host};

mod memory;
pub use memory::MemoryHost;

#[cfg(any(target_family = "wasm", test))]
mod wasi;
#[cfg(any(target_family = "wasm", test))]
pub use wasi::WasiHost;

#[cfg(all(test, not(target_family = "wasm")))]
mod imports;

#[cfg(any(unix, target_os = "wasi"))]
mod net;
#[cfg(any(unix, target_os = "wasi"))]
pub use net::{ConnectAddress, TcpStream, ToConnectAddress, UdpSocket};

mod os;
pub use os::HostOs;

mod process;
pub use process::{HostProcess, HostProcessResult, ProcessRequest};

mod utility;
