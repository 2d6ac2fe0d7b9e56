//! Sockets opened by the host on behalf of the guest.
//!
//! The host checks connect capabilities by host name, so addresses must name
//! a host rather than an IP literal. The returned sockets wrap the file
//! descriptor handed over by the host.

use crate::{Guest, GuestError, GuestResult, Host};
use std::{
    fmt,
    fs::File,
    io::{self, Read, Write},
    net::IpAddr,
    os::fd::{AsRawFd, FromRawFd, RawFd},
};

/// A host name and port to connect to.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ConnectAddress {
    host: String,
    port: u16,
}

impl ConnectAddress {
    /// Creates an address, rejecting IP literals.
    pub fn new(host: impl Into<String>, port: u16) -> GuestResult<Self> {
        let host = host.into();
        let literal = host.trim_start_matches('[').trim_end_matches(']');
        if literal.parse::<IpAddr>().is_ok() {
            return Err(GuestError::InvalidArgument(format!(
                "connect only supports host names, got IP address \"{host}\""
            )));
        }
        if host.is_empty() {
            return Err(GuestError::InvalidArgument("connect address has no host".to_owned()));
        }
        Ok(Self { host, port })
    }

    /// The host name.
    pub fn host(&self) -> &str {
        &self.host
    }

    /// The port.
    pub const fn port(&self) -> u16 {
        self.port
    }

    fn url(&self, scheme: &str) -> String {
        format!("{scheme}://{self}")
    }
}

impl fmt::Display for ConnectAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.host, self.port)
    }
}

/// Conversion into a [`ConnectAddress`].
pub trait ToConnectAddress {
    /// Parses or validates the address.
    fn to_address(&self) -> GuestResult<ConnectAddress>;
}

impl ToConnectAddress for ConnectAddress {
    fn to_address(&self) -> GuestResult<ConnectAddress> {
        Ok(self.clone())
    }
}

impl ToConnectAddress for (&str, u16) {
    fn to_address(&self) -> GuestResult<ConnectAddress> {
        ConnectAddress::new(self.0, self.1)
    }
}

impl ToConnectAddress for (String, u16) {
    fn to_address(&self) -> GuestResult<ConnectAddress> {
        ConnectAddress::new(self.0.as_str(), self.1)
    }
}

impl ToConnectAddress for str {
    fn to_address(&self) -> GuestResult<ConnectAddress> {
        let (host, port) = self.rsplit_once(':').ok_or_else(|| {
            GuestError::InvalidArgument(format!("address did not contain a port: \"{self}\""))
        })?;
        let port = port.parse::<u16>().map_err(|e| {
            GuestError::InvalidArgument(format!("failed to parse port in \"{self}\": {e}"))
        })?;
        ConnectAddress::new(host, port)
    }
}

impl ToConnectAddress for &str {
    fn to_address(&self) -> GuestResult<ConnectAddress> {
        (**self).to_address()
    }
}

impl ToConnectAddress for String {
    fn to_address(&self) -> GuestResult<ConnectAddress> {
        self.as_str().to_address()
    }
}

/// Dials `url` through the host and takes ownership of the descriptor.
fn dial<H: Host>(guest: &Guest<H>, url: &str) -> GuestResult<File> {
    let fd = guest.connect_raw(url)?;
    if fd < 0 {
        return Err(GuestError::Host(format!("host returned invalid file descriptor {fd}")));
    }
    // SAFETY: the host hands over a fresh descriptor that nothing else owns.
    Ok(unsafe { File::from_raw_fd(fd) })
}

/// A TCP stream opened by the host.
#[derive(Debug)]
pub struct TcpStream {
    inner: File,
    peer_addr: ConnectAddress,
}

impl TcpStream {
    /// Opens a TCP connection to `address`.
    pub fn connect<H: Host, A: ToConnectAddress + ?Sized>(
        guest: &Guest<H>,
        address: &A,
    ) -> GuestResult<Self> {
        let peer_addr = address.to_address()?;
        let inner = dial(guest, &peer_addr.url("tcp"))?;
        Ok(Self { inner, peer_addr })
    }

    /// The address this stream was opened to.
    pub const fn peer_addr(&self) -> &ConnectAddress {
        &self.peer_addr
    }
}

impl Read for TcpStream {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        self.inner.read(buf)
    }
}

impl Write for TcpStream {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.inner.write(buf)
    }

    fn flush(&mut self) -> io::Result<()> {
        self.inner.flush()
    }
}

impl AsRawFd for TcpStream {
    fn as_raw_fd(&self) -> RawFd {
        self.inner.as_raw_fd()
    }
}

/// A connected UDP socket opened by the host.
#[derive(Debug)]
pub struct UdpSocket {
    inner: File,
    peer_addr: ConnectAddress,
}

impl UdpSocket {
    /// Opens a UDP socket connected to `address`.
    pub fn connect<H: Host, A: ToConnectAddress + ?Sized>(
        guest: &Guest<H>,
        address: &A,
    ) -> GuestResult<Self> {
        let peer_addr = address.to_address()?;
        let inner = dial(guest, &peer_addr.url("udp"))?;
        Ok(Self { inner, peer_addr })
    }

    /// The address this socket is connected to.
    pub const fn peer_addr(&self) -> &ConnectAddress {
        &self.peer_addr
    }

    /// Sends a datagram to the peer.
    pub fn send(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.inner.write(buf)
    }

    /// Receives a datagram from the peer.
    pub fn recv(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        self.inner.read(buf)
    }
}

impl AsRawFd for UdpSocket {
    fn as_raw_fd(&self) -> RawFd {
        self.inner.as_raw_fd()
    }
}
