//! Socket abstraction layer for ICMP echo probing
//!
//! Every probe owns exactly one socket for its whole lifetime. The engine
//! only needs three things from it: a descriptor it can wait on for
//! readiness, a way to send a datagram and a way to read one back. Keeping
//! that behind a trait lets the scheduler be driven by something other than
//! a raw socket in tests.

use std::io;
use std::net::Ipv4Addr;
use std::os::fd::AsFd;

use crate::ping::PingError;

pub mod factory;
pub mod icmp_v4;
pub mod readiness;
pub mod utils;

#[cfg(test)]
pub mod test_utils;

pub use factory::RawSocketFactory;
pub use icmp_v4::RawIcmpV4Socket;

/// Size of the buffer used to read a single datagram
pub const RECV_BUFFER_SIZE: usize = 1024;

/// A non-blocking socket carrying ICMP echo traffic for a single probe
pub trait IcmpSocket: AsFd {
    /// Send (part of) an ICMP message to `target`, returning how many bytes
    /// were written.
    ///
    /// Returns `ErrorKind::WouldBlock` when the socket is not ready.
    fn send_to(&self, packet: &[u8], target: Ipv4Addr) -> io::Result<usize>;

    /// Read one datagram into `buf`, returning its length.
    ///
    /// On a raw socket the datagram starts with the IPv4 header.
    fn recv(&self, buf: &mut [u8]) -> io::Result<usize>;
}

/// Creates sockets for new probes
pub trait SocketFactory {
    /// Socket type produced by this factory
    type Socket: IcmpSocket;

    /// Open a fresh non-blocking socket
    ///
    /// # Errors
    ///
    /// * `PingError::InsufficientPermissions` - the OS refused to create the socket
    /// * `PingError::SocketError` - any other OS failure
    fn open(&self) -> Result<Self::Socket, PingError>;
}

impl<F: SocketFactory + ?Sized> SocketFactory for &F {
    type Socket = F::Socket;

    fn open(&self) -> Result<Self::Socket, PingError> {
        (**self).open()
    }
}

/// Write all of `packet` to `target`, looping over partial sends.
///
/// `offset` tracks how much has already gone out, so a send interrupted by
/// `WouldBlock` can resume where it stopped. Returns `Ok(true)` once the
/// whole packet has been written and `Ok(false)` if the socket stopped
/// accepting data first.
pub fn send_all<S: IcmpSocket + ?Sized>(
    socket: &S,
    packet: &[u8],
    target: Ipv4Addr,
    offset: &mut usize,
) -> io::Result<bool> {
    while *offset < packet.len() {
        match socket.send_to(&packet[*offset..], target) {
            Ok(0) => {
                return Err(io::Error::new(
                    io::ErrorKind::WriteZero,
                    "socket accepted no bytes",
                ))
            }
            Ok(sent) => *offset += sent,
            Err(e) if e.kind() == io::ErrorKind::WouldBlock => return Ok(false),
            Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
            Err(e) => return Err(e),
        }
    }
    Ok(true)
}
