//! IPv4 raw ICMP socket

use super::IcmpSocket;
use socket2::{SockAddr, Socket as Socket2};
use std::io::{self, Read};
use std::net::{Ipv4Addr, SocketAddrV4};
use std::os::fd::{AsFd, BorrowedFd};

/// Raw ICMP socket for IPv4
///
/// Reads return the whole IP datagram, IPv4 header included. The socket is
/// closed when this value is dropped.
#[derive(Debug)]
pub struct RawIcmpV4Socket {
    socket: Socket2,
}

impl RawIcmpV4Socket {
    /// Wrap an already created raw ICMP socket, switching it to
    /// non-blocking mode.
    pub fn new(socket: Socket2) -> io::Result<Self> {
        socket.set_nonblocking(true)?;
        Ok(RawIcmpV4Socket { socket })
    }
}

impl AsFd for RawIcmpV4Socket {
    fn as_fd(&self) -> BorrowedFd<'_> {
        self.socket.as_fd()
    }
}

impl IcmpSocket for RawIcmpV4Socket {
    fn send_to(&self, packet: &[u8], target: Ipv4Addr) -> io::Result<usize> {
        // The port is meaningless for ICMP; the kernel ignores it
        let addr = SockAddr::from(SocketAddrV4::new(target, 1));
        self.socket.send_to(packet, &addr)
    }

    fn recv(&self, buf: &mut [u8]) -> io::Result<usize> {
        (&self.socket).read(buf)
    }
}
