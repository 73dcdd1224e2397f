//! In-process socket doubles for exercising the engine without privileges
//!
//! Each [`LoopbackSocket`] is one end of a connected `UnixDatagram` pair, so
//! it has a real descriptor that `poll(2)` can wait on. Sending a request
//! makes the other end write back whatever the configured [`Behavior`]
//! dictates, wrapped in a fake 20 byte IPv4 header.

use super::{IcmpSocket, SocketFactory};
use crate::packet::IPV4_HEADER_LEN;
use crate::ping::PingError;
use crate::resolver::Resolver;
use std::cell::Cell;
use std::collections::HashMap;
use std::io;
use std::net::Ipv4Addr;
use std::os::fd::{AsFd, BorrowedFd};
use std::os::unix::net::UnixDatagram;
use std::rc::Rc;

/// How the simulated host answers a request
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Behavior {
    /// Echo the request straight back as a reply
    Reply,
    /// Never answer
    Silent,
    /// A reply for another identifier, a truncated datagram, then the real reply
    Noisy,
    /// Only ever a reply carrying another identifier
    Foreign,
    /// Fail the send with an OS error
    SendError,
}

#[derive(Debug, Default)]
struct Counters {
    live: Cell<usize>,
    peak: Cell<usize>,
    opened: Cell<usize>,
}

/// One probe's socket
#[derive(Debug)]
pub struct LoopbackSocket {
    local: UnixDatagram,
    remote: UnixDatagram,
    behaviors: Rc<HashMap<Ipv4Addr, Behavior>>,
    default: Behavior,
    counters: Rc<Counters>,
}

impl LoopbackSocket {
    fn respond(&self, icmp: &[u8]) -> io::Result<()> {
        let mut datagram = vec![0u8; IPV4_HEADER_LEN];
        datagram[0] = 0x45;
        datagram.extend_from_slice(icmp);
        self.remote.send(&datagram).map(|_| ())
    }
}

impl Drop for LoopbackSocket {
    fn drop(&mut self) {
        self.counters.live.set(self.counters.live.get() - 1);
    }
}

impl AsFd for LoopbackSocket {
    fn as_fd(&self) -> BorrowedFd<'_> {
        self.local.as_fd()
    }
}

impl IcmpSocket for LoopbackSocket {
    fn send_to(&self, packet: &[u8], target: Ipv4Addr) -> io::Result<usize> {
        let behavior = self.behaviors.get(&target).copied().unwrap_or(self.default);
        let mut reply = packet.to_vec();
        reply[0] = 0;
        let mut foreign = reply.clone();
        foreign[5] = foreign[5].wrapping_add(1);

        match behavior {
            Behavior::Reply => self.respond(&reply)?,
            Behavior::Silent => {}
            Behavior::Noisy => {
                self.respond(&foreign)?;
                self.respond(&reply[..4])?;
                self.respond(&reply)?;
            }
            Behavior::Foreign => self.respond(&foreign)?,
            Behavior::SendError => return Err(io::ErrorKind::ConnectionRefused.into()),
        }
        Ok(packet.len())
    }

    fn recv(&self, buf: &mut [u8]) -> io::Result<usize> {
        self.local.recv(buf)
    }
}

/// Hands out [`LoopbackSocket`]s and tracks how many are open
#[derive(Debug)]
pub struct LoopbackFactory {
    behaviors: Rc<HashMap<Ipv4Addr, Behavior>>,
    default: Behavior,
    counters: Rc<Counters>,
    deny: bool,
}

impl LoopbackFactory {
    /// Every target behaves the same
    pub fn new(default: Behavior) -> Self {
        Self::with_overrides(default, [])
    }

    /// Targets listed in `overrides` behave differently from the rest
    pub fn with_overrides(
        default: Behavior,
        overrides: impl IntoIterator<Item = (Ipv4Addr, Behavior)>,
    ) -> Self {
        Self {
            behaviors: Rc::new(overrides.into_iter().collect()),
            default,
            counters: Rc::default(),
            deny: false,
        }
    }

    /// A factory that always fails as if raw sockets were not permitted
    pub fn denied() -> Self {
        Self {
            deny: true,
            ..Self::new(Behavior::Reply)
        }
    }

    /// Sockets currently open
    pub fn live(&self) -> usize {
        self.counters.live.get()
    }

    /// Most sockets ever open at the same time
    pub fn peak(&self) -> usize {
        self.counters.peak.get()
    }

    /// Sockets opened in total
    pub fn opened(&self) -> usize {
        self.counters.opened.get()
    }
}

impl SocketFactory for LoopbackFactory {
    type Socket = LoopbackSocket;

    fn open(&self) -> Result<LoopbackSocket, PingError> {
        if self.deny {
            return Err(PingError::InsufficientPermissions {
                required: "root".to_string(),
                suggestion: "run as root".to_string(),
            });
        }
        let (local, remote) =
            UnixDatagram::pair().map_err(|e| PingError::socket("create socket pair", e))?;
        local
            .set_nonblocking(true)
            .map_err(|e| PingError::socket("set socket non-blocking", e))?;

        let counters = &self.counters;
        counters.opened.set(counters.opened.get() + 1);
        counters.live.set(counters.live.get() + 1);
        counters.peak.set(counters.peak.get().max(counters.live.get()));

        Ok(LoopbackSocket {
            local,
            remote,
            behaviors: Rc::clone(&self.behaviors),
            default: self.default,
            counters: Rc::clone(&self.counters),
        })
    }
}

/// Resolver answering from a fixed table; anything else fails to resolve
#[derive(Debug, Default)]
pub struct StaticResolver {
    table: HashMap<String, Ipv4Addr>,
    lookups: Cell<usize>,
}

impl StaticResolver {
    /// Build from `(host, address)` pairs
    pub fn new<'a>(entries: impl IntoIterator<Item = (&'a str, Ipv4Addr)>) -> Self {
        Self {
            table: entries
                .into_iter()
                .map(|(host, addr)| (host.to_string(), addr))
                .collect(),
            lookups: Cell::new(0),
        }
    }

    /// Number of lookups performed so far
    pub fn lookups(&self) -> usize {
        self.lookups.get()
    }
}

impl Resolver for StaticResolver {
    fn resolve(&self, host: &str) -> Result<Ipv4Addr, PingError> {
        self.lookups.set(self.lookups.get() + 1);
        self.table
            .get(host)
            .copied()
            .ok_or_else(|| PingError::ResolutionError(host.to_string()))
    }
}
