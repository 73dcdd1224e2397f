//! Forward hostname resolution
//!
//! Resolution is delegated to the platform resolver. Only IPv4 addresses are
//! of interest; a name that resolves exclusively to IPv6 is treated the same
//! as one that does not resolve at all.

use crate::ping::PingError;
use std::net::{IpAddr, Ipv4Addr};

/// Resolves hostnames to the IPv4 address to probe
pub trait Resolver {
    /// Resolve `host` to an IPv4 address
    ///
    /// # Errors
    ///
    /// * `PingError::ResolutionError` - the name does not resolve to any IPv4 address
    fn resolve(&self, host: &str) -> Result<Ipv4Addr, PingError>;
}

impl<R: Resolver + ?Sized> Resolver for &R {
    fn resolve(&self, host: &str) -> Result<Ipv4Addr, PingError> {
        (**self).resolve(host)
    }
}

/// Resolver backed by the system's `getaddrinfo`
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemResolver;

impl SystemResolver {
    /// Create a new system resolver
    pub fn new() -> Self {
        SystemResolver
    }
}

impl Resolver for SystemResolver {
    fn resolve(&self, host: &str) -> Result<Ipv4Addr, PingError> {
        // Try to parse as IP first to skip the lookup entirely
        if let Ok(ip) = host.parse::<Ipv4Addr>() {
            return Ok(ip);
        }

        let addrs = dns_lookup::lookup_host(host)
            .map_err(|e| PingError::ResolutionError(format!("{host}: {e}")))?;
        first_ipv4(&addrs)
            .ok_or_else(|| PingError::ResolutionError(format!("{host}: no IPv4 address found")))
    }
}

fn first_ipv4(addrs: &[IpAddr]) -> Option<Ipv4Addr> {
    addrs.iter().find_map(|addr| match addr {
        IpAddr::V4(v4) => Some(*v4),
        IpAddr::V6(_) => None,
    })
}
