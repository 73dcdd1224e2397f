//! Multi-host ping sessions
//!
//! A session resolves every host up front, then pushes the resolvable ones
//! through the [`ProbeScheduler`] in sequential batches of at most
//! `batch_size` probes. Batches never overlap, which caps the number of raw
//! sockets open at any moment.

use crate::ping::result::PingResults;
use crate::ping::scheduler::ProbeScheduler;
use crate::ping::{PingConfig, PingError};
use crate::resolver::{Resolver, SystemResolver};
use crate::socket::{RawSocketFactory, SocketFactory};
use std::collections::HashSet;
use std::net::Ipv4Addr;
use std::time::Duration;

/// A configured multi-host ping run
#[derive(Debug)]
pub struct Session<R = SystemResolver, F = RawSocketFactory> {
    config: PingConfig,
    resolver: R,
    factory: F,
}

impl Session {
    /// Session using the system resolver and raw ICMP sockets
    pub fn new(config: PingConfig) -> Result<Self, PingError> {
        Self::with_components(config, SystemResolver::new(), RawSocketFactory::new())
    }
}

impl<R: Resolver, F: SocketFactory> Session<R, F> {
    /// Session with a custom resolver and socket factory
    pub fn with_components(config: PingConfig, resolver: R, factory: F) -> Result<Self, PingError> {
        config.validate()?;
        Ok(Self {
            config,
            resolver,
            factory,
        })
    }

    /// The configuration this session runs with
    pub fn config(&self) -> &PingConfig {
        &self.config
    }

    /// Ping every host once and collect the round-trip times.
    ///
    /// Every distinct host appears exactly once in the result. Hosts that
    /// fail to resolve are recorded as unreachable without being probed.
    ///
    /// # Errors
    ///
    /// * `PingError::InsufficientPermissions` - raw sockets are not permitted
    /// * `PingError::SocketError` - a socket failed and errors are not ignored
    pub fn run<S: AsRef<str>>(&self, hosts: &[S]) -> Result<PingResults, PingError> {
        let mut results = PingResults::new();
        let mut seen = HashSet::new();
        let mut targets: Vec<(String, Ipv4Addr)> = Vec::new();

        for host in hosts.iter().map(AsRef::as_ref) {
            if !seen.insert(host) {
                continue;
            }
            match self.resolver.resolve(host) {
                Ok(address) => targets.push((host.to_string(), address)),
                Err(e) => {
                    tracing::debug!(host, error = %e, "resolution failed, marking unreachable");
                    results.insert(host, None);
                }
            }
        }

        let batch_count = targets.len().div_ceil(self.config.batch_size);
        tracing::debug!(
            hosts = seen.len(),
            resolved = targets.len(),
            batches = batch_count,
            "starting ping session"
        );

        let mut scheduler = ProbeScheduler::new(&self.factory, &self.config);
        for (index, batch) in targets.chunks(self.config.batch_size).enumerate() {
            tracing::debug!(batch = index + 1, of = batch_count, size = batch.len(), "running batch");
            for outcome in scheduler.run_batch(batch)? {
                results.insert(outcome.host, outcome.rtt);
            }
        }

        Ok(results)
    }
}

/// Ping `hosts` concurrently, at most `batch_size` at a time.
///
/// # Example
///
/// ```no_run
/// use std::time::Duration;
///
/// let results = multiping::multi_ping(&["127.0.0.1", "example.com"], Duration::from_secs(1), 512)?;
/// for (host, rtt) in results.iter() {
///     println!("{host}: {rtt:?}");
/// }
/// # Ok::<(), multiping::PingError>(())
/// ```
pub fn multi_ping<S: AsRef<str>>(
    hosts: &[S],
    timeout: Duration,
    batch_size: usize,
) -> Result<PingResults, PingError> {
    let config = PingConfig::builder()
        .timeout(timeout)
        .batch_size(batch_size)
        .build()?;
    multi_ping_with_config(hosts, config)
}

/// Ping `hosts` concurrently with a full [`PingConfig`]
pub fn multi_ping_with_config<S: AsRef<str>>(
    hosts: &[S],
    config: PingConfig,
) -> Result<PingResults, PingError> {
    Session::new(config)?.run(hosts)
}
