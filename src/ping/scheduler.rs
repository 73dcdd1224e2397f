//! Single-threaded probe scheduler
//!
//! Drives a batch of probes to completion from one thread: every open
//! socket is registered with a single readiness wait, and whichever sockets
//! come back ready are advanced one step (send the request, or read one
//! datagram). Nothing blocks outside that wait, so no probe can hold up
//! another beyond its own timeout.

use crate::ping::probe::{Probe, ProbeOutcome};
use crate::ping::{PingConfig, PingError};
use crate::socket::readiness::{self, Interest};
use crate::socket::{SocketFactory, RECV_BUFFER_SIZE};
use std::net::Ipv4Addr;
use std::time::{Duration, Instant};

/// Runs batches of concurrent probes over sockets from `F`
///
/// Identifiers come from a counter owned by the scheduler that wraps past
/// 65535 and skips 0. [`PingConfig`] caps batches at
/// [`MAX_BATCH_SIZE`](crate::ping::config::MAX_BATCH_SIZE), so
/// the probes of one batch always carry distinct identifiers.
#[derive(Debug)]
pub struct ProbeScheduler<F> {
    factory: F,
    timeout: Duration,
    poll_interval: Duration,
    ignore_errors: bool,
    next_identifier: u16,
}

impl<F: SocketFactory> ProbeScheduler<F> {
    /// Create a scheduler using `factory` for sockets and the timing and
    /// error policy from `config`
    pub fn new(factory: F, config: &PingConfig) -> Self {
        Self {
            factory,
            timeout: config.timeout,
            poll_interval: config.poll_interval,
            ignore_errors: config.ignore_errors,
            next_identifier: 1,
        }
    }

    fn take_identifier(&mut self) -> u16 {
        let identifier = self.next_identifier;
        self.next_identifier = match self.next_identifier.wrapping_add(1) {
            0 => 1,
            next => next,
        };
        identifier
    }

    /// Probe every target concurrently and wait until each has an outcome.
    ///
    /// One socket is opened per target, so the caller bounds the number of
    /// open sockets through the size of `targets`. All sockets are closed by
    /// the time this returns.
    ///
    /// # Errors
    ///
    /// * `PingError::InsufficientPermissions` - a socket could not be opened
    /// * `PingError::SocketError` - waiting failed, or a probe's socket
    ///   failed while errors are not being ignored
    pub fn run_batch(
        &mut self,
        targets: &[(String, Ipv4Addr)],
    ) -> Result<Vec<ProbeOutcome>, PingError> {
        let mut probes = Vec::with_capacity(targets.len());
        for (host, address) in targets {
            let socket = self.factory.open()?;
            let identifier = self.take_identifier();
            probes.push(Probe::new(
                host.as_str(),
                *address,
                identifier,
                self.timeout,
                socket,
            ));
        }

        self.drive(&mut probes)?;
        Ok(probes.into_iter().map(Probe::into_outcome).collect())
    }

    /// Run the wait/dispatch loop until every probe is closed
    fn drive(&self, probes: &mut [Probe<F::Socket>]) -> Result<(), PingError> {
        let mut buf = [0u8; RECV_BUFFER_SIZE];

        loop {
            let now = Instant::now();
            for probe in probes.iter_mut() {
                probe.check_timeout(now);
            }

            let Some(next_deadline) = probes
                .iter()
                .filter(|p| !p.is_closed())
                .map(Probe::deadline)
                .min()
            else {
                return Ok(());
            };
            let wait = next_deadline
                .saturating_duration_since(now)
                .min(self.poll_interval);

            let (open, ready) = {
                let (open, entries): (Vec<usize>, Vec<_>) = probes
                    .iter()
                    .enumerate()
                    .filter_map(|(index, probe)| probe.poll_entry().map(|entry| (index, entry)))
                    .unzip();
                tracing::trace!(open = open.len(), wait = ?wait, "waiting for readiness");
                let ready = readiness::wait(&entries, wait)
                    .map_err(|e| PingError::socket("poll probe sockets", e))?;
                (open, ready)
            };

            for (index, readiness) in open.into_iter().zip(ready) {
                let probe = &mut probes[index];
                let result = match probe.poll_entry().map(|(_, interest)| interest) {
                    Some(Interest::Write) if readiness.writable => probe.handle_write(),
                    Some(Interest::Read) if readiness.readable => probe.handle_read(&mut buf),
                    _ => Ok(()),
                };

                if let Err(e) = result {
                    if !self.ignore_errors {
                        return Err(e);
                    }
                    tracing::warn!(host = %probe.host(), error = %e, "probe failed, continuing");
                    probe.fail();
                }
            }
        }
    }
}
