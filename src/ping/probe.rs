//! Per-host probe state
//!
//! A [`Probe`] owns one socket and walks through
//! `PendingWrite -> AwaitingReply -> {Completed | TimedOut}`; reaching a
//! terminal state drops (closes) the socket.

use crate::packet::{build_request, parse_reply_header};
use crate::ping::PingError;
use crate::socket::readiness::Interest;
use crate::socket::{send_all, IcmpSocket};
use serde::{Deserialize, Serialize};
use std::io;
use std::net::Ipv4Addr;
use std::os::fd::{AsFd, BorrowedFd};
use std::time::{Duration, Instant};

/// Lifecycle state of a probe
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ProbeState {
    /// Request not (fully) sent yet; waiting for write readiness
    PendingWrite,
    /// Request sent; waiting for a reply carrying our identifier
    AwaitingReply,
    /// Matching reply received
    Completed,
    /// No matching reply within the timeout
    TimedOut,
    /// The socket reported an error and errors are being ignored
    Failed,
}

impl ProbeState {
    /// Whether the probe has finished and its socket is closed
    pub fn is_terminal(self) -> bool {
        matches!(
            self,
            ProbeState::Completed | ProbeState::TimedOut | ProbeState::Failed
        )
    }
}

/// What a finished probe reports back
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProbeOutcome {
    /// Host as originally requested
    pub host: String,
    /// Address that was probed
    pub address: Ipv4Addr,
    /// Final state of the probe
    pub state: ProbeState,
    /// Round-trip time, present only for completed probes
    pub rtt: Option<Duration>,
}

/// A single outstanding echo request and the socket that carries it
#[derive(Debug)]
pub struct Probe<S> {
    host: String,
    address: Ipv4Addr,
    identifier: u16,
    packet: Vec<u8>,
    written: usize,
    timeout: Duration,
    created_at: Instant,
    time_sent: Option<Instant>,
    time_received: Option<Instant>,
    state: ProbeState,
    socket: Option<S>,
}

impl<S: IcmpSocket> Probe<S> {
    /// Create a probe for `address`, taking ownership of `socket`
    pub fn new(
        host: impl Into<String>,
        address: Ipv4Addr,
        identifier: u16,
        timeout: Duration,
        socket: S,
    ) -> Self {
        Self {
            host: host.into(),
            address,
            identifier,
            packet: build_request(identifier),
            written: 0,
            timeout,
            created_at: Instant::now(),
            time_sent: None,
            time_received: None,
            state: ProbeState::PendingWrite,
            socket: Some(socket),
        }
    }

    /// Host as originally requested
    pub fn host(&self) -> &str {
        &self.host
    }

    /// Identifier carried by this probe's request
    pub fn identifier(&self) -> u16 {
        self.identifier
    }

    /// Current state
    pub fn state(&self) -> ProbeState {
        self.state
    }

    /// Whether the socket has been closed
    pub fn is_closed(&self) -> bool {
        self.socket.is_none()
    }

    /// Descriptor and interest to register for the next readiness wait,
    /// or `None` once the probe is closed
    pub fn poll_entry(&self) -> Option<(BorrowedFd<'_>, Interest)> {
        let socket = self.socket.as_ref()?;
        let interest = match self.state {
            ProbeState::PendingWrite => Interest::Write,
            ProbeState::AwaitingReply => Interest::Read,
            _ => return None,
        };
        Some((socket.as_fd(), interest))
    }

    /// Instant after which this probe times out
    ///
    /// Probes still waiting to send count from their creation so a socket
    /// that never becomes writable cannot stall the batch.
    pub fn deadline(&self) -> Instant {
        self.started_at() + self.timeout
    }

    fn started_at(&self) -> Instant {
        match self.state {
            ProbeState::PendingWrite => self.created_at,
            _ => self.time_sent.unwrap_or(self.created_at),
        }
    }

    /// Send the request; called when the socket is writable.
    ///
    /// Partial sends are resumed on the next call.
    pub fn handle_write(&mut self) -> Result<(), PingError> {
        if self.state != ProbeState::PendingWrite {
            return Ok(());
        }
        let Some(socket) = self.socket.as_ref() else {
            return Ok(());
        };

        let now = Instant::now();
        let done = send_all(socket, &self.packet, self.address, &mut self.written)
            .map_err(|e| PingError::socket("send echo request", e))?;
        if self.written > 0 && self.time_sent.is_none() {
            self.time_sent = Some(now);
        }
        if done {
            tracing::debug!(host = %self.host, identifier = self.identifier, "echo request sent");
            self.state = ProbeState::AwaitingReply;
        }
        Ok(())
    }

    /// Read one datagram; called when the socket is readable.
    ///
    /// A datagram that is too short or carries another identifier is
    /// discarded and the probe keeps waiting.
    pub fn handle_read(&mut self, buf: &mut [u8]) -> Result<(), PingError> {
        if self.state != ProbeState::AwaitingReply {
            return Ok(());
        }
        let Some(socket) = self.socket.as_ref() else {
            return Ok(());
        };

        let size = match socket.recv(buf) {
            Ok(size) => size,
            Err(e)
                if e.kind() == io::ErrorKind::WouldBlock
                    || e.kind() == io::ErrorKind::Interrupted =>
            {
                return Ok(());
            }
            Err(e) => return Err(PingError::socket("receive echo reply", e)),
        };
        let received_at = Instant::now();

        match parse_reply_header(&buf[..size]) {
            Some(header) if header.matches(self.identifier) => {
                self.time_received = Some(received_at);
                self.finish(ProbeState::Completed);
            }
            Some(header) => {
                tracing::trace!(
                    host = %self.host,
                    identifier = self.identifier,
                    other = header.identifier,
                    "discarding reply for another probe"
                );
            }
            None => {
                tracing::trace!(host = %self.host, size, "discarding malformed datagram");
            }
        }
        Ok(())
    }

    /// Time the probe out if its deadline has passed. Returns whether it did.
    pub fn check_timeout(&mut self, now: Instant) -> bool {
        if self.state.is_terminal() {
            return false;
        }
        if now.saturating_duration_since(self.started_at()) > self.timeout {
            self.finish(ProbeState::TimedOut);
            return true;
        }
        false
    }

    /// Close the probe after a socket error that is being ignored
    pub fn fail(&mut self) {
        self.finish(ProbeState::Failed);
    }

    /// Round-trip time, if a matching reply arrived
    pub fn rtt(&self) -> Option<Duration> {
        match (self.state, self.time_sent, self.time_received) {
            (ProbeState::Completed, Some(sent), Some(received)) => {
                Some(received.saturating_duration_since(sent))
            }
            _ => None,
        }
    }

    /// Consume the probe into its outcome
    pub fn into_outcome(self) -> ProbeOutcome {
        ProbeOutcome {
            rtt: self.rtt(),
            host: self.host,
            address: self.address,
            state: self.state,
        }
    }

    fn finish(&mut self, state: ProbeState) {
        self.state = state;
        // Dropping the socket closes it
        self.socket = None;
        match state {
            ProbeState::Completed => {
                tracing::debug!(host = %self.host, identifier = self.identifier, rtt = ?self.rtt(), "echo reply received");
            }
            ProbeState::TimedOut => {
                tracing::debug!(host = %self.host, identifier = self.identifier, timeout = ?self.timeout, "probe timed out");
            }
            _ => {}
        }
    }
}
