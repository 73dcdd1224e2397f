//! Blocking single-host probe

use crate::packet::{build_request, parse_reply_header};
use crate::ping::PingError;
use crate::resolver::{Resolver, SystemResolver};
use crate::socket::readiness::{wait_one, Interest};
use crate::socket::{send_all, IcmpSocket, RawSocketFactory, SocketFactory, RECV_BUFFER_SIZE};
use std::io;
use std::os::fd::AsFd;
use std::time::{Duration, Instant};

/// Ping `host` once and wait up to `timeout` for the reply.
///
/// Returns `Ok(None)` when the host does not resolve or no matching reply
/// arrives in time.
///
/// # Errors
///
/// * `PingError::InsufficientPermissions` - raw sockets are not permitted
/// * `PingError::SocketError` - sending, receiving or waiting failed
///
/// # Example
///
/// ```no_run
/// use std::time::Duration;
///
/// match multiping::ping("127.0.0.1", Duration::from_secs(1)) {
///     Ok(Some(rtt)) => println!("reply in {:?}", rtt),
///     Ok(None) => println!("no reply"),
///     Err(e) => eprintln!("{}", e),
/// }
/// ```
pub fn ping(host: &str, timeout: Duration) -> Result<Option<Duration>, PingError> {
    probe_with(&SystemResolver, &RawSocketFactory, host, timeout)
}

/// [`ping`] with an explicit resolver and socket factory
pub fn probe_with<R, F>(
    resolver: &R,
    factory: &F,
    host: &str,
    timeout: Duration,
) -> Result<Option<Duration>, PingError>
where
    R: Resolver + ?Sized,
    F: SocketFactory + ?Sized,
{
    let address = match resolver.resolve(host) {
        Ok(address) => address,
        Err(e) => {
            tracing::debug!(host, error = %e, "resolution failed");
            return Ok(None);
        }
    };

    let socket = factory.open()?;
    let identifier = single_probe_identifier(timeout);
    let packet = build_request(identifier);
    let deadline = Instant::now() + timeout;

    // Send
    let mut written = 0;
    let mut time_sent = None;
    loop {
        let now = Instant::now();
        let done = send_all(&socket, &packet, address, &mut written)
            .map_err(|e| PingError::socket("send echo request", e))?;
        if written > 0 && time_sent.is_none() {
            time_sent = Some(now);
        }
        if done {
            break;
        }
        let remaining = deadline.saturating_duration_since(Instant::now());
        if remaining.is_zero() {
            return Ok(None);
        }
        wait_one(socket.as_fd(), Interest::Write, remaining)
            .map_err(|e| PingError::socket("wait for socket", e))?;
    }
    let time_sent = time_sent.unwrap_or_else(Instant::now);
    tracing::debug!(host, %address, identifier, "echo request sent");

    // Receive
    let mut buf = [0u8; RECV_BUFFER_SIZE];
    loop {
        let remaining = (time_sent + timeout).saturating_duration_since(Instant::now());
        if remaining.is_zero() {
            tracing::debug!(host, identifier, "probe timed out");
            return Ok(None);
        }
        if !wait_one(socket.as_fd(), Interest::Read, remaining)
            .map_err(|e| PingError::socket("wait for socket", e))?
        {
            continue;
        }

        let size = match socket.recv(&mut buf) {
            Ok(size) => size,
            Err(e)
                if e.kind() == io::ErrorKind::WouldBlock
                    || e.kind() == io::ErrorKind::Interrupted =>
            {
                continue;
            }
            Err(e) => return Err(PingError::socket("receive echo reply", e)),
        };
        let received_at = Instant::now();

        match parse_reply_header(&buf[..size]) {
            Some(header) if header.matches(identifier) => {
                let rtt = received_at.saturating_duration_since(time_sent);
                tracing::debug!(host, identifier, ?rtt, "echo reply received");
                return Ok(Some(rtt));
            }
            _ => tracing::trace!(host, size, "discarding unrelated datagram"),
        }
    }
}

/// Identifier for a one-off probe: the timeout scaled by a random factor
///
/// Concurrent one-off probes may collide; the reply is then attributed to
/// whichever probe reads it first.
pub fn single_probe_identifier(timeout: Duration) -> u16 {
    let scaled = timeout.as_micros() as f64 * rand::random::<f64>();
    (scaled as u64 % 65536) as u16
}
