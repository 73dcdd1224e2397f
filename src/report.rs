//! Human-readable reports

use crate::ping::{ping, PingError};
use std::time::Duration;

/// Default number of attempts in a verbose report
pub const DEFAULT_VERBOSE_COUNT: usize = 4;
/// Default per-attempt timeout in a verbose report
pub const DEFAULT_VERBOSE_TIMEOUT: Duration = Duration::from_secs(2);

/// Ping `host` `count` times in a row and render one line per attempt,
/// followed by an empty line.
///
/// # Errors
///
/// Returns the first socket or permission error; later attempts are not made.
pub fn verbose_ping_lines(
    host: &str,
    timeout: Duration,
    count: usize,
) -> Result<Vec<String>, PingError> {
    verbose_lines_with(host, timeout, count, ping)
}

/// [`verbose_ping_lines`] with the probe supplied by the caller
pub fn verbose_lines_with<P>(
    host: &str,
    timeout: Duration,
    count: usize,
    mut probe: P,
) -> Result<Vec<String>, PingError>
where
    P: FnMut(&str, Duration) -> Result<Option<Duration>, PingError>,
{
    let mut lines = Vec::with_capacity(count + 1);
    for _ in 0..count {
        let rtt = probe(host, timeout)?;
        lines.push(format_attempt(host, timeout, rtt));
    }
    lines.push(String::new());
    Ok(lines)
}

/// One report line for a single attempt
pub fn format_attempt(host: &str, timeout: Duration, rtt: Option<Duration>) -> String {
    match rtt {
        Some(rtt) => format!(
            "ping {host}... get ping in {:.4} milliseconds.",
            rtt.as_secs_f64() * 1000.0
        ),
        None => format!(
            "ping {host}... failed. (Timeout within {} seconds.)",
            timeout.as_secs_f64()
        ),
    }
}
