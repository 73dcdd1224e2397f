//! Readiness waiting over a set of sockets
//!
//! This is the single suspension point of the engine: one `poll(2)` call
//! over every open probe socket, bounded by a timeout.

use nix::errno::Errno;
use nix::poll::{PollFd, PollFlags, PollTimeout};
use std::io;
use std::os::fd::BorrowedFd;
use std::time::Duration;

/// What a probe is waiting for on its socket
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Interest {
    /// Waiting to send the request
    Write,
    /// Waiting for a reply
    Read,
}

impl Interest {
    fn flags(self) -> PollFlags {
        match self {
            Interest::Write => PollFlags::POLLOUT,
            Interest::Read => PollFlags::POLLIN,
        }
    }
}

/// Readiness reported for one socket after a wait
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Readiness {
    /// A read will not block
    pub readable: bool,
    /// A write will not block
    pub writable: bool,
}

impl Readiness {
    /// Whether the socket is ready for the given interest
    pub fn is_ready_for(self, interest: Interest) -> bool {
        match interest {
            Interest::Write => self.writable,
            Interest::Read => self.readable,
        }
    }

    fn from_flags(flags: PollFlags) -> Self {
        // Error conditions are reported as ready so the next operation on
        // the socket surfaces the actual error.
        let failed = flags.intersects(PollFlags::POLLERR | PollFlags::POLLHUP | PollFlags::POLLNVAL);
        Readiness {
            readable: failed || flags.contains(PollFlags::POLLIN),
            writable: failed || flags.contains(PollFlags::POLLOUT),
        }
    }
}

/// Whole milliseconds to wait for `timeout`, rounded up and capped at what
/// a single poll call accepts
pub fn timeout_millis(timeout: Duration) -> u16 {
    u16::try_from(timeout.as_micros().div_ceil(1000)).unwrap_or(u16::MAX)
}

/// Wait until at least one socket is ready for its interest or `timeout`
/// elapses.
///
/// Returns the readiness of every socket, in input order. A wait
/// interrupted by a signal reports nothing ready.
pub fn wait(sockets: &[(BorrowedFd<'_>, Interest)], timeout: Duration) -> io::Result<Vec<Readiness>> {
    let mut fds: Vec<PollFd<'_>> = sockets
        .iter()
        .map(|(fd, interest)| PollFd::new(*fd, interest.flags()))
        .collect();

    match nix::poll::poll(&mut fds, PollTimeout::from(timeout_millis(timeout))) {
        Ok(0) | Err(Errno::EINTR) => Ok(vec![Readiness::default(); sockets.len()]),
        Ok(_) => Ok(fds
            .iter()
            .map(|fd| Readiness::from_flags(fd.revents().unwrap_or(PollFlags::empty())))
            .collect()),
        Err(err) => Err(io::Error::from(err)),
    }
}

/// Wait for a single socket to become ready
pub fn wait_one(fd: BorrowedFd<'_>, interest: Interest, timeout: Duration) -> io::Result<bool> {
    let ready = wait(&[(fd, interest)], timeout)?;
    Ok(ready.first().is_some_and(|r| r.is_ready_for(interest)))
}
