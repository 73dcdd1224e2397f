//! Factory for creating raw ICMP probe sockets

use super::icmp_v4::RawIcmpV4Socket;
use super::utils::{raw_socket_requirement, raw_socket_suggestion};
use super::SocketFactory;
use crate::ping::PingError;
use socket2::{Domain, Protocol, Socket, Type};

// Common POSIX error codes
const EPERM: i32 = 1; // Operation not permitted
const EACCES: i32 = 13; // Permission denied

/// Opens one non-blocking raw ICMPv4 socket per probe
#[derive(Debug, Clone, Copy, Default)]
pub struct RawSocketFactory;

impl RawSocketFactory {
    /// Create a new factory
    pub fn new() -> Self {
        RawSocketFactory
    }
}

impl SocketFactory for RawSocketFactory {
    type Socket = RawIcmpV4Socket;

    fn open(&self) -> Result<Self::Socket, PingError> {
        let socket = Socket::new(Domain::IPV4, Type::RAW, Some(Protocol::ICMPV4))
            .map_err(map_create_error)?;
        RawIcmpV4Socket::new(socket)
            .map_err(|e| PingError::socket("set raw ICMP socket non-blocking", e))
    }
}

/// Whether an OS error means the process lacks the privilege to open raw sockets
pub(crate) fn is_permission_error(io_err: &std::io::Error) -> bool {
    matches!(io_err.kind(), std::io::ErrorKind::PermissionDenied)
        || io_err
            .raw_os_error()
            .is_some_and(|code| code == EPERM || code == EACCES)
}

/// Turn a socket creation failure into the matching `PingError`
pub(crate) fn map_create_error(io_err: std::io::Error) -> PingError {
    if is_permission_error(&io_err) {
        tracing::debug!(error = %io_err, "raw socket creation refused");
        PingError::InsufficientPermissions {
            required: raw_socket_requirement().to_string(),
            suggestion: raw_socket_suggestion(),
        }
    } else {
        PingError::socket("create raw ICMP socket", io_err)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::socket::utils::is_root;

    #[test]
    fn test_permission_errors_are_recognised() {
        assert!(is_permission_error(&std::io::Error::from_raw_os_error(EPERM)));
        assert!(is_permission_error(&std::io::Error::from_raw_os_error(EACCES)));
        assert!(is_permission_error(&std::io::Error::from(
            std::io::ErrorKind::PermissionDenied
        )));
        assert!(!is_permission_error(&std::io::Error::from(
            std::io::ErrorKind::AddrInUse
        )));
    }

    #[test]
    fn test_permission_error_is_structured() {
        match map_create_error(std::io::Error::from_raw_os_error(EPERM)) {
            PingError::InsufficientPermissions {
                required,
                suggestion,
            } => {
                assert!(required.contains("root"));
                assert!(!suggestion.is_empty());
            }
            other => panic!("Expected InsufficientPermissions, got: {:?}", other),
        }
    }

    #[test]
    fn test_other_errors_propagate() {
        let err = map_create_error(std::io::Error::from(std::io::ErrorKind::OutOfMemory));
        match err {
            PingError::SocketError { operation, source } => {
                assert_eq!(operation, "create raw ICMP socket");
                assert_eq!(source.kind(), std::io::ErrorKind::OutOfMemory);
            }
            other => panic!("Expected SocketError, got: {:?}", other),
        }
    }

    #[test]
    fn test_open_matches_privileges() {
        // Without root the open may still succeed through CAP_NET_RAW, but a
        // failure must then be the structured permission error.
        match RawSocketFactory::new().open() {
            Ok(_) => {}
            Err(e) if !is_root() => assert!(e.is_permission_error(), "unexpected: {e:?}"),
            Err(e) => eprintln!("raw socket unavailable even as root: {e}"),
        }
    }
}
