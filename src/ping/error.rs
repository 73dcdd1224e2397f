//! Error types for ping operations

use thiserror::Error;

/// Errors that can occur while probing hosts
///
/// Per-host conditions (an unresolvable name, a missing reply, a malformed
/// datagram) never surface here; they end up as an absent result for that
/// host. What remains are conditions that usually affect every subsequent
/// probe and are left to the caller to act on.
#[derive(Debug, Error)]
pub enum PingError {
    /// Raw socket creation failed due to insufficient permissions
    ///
    /// This error provides structured information about what permissions
    /// are needed and how to obtain them.
    #[error("Insufficient permissions: {required}")]
    InsufficientPermissions {
        /// Description of required permissions (e.g., "root or CAP_NET_RAW")
        required: String,
        /// Suggested remedy (e.g., "Run with sudo")
        suggestion: String,
    },

    /// A socket operation failed at the OS level
    #[error("Failed to {operation}: {source}")]
    SocketError {
        /// What was being attempted (e.g., "create raw ICMP socket")
        operation: &'static str,
        /// Underlying OS error
        #[source]
        source: std::io::Error,
    },

    /// DNS resolution failed
    ///
    /// The hostname could not be resolved to an IPv4 address.
    #[error("Failed to resolve host: {0}")]
    ResolutionError(String),

    /// Invalid configuration provided
    #[error("Invalid configuration: {0}")]
    ConfigError(String),
}

impl PingError {
    /// Wrap an I/O error with the operation that produced it
    pub(crate) fn socket(operation: &'static str, source: std::io::Error) -> Self {
        PingError::SocketError { operation, source }
    }

    /// Whether this error means raw sockets are unavailable to this process
    pub fn is_permission_error(&self) -> bool {
        matches!(self, PingError::InsufficientPermissions { .. })
    }
}
