//! Utility functions for socket operations

/// Check if running as root
pub fn is_root() -> bool {
    nix::unistd::geteuid().is_root()
}

/// Describe what is needed to open a raw ICMP socket on this platform
pub fn raw_socket_requirement() -> &'static str {
    if cfg!(target_os = "linux") {
        "root or CAP_NET_RAW"
    } else {
        "root"
    }
}

/// Suggest how to obtain raw socket access, given the current privileges
pub fn raw_socket_suggestion() -> String {
    if is_root() {
        // Already root but still refused: a sandbox or security module is in the way
        "Raw ICMP sockets were refused even though running as root. Check container \
         capabilities (CAP_NET_RAW) or security policies such as seccomp/SELinux."
            .to_string()
    } else if cfg!(target_os = "linux") {
        format!(
            "ICMP messages can only be sent from processes running as root. \
             Run with sudo: sudo {}, or grant the capability: sudo setcap cap_net_raw+ep <binary>",
            std::env::args().collect::<Vec<_>>().join(" ")
        )
    } else {
        format!(
            "ICMP messages can only be sent from processes running as root. \
             Run with sudo: sudo {}",
            std::env::args().collect::<Vec<_>>().join(" ")
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_requirement_mentions_root() {
        assert!(raw_socket_requirement().contains("root"));
    }

    #[test]
    fn test_suggestion_is_actionable() {
        let suggestion = raw_socket_suggestion();
        assert!(!suggestion.is_empty());
        if !is_root() {
            assert!(suggestion.contains("sudo"));
        }
    }
}
