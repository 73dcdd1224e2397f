//! multiping - ICMP echo over raw sockets, one host or thousands at a time
//!
//! This library provides a blocking single-host [`ping`] and a
//! single-threaded, poll-multiplexed [`Session`] that probes many hosts
//! concurrently in bounded batches.
//!
//! Raw ICMP sockets need root (or `CAP_NET_RAW` on Linux); without them
//! every entry point fails with [`PingError::InsufficientPermissions`].
//!
//! # Example
//!
//! ```no_run
//! use multiping::{PingConfig, Session};
//! use std::time::Duration;
//!
//! let config = PingConfig::builder()
//!     .timeout(Duration::from_millis(500))
//!     .batch_size(128)
//!     .build()?;
//! let results = Session::new(config)?.run(&["127.0.0.1", "example.com"])?;
//! for (host, rtt) in results.reachable() {
//!     println!("{host}: {:.3} ms", rtt.as_secs_f64() * 1000.0);
//! }
//! # Ok::<(), multiping::PingError>(())
//! ```

pub mod checksum;
pub mod config;
pub mod packet;
pub mod ping;
pub mod report;
pub mod resolver;
pub mod socket;

// Re-export core types for library users
pub use config::TimingConfig;
pub use ping::{
    multi_ping, multi_ping_with_config, ping, PingConfig, PingConfigBuilder, PingError,
    PingResults, ProbeOutcome, ProbeState, Session,
};
pub use resolver::{Resolver, SystemResolver};
pub use socket::{IcmpSocket, RawSocketFactory, SocketFactory};
