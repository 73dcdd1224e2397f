//! ICMP echo probing
//!
//! Two entry points sit on top of the same packet codec and socket layer:
//! [`ping`] blocks on a single host, while [`Session`] (or the
//! [`multi_ping`] shorthand) probes many hosts concurrently from one thread.

pub mod config;
pub mod error;
pub mod probe;
pub mod result;
pub mod scheduler;
pub mod session;
pub mod single;

pub use config::{PingConfig, PingConfigBuilder};
pub use error::PingError;
pub use probe::{ProbeOutcome, ProbeState};
pub use result::PingResults;
pub use scheduler::ProbeScheduler;
pub use session::{multi_ping, multi_ping_with_config, Session};
pub use single::{ping, probe_with};
