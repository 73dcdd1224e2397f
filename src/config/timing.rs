//! Global timing configuration with compile-time defaults and runtime overrides
//!
//! Default values are defined as compile-time constants, but can be
//! overridden once at runtime via CLI arguments or the library API.

use once_cell::sync::OnceCell;
use serde::{Deserialize, Serialize};
use std::time::Duration;

// Compile-time defaults as public constants (in milliseconds)
/// Default per-probe timeout in milliseconds
pub const DEFAULT_PROBE_TIMEOUT_MS: u64 = 1000;
/// Default main loop poll interval in milliseconds
pub const DEFAULT_MAIN_LOOP_POLL_INTERVAL_MS: u64 = 50;
/// Default number of probes in flight per batch
pub const DEFAULT_BATCH_SIZE: usize = 512;

/// Timing values that may be overridden at startup
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimingConfig {
    /// How long to wait for a reply before giving up on a host
    pub probe_timeout: Duration,
    /// Upper bound on a single readiness wait in the scheduler loop
    pub main_loop_poll_interval: Duration,
}

impl Default for TimingConfig {
    fn default() -> Self {
        Self {
            probe_timeout: Duration::from_millis(DEFAULT_PROBE_TIMEOUT_MS),
            main_loop_poll_interval: Duration::from_millis(DEFAULT_MAIN_LOOP_POLL_INTERVAL_MS),
        }
    }
}

// Runtime override storage - set once at program startup
static OVERRIDE_CONFIG: OnceCell<TimingConfig> = OnceCell::new();

/// Get the per-probe timeout
pub fn probe_timeout() -> Duration {
    OVERRIDE_CONFIG
        .get()
        .map(|c| c.probe_timeout)
        .unwrap_or_else(|| Duration::from_millis(DEFAULT_PROBE_TIMEOUT_MS))
}

/// Get the main loop poll interval duration
pub fn main_loop_poll_interval() -> Duration {
    OVERRIDE_CONFIG
        .get()
        .map(|c| c.main_loop_poll_interval)
        .unwrap_or_else(|| Duration::from_millis(DEFAULT_MAIN_LOOP_POLL_INTERVAL_MS))
}

/// Set the global timing configuration
///
/// This should be called once at program startup if custom timing is needed.
/// Returns the rejected configuration if one has already been set.
pub fn set_config(config: TimingConfig) -> Result<(), TimingConfig> {
    OVERRIDE_CONFIG.set(config)
}

/// Check if custom timing configuration has been set
pub fn is_custom_config_set() -> bool {
    OVERRIDE_CONFIG.get().is_some()
}
