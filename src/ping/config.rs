//! Configuration types for ping sessions

use crate::config::timing;
use crate::ping::PingError;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Largest batch for which every probe can carry a distinct 16-bit identifier
pub const MAX_BATCH_SIZE: usize = u16::MAX as usize;

/// Configuration for a multi-host ping session
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PingConfig {
    /// Timeout for each probe, measured from when its request was sent (default: 1000ms)
    pub timeout: Duration,
    /// Maximum number of probes (and sockets) in flight at once (default: 512)
    pub batch_size: usize,
    /// Upper bound on a single readiness wait (default: 50ms)
    pub poll_interval: Duration,
    /// Treat per-probe socket errors as a failed host instead of aborting the run
    pub ignore_errors: bool,
}

impl Default for PingConfig {
    fn default() -> Self {
        Self {
            timeout: timing::probe_timeout(),
            batch_size: timing::DEFAULT_BATCH_SIZE,
            poll_interval: timing::main_loop_poll_interval(),
            ignore_errors: false,
        }
    }
}

impl PingConfig {
    /// Create a new PingConfig builder
    pub fn builder() -> PingConfigBuilder {
        PingConfigBuilder::new()
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<(), PingError> {
        if self.batch_size == 0 {
            return Err(PingError::ConfigError(
                "batch_size must be at least 1".to_string(),
            ));
        }
        if self.batch_size > MAX_BATCH_SIZE {
            return Err(PingError::ConfigError(format!(
                "batch_size must be at most {MAX_BATCH_SIZE}"
            )));
        }
        if self.timeout.is_zero() {
            return Err(PingError::ConfigError(
                "timeout must be greater than 0".to_string(),
            ));
        }
        if self.poll_interval.is_zero() {
            return Err(PingError::ConfigError(
                "poll_interval must be greater than 0".to_string(),
            ));
        }
        Ok(())
    }
}

/// Builder for PingConfig
pub struct PingConfigBuilder {
    config: PingConfig,
}

impl PingConfigBuilder {
    /// Create a new builder with default values
    pub fn new() -> Self {
        Self {
            config: PingConfig::default(),
        }
    }

    /// Set the per-probe timeout
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.config.timeout = timeout;
        self
    }

    /// Set the maximum number of concurrent probes
    pub fn batch_size(mut self, batch_size: usize) -> Self {
        self.config.batch_size = batch_size;
        self
    }

    /// Set the upper bound on a single readiness wait
    pub fn poll_interval(mut self, interval: Duration) -> Self {
        self.config.poll_interval = interval;
        self
    }

    /// Keep going when a single probe's socket reports an error
    pub fn ignore_errors(mut self, ignore: bool) -> Self {
        self.config.ignore_errors = ignore;
        self
    }

    /// Build the configuration
    pub fn build(self) -> Result<PingConfig, PingError> {
        self.config.validate()?;
        Ok(self.config)
    }
}

impl Default for PingConfigBuilder {
    fn default() -> Self {
        Self::new()
    }
}
