//! Timeout and retry settings for engine operations.

use std::time::Duration;

use serde::Deserialize;

/// Default budget for a single storage call.
pub const DEFAULT_TIMEOUT_SECS: u64 = 10;

/// Per-call storage timeouts.
///
/// Every storage round-trip is bounded by one of these budgets. A caller
/// deadline, when present, shortens the budget further.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct OperationTimeouts {
    /// Budget for reads and aggregations.
    pub read_secs: u64,
    /// Budget for updates.
    pub write_secs: u64,
}

impl Default for OperationTimeouts {
    fn default() -> Self {
        Self {
            read_secs: DEFAULT_TIMEOUT_SECS,
            write_secs: DEFAULT_TIMEOUT_SECS,
        }
    }
}

impl OperationTimeouts {
    pub fn read(&self) -> Duration {
        Duration::from_secs(self.read_secs)
    }

    pub fn write(&self) -> Duration {
        Duration::from_secs(self.write_secs)
    }
}

/// Retry policy for version conflicts.
///
/// Default: 10 retries, 10ms to 2s with jitter.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct RetryConfig {
    /// Attempts after the first before giving up.
    pub max_retries: usize,
    pub min_delay_ms: u64,
    pub max_delay_ms: u64,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_retries: 10,
            min_delay_ms: 10,
            max_delay_ms: 2000,
        }
    }
}
