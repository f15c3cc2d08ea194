//! Retry utilities: backoff builders and retryable error classification.
//!
//! Uses `backon` for exponential backoff with jitter. Same-user writes are
//! compare-and-swap on the document version; a lost race is retried from a
//! fresh read with this backoff.

use std::time::Duration;

use backon::ExponentialBuilder;

use crate::config::RetryConfig;
use crate::error::ShopError;

/// Backoff for version conflict retries.
///
/// Defaults (see [`RetryConfig`]):
/// - Min delay: 10ms
/// - Max delay: 2s
/// - Max attempts: 10
/// - Jitter enabled
pub fn conflict_backoff(config: &RetryConfig) -> ExponentialBuilder {
    ExponentialBuilder::default()
        .with_min_delay(Duration::from_millis(config.min_delay_ms))
        .with_max_delay(Duration::from_millis(config.max_delay_ms))
        .with_max_times(config.max_retries)
        .with_jitter()
}

/// Determines if an engine error should be retried from a fresh read.
///
/// Only version conflicts qualify. Domain rejections and timeouts will not
/// succeed by re-reading.
pub fn is_conflict(err: &ShopError) -> bool {
    matches!(err, ShopError::WriteConflict { .. })
}
