//! Retry policy and retry log formatting
//!
//! A failed provider pass is retried only when the failure is marked
//! retriable. The n-th retry waits `n * base_delay`.

use std::time::Duration;

use super::error::{ErrorKind, GeocoderError};

/// Default number of retries after the first attempt
pub const MAX_RETRIES: u32 = 2;

/// Default base backoff delay in milliseconds
pub const RETRY_DELAY_MS: u64 = 2000;

/// What to do after a failed pass
#[derive(Debug, Clone, PartialEq)]
pub enum RetryDecision {
    /// Sleep for `delay`, then run the pass again
    Retry {
        /// Backoff before the next attempt
        delay: Duration,
    },
    /// Retriable, but the budget is spent; surface the unwrapped cause
    Exhausted,
    /// Not retriable; surface as-is
    Fail,
}

/// Linear backoff retry policy
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Maximum number of retries after the first attempt
    pub max_retries: u32,
    /// Delay before the first retry; later retries wait a multiple of it
    pub base_delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_retries: MAX_RETRIES,
            base_delay: Duration::from_millis(RETRY_DELAY_MS),
        }
    }
}

impl RetryPolicy {
    /// Policy that never retries
    pub fn disabled() -> Self {
        Self {
            max_retries: 0,
            ..Self::default()
        }
    }

    /// Backoff before retry number `retries + 1`
    pub fn delay_for(&self, retries: u32) -> Duration {
        self.base_delay.saturating_mul(retries.saturating_add(1))
    }

    /// Classify `error` given `retries` already performed
    pub fn decide(&self, retries: u32, error: &GeocoderError) -> RetryDecision {
        if !error.is_retriable() {
            RetryDecision::Fail
        } else if retries < self.max_retries {
            RetryDecision::Retry {
                delay: self.delay_for(retries),
            }
        } else {
            RetryDecision::Exhausted
        }
    }
}

/// Log line describing a scheduled retry
#[derive(Debug, Clone)]
pub struct RetryNotice {
    /// Retry number, 1-based
    pub attempt: u32,
    /// Retry budget
    pub max_retries: u32,
    /// Backoff before the retry
    pub delay: Duration,
    /// Failure that triggered the retry
    pub reason: String,
}

impl RetryNotice {
    /// Notice for the retry following `error`
    pub fn new(attempt: u32, max_retries: u32, delay: Duration, error: &GeocoderError) -> Self {
        Self {
            attempt,
            max_retries,
            delay,
            reason: error.clone().into_cause().to_string(),
        }
    }

    /// Standard retry message
    pub fn format_retry(&self) -> String {
        format!(
            "Retrying (attempt {}/{}) after {} - waiting {:.1} seconds...",
            self.attempt,
            self.max_retries,
            self.reason,
            self.delay.as_secs_f64()
        )
    }
}

/// Multi-line summary of a terminal failure with a remediation hint
pub fn format_failure(error: &GeocoderError, max_retries: u32) -> String {
    let kind = error.kind();
    let mut lines = vec![
        "[FAILED] Geocoding request failed".to_string(),
        format!("  Last error: {error}"),
        format!("  Class: {}", kind.as_str()),
        "  Suggestions:".to_string(),
        format!("    - {}", kind.suggestion()),
    ];
    if matches!(kind, ErrorKind::RetriableProvider | ErrorKind::FatalProvider) {
        lines.push(format!(
            "    - Try increasing --max-retries (current: {max_retries})"
        ));
    }
    lines.join("\n")
}
