//! Retry logic.
//!
//! # Responsibilities
//! - Determine if a call is retryable (idempotent methods only)
//! - Compute the backoff before each retry
//!
//! # Design Decisions
//! - Never retry POST or form uploads (non-idempotent)
//! - Jittered backoff prevents thundering herd
//! - Transport failures and timeouts always retryable; only 502/503/504 among statuses

use std::time::Duration;

use reqwest::{Method, StatusCode};

use crate::config::schema::RetryConfig;
use crate::resilience::backoff::calculate_backoff;

/// Bounded retry policy derived from [`RetryConfig`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RetryPolicy {
    pub max_retries: u32,
    pub base_delay_ms: u64,
    pub max_delay_ms: u64,
}

impl RetryPolicy {
    /// Policy that never retries.
    pub fn disabled() -> Self {
        Self {
            max_retries: 0,
            base_delay_ms: 0,
            max_delay_ms: 0,
        }
    }

    /// Total attempts allowed for a call with `method`.
    pub fn max_attempts(&self, method: &Method) -> u32 {
        if is_idempotent(method) {
            self.max_retries + 1
        } else {
            1
        }
    }

    /// Delay before retry number `retry` (1-based).
    pub fn backoff(&self, retry: u32) -> Duration {
        calculate_backoff(self, retry)
    }
}

impl From<&RetryConfig> for RetryPolicy {
    fn from(config: &RetryConfig) -> Self {
        if !config.enabled {
            return Self::disabled();
        }
        Self {
            max_retries: config.max_retries,
            base_delay_ms: config.retry_delay_ms,
            max_delay_ms: config.max_delay_ms,
        }
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::from(&RetryConfig::default())
    }
}

/// Methods that may be replayed without changing the outcome.
pub fn is_idempotent(method: &Method) -> bool {
    matches!(
        *method,
        Method::GET | Method::HEAD | Method::PUT | Method::DELETE | Method::OPTIONS
    )
}

/// Whether an attempt outcome warrants another try.
///
/// `status` is `None` when the attempt failed without a response.
pub fn is_retryable(method: &Method, status: Option<StatusCode>, transport_failure: bool) -> bool {
    if !is_idempotent(method) {
        return false;
    }
    if transport_failure {
        return true;
    }
    matches!(
        status,
        Some(StatusCode::BAD_GATEWAY | StatusCode::SERVICE_UNAVAILABLE | StatusCode::GATEWAY_TIMEOUT)
    )
}
