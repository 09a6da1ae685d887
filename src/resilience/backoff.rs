//! Exponential backoff with jitter.

use std::time::Duration;

use rand::Rng;

use crate::resilience::retries::RetryPolicy;

/// Share of the delay added as random jitter, in percent.
const JITTER_PERCENT: u64 = 10;

/// Delay before retry number `retry` (1-based) under `policy`.
///
/// `base_delay_ms * 2^(retry - 1)`, capped at `max_delay_ms`, plus up to 10% jitter.
pub fn calculate_backoff(policy: &RetryPolicy, retry: u32) -> Duration {
    let Some(exponent) = retry.checked_sub(1) else {
        return Duration::ZERO;
    };

    let factor = 1u64.checked_shl(exponent).unwrap_or(u64::MAX);
    let delay_ms = policy
        .base_delay_ms
        .saturating_mul(factor)
        .min(policy.max_delay_ms);

    let jitter_ms = match delay_ms * JITTER_PERCENT / 100 {
        0 => 0,
        spread => rand::thread_rng().gen_range(0..spread),
    };

    Duration::from_millis(delay_ms + jitter_ms)
}
