//! Retry and backoff policy for fal.ai requests.
//!
//! Two kinds of failure are retried: rate limiting (HTTP 429) and transient
//! network errors. Everything else fails immediately.

use std::time::Duration;

/// Default number of retry attempts for rate-limited requests.
pub const DEFAULT_MAX_RETRIES: u32 = 5;

/// Default number of retry attempts for transient network errors.
pub const DEFAULT_NETWORK_RETRIES: u32 = 3;

/// Base delay for exponential backoff (1 second).
pub const DEFAULT_BACKOFF_BASE: Duration = Duration::from_secs(1);

/// Maximum delay cap for exponential backoff (60 seconds).
pub const DEFAULT_BACKOFF_MAX: Duration = Duration::from_secs(60);

/// How many times, and how patiently, a submission is retried.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    pub max_rate_limit_retries: u32,
    pub max_network_retries: u32,
    pub backoff_base: Duration,
    pub backoff_max: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_rate_limit_retries: DEFAULT_MAX_RETRIES,
            max_network_retries: DEFAULT_NETWORK_RETRIES,
            backoff_base: DEFAULT_BACKOFF_BASE,
            backoff_max: DEFAULT_BACKOFF_MAX,
        }
    }
}

impl RetryPolicy {
    /// A policy that never retries.
    pub fn none() -> Self {
        Self {
            max_rate_limit_retries: 0,
            max_network_retries: 0,
            ..Self::default()
        }
    }

    /// Delay before retry number `attempt` (0-based).
    ///
    /// A server-supplied Retry-After wins over the exponential schedule, but
    /// both are capped at `backoff_max`.
    pub fn delay(&self, attempt: u32, retry_after_secs: Option<u64>) -> Duration {
        match retry_after_secs {
            Some(secs) => Duration::from_secs(secs).min(self.backoff_max),
            None => calculate_backoff(attempt, self.backoff_base, self.backoff_max),
        }
    }
}

/// Whether a reqwest error is worth retrying.
///
/// Connection failures, timeouts, interrupted bodies and 502/503/504
/// responses are considered transient.
pub fn is_transient_network_error(error: &reqwest::Error) -> bool {
    if error.is_connect() || error.is_timeout() || error.is_body() {
        return true;
    }

    matches!(error.status().map(|s| s.as_u16()), Some(502..=504))
}

/// Seconds from an integer Retry-After header, if present.
pub fn parse_retry_after(response: &reqwest::Response) -> Option<u64> {
    response
        .headers()
        .get(reqwest::header::RETRY_AFTER)
        .and_then(|v| v.to_str().ok())
        .and_then(|s| s.trim().parse::<u64>().ok())
}

/// Exponential backoff: `min(base * 2^attempt + jitter, max)`.
///
/// The jitter is a fixed half of `base`, itself capped at 500ms.
pub fn calculate_backoff(attempt: u32, base: Duration, max: Duration) -> Duration {
    let exponential = base.saturating_mul(2u32.saturating_pow(attempt));
    let jitter_ms = (base.as_millis() as u64).min(1000);
    let jitter = Duration::from_millis(jitter_ms / 2);
    exponential.saturating_add(jitter).min(max)
}
