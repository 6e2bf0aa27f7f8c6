//! Retry and backoff utilities for archive downloads.
//!
//! This module provides functions for classifying transient errors and
//! computing exponential backoff delays.

use std::time::Duration;

/// Default number of attempts for transient network errors.
pub const DEFAULT_NETWORK_RETRIES: u32 = 3;

/// Base delay for exponential backoff (1 second).
pub const DEFAULT_BACKOFF_BASE: Duration = Duration::from_secs(1);

/// Maximum delay cap for exponential backoff (30 seconds).
pub const DEFAULT_BACKOFF_MAX: Duration = Duration::from_secs(30);

/// Determine if a reqwest error is a transient network error that should be retried.
///
/// Returns true for connection errors, timeouts, interrupted bodies and
/// gateway errors. Returns false for errors that are unlikely to resolve on retry.
pub fn is_transient_network_error(error: &reqwest::Error) -> bool {
    if error.is_connect() || error.is_timeout() || error.is_body() {
        return true;
    }

    error.status().is_some_and(|status| is_transient_status(status.as_u16()))
}

/// 502 Bad Gateway, 503 Service Unavailable and 504 Gateway Timeout are
/// usually temporary.
pub fn is_transient_status(status: u16) -> bool {
    matches!(status, 502..=504)
}

/// Calculate exponential backoff delay with jitter.
///
/// Uses the formula: min(base * 2^attempt + jitter, max_delay)
/// where jitter is half the base, capped at 500ms.
pub fn calculate_backoff(attempt: u32, base: Duration, max: Duration) -> Duration {
    let exponential = base.saturating_mul(2u32.saturating_pow(attempt));
    let jitter_ms = (base.as_millis() as u64).min(1000);
    let jitter = Duration::from_millis(jitter_ms / 2);
    exponential.saturating_add(jitter).min(max)
}
