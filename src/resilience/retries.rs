//! Retry policy for idempotent reads.
//!
//! # Responsibilities
//! - Determine if a request may be retried (idempotent read methods only)
//! - Space attempts by the configured delay, with jitter
//!
//! # Design Decisions
//! - Never retry POST/PUT/DELETE/PATCH
//! - Jitter (up to 10% of the delay) prevents thundering herd
//! - The attempt count is bounded by configuration, never unbounded

use axum::http::Method;
use rand::Rng;
use std::time::Duration;

/// Only idempotent read methods are retried.
pub fn is_retryable(method: &Method) -> bool {
    matches!(*method, Method::GET | Method::HEAD)
}

/// Pause between attempts: the configured delay plus up to 10% jitter.
pub fn retry_pause(delay_ms: u64) -> Duration {
    let jitter_range = delay_ms / 10;
    let jitter = if jitter_range > 0 {
        rand::thread_rng().gen_range(0..jitter_range)
    } else {
        0
    };
    Duration::from_millis(delay_ms + jitter)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_only_reads_are_retryable() {
        assert!(is_retryable(&Method::GET));
        assert!(is_retryable(&Method::HEAD));
        assert!(!is_retryable(&Method::POST));
        assert!(!is_retryable(&Method::PUT));
        assert!(!is_retryable(&Method::DELETE));
        assert!(!is_retryable(&Method::PATCH));
    }

    #[test]
    fn test_pause_within_jitter_window() {
        for _ in 0..20 {
            let pause = retry_pause(1000);
            assert!(pause.as_millis() >= 1000);
            assert!(pause.as_millis() < 1100);
        }
    }

    #[test]
    fn test_zero_delay_has_no_jitter() {
        assert_eq!(retry_pause(0), Duration::from_millis(0));
    }
}
