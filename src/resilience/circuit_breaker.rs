//! Circuit breaker for dependency protection.
//!
//! # States
//! - Closed: normal operation, calls pass through
//! - Open: dependency assumed down, calls fail fast
//! - Half-Open: testing whether the dependency recovered
//!
//! # State Transitions
//! ```text
//! Closed → Open: consecutive failures >= threshold
//! Open → Half-Open: after the cooldown elapses
//! Half-Open → Closed: trial call succeeds
//! Half-Open → Open: trial call fails
//! ```

use std::sync::Arc;
use std::sync::Mutex;
use std::time::{Duration, Instant};

use dashmap::DashMap;

use crate::observability::metrics;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BreakerState {
    Closed,
    Open,
    HalfOpen,
}

impl BreakerState {
    pub fn as_str(&self) -> &'static str {
        match self {
            BreakerState::Closed => "closed",
            BreakerState::Open => "open",
            BreakerState::HalfOpen => "half-open",
        }
    }
}

#[derive(Debug)]
struct BreakerInner {
    state: BreakerState,
    consecutive_failures: u32,
    opened_at: Option<Instant>,
    trial_in_flight: bool,
}

/// Circuit breaker for one endpoint key.
///
/// Transitions happen under the inner mutex, so concurrent callers observe
/// them atomically; in particular only one caller wins the Half-Open trial.
#[derive(Debug)]
pub struct CircuitBreaker {
    key: String,
    threshold: u32,
    cooldown: Duration,
    inner: Mutex<BreakerInner>,
}

impl CircuitBreaker {
    pub fn new(key: impl Into<String>, threshold: u32, cooldown: Duration) -> Self {
        Self {
            key: key.into(),
            threshold,
            cooldown,
            inner: Mutex::new(BreakerInner {
                state: BreakerState::Closed,
                consecutive_failures: 0,
                opened_at: None,
                trial_in_flight: false,
            }),
        }
    }

    /// Ask to place a call. `false` means fail fast: the circuit is open,
    /// or another caller already holds the Half-Open trial slot.
    pub fn try_acquire(&self) -> bool {
        let mut inner = self.inner.lock().expect("breaker mutex poisoned");
        match inner.state {
            BreakerState::Closed => true,
            BreakerState::Open => {
                let elapsed = inner
                    .opened_at
                    .map(|t| t.elapsed())
                    .unwrap_or(Duration::ZERO);
                if elapsed >= self.cooldown {
                    inner.state = BreakerState::HalfOpen;
                    inner.trial_in_flight = true;
                    tracing::info!(endpoint = %self.key, "Circuit half-open, admitting trial call");
                    metrics::record_breaker_transition(&self.key, "half-open");
                    true
                } else {
                    false
                }
            }
            BreakerState::HalfOpen => {
                if inner.trial_in_flight {
                    false
                } else {
                    inner.trial_in_flight = true;
                    true
                }
            }
        }
    }

    /// Report a successful call.
    pub fn record_success(&self) {
        let mut inner = self.inner.lock().expect("breaker mutex poisoned");
        match inner.state {
            BreakerState::Closed => {
                inner.consecutive_failures = 0;
            }
            BreakerState::HalfOpen => {
                inner.state = BreakerState::Closed;
                inner.consecutive_failures = 0;
                inner.opened_at = None;
                inner.trial_in_flight = false;
                tracing::info!(endpoint = %self.key, "Circuit closed after successful trial");
                metrics::record_breaker_transition(&self.key, "closed");
            }
            BreakerState::Open => {}
        }
    }

    /// Report a failed call.
    pub fn record_failure(&self) {
        let mut inner = self.inner.lock().expect("breaker mutex poisoned");
        match inner.state {
            BreakerState::Closed => {
                inner.consecutive_failures += 1;
                if inner.consecutive_failures >= self.threshold {
                    inner.state = BreakerState::Open;
                    inner.opened_at = Some(Instant::now());
                    tracing::warn!(
                        endpoint = %self.key,
                        failures = inner.consecutive_failures,
                        "Circuit opened"
                    );
                    metrics::record_breaker_transition(&self.key, "open");
                }
            }
            BreakerState::HalfOpen => {
                inner.state = BreakerState::Open;
                inner.opened_at = Some(Instant::now());
                inner.trial_in_flight = false;
                tracing::warn!(endpoint = %self.key, "Trial call failed, circuit re-opened");
                metrics::record_breaker_transition(&self.key, "open");
            }
            BreakerState::Open => {}
        }
    }

    /// Current state, reporting Half-Open once the cooldown has elapsed.
    pub fn state(&self) -> BreakerState {
        let inner = self.inner.lock().expect("breaker mutex poisoned");
        match inner.state {
            BreakerState::Open => {
                let elapsed = inner
                    .opened_at
                    .map(|t| t.elapsed())
                    .unwrap_or(Duration::ZERO);
                if elapsed >= self.cooldown {
                    BreakerState::HalfOpen
                } else {
                    BreakerState::Open
                }
            }
            other => other,
        }
    }

    pub fn key(&self) -> &str {
        &self.key
    }
}

/// Registry of breakers keyed by endpoint, shared across request tasks.
pub struct BreakerRegistry {
    threshold: u32,
    cooldown: Duration,
    breakers: DashMap<String, Arc<CircuitBreaker>>,
}

impl BreakerRegistry {
    pub fn new(threshold: u32, cooldown: Duration) -> Self {
        Self {
            threshold,
            cooldown,
            breakers: DashMap::new(),
        }
    }

    /// Get or create the breaker for an endpoint key.
    pub fn get(&self, key: &str) -> Arc<CircuitBreaker> {
        self.breakers
            .entry(key.to_string())
            .or_insert_with(|| {
                Arc::new(CircuitBreaker::new(key, self.threshold, self.cooldown))
            })
            .clone()
    }

    /// Snapshot of every breaker's state, for the admin surface.
    pub fn snapshot(&self) -> Vec<(String, BreakerState)> {
        let mut entries: Vec<(String, BreakerState)> = self
            .breakers
            .iter()
            .map(|entry| (entry.key().clone(), entry.value().state()))
            .collect();
        entries.sort_by(|a, b| a.0.cmp(&b.0));
        entries
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn breaker(threshold: u32, cooldown_ms: u64) -> CircuitBreaker {
        CircuitBreaker::new("stock:/items", threshold, Duration::from_millis(cooldown_ms))
    }

    #[test]
    fn test_opens_after_threshold_failures() {
        let cb = breaker(3, 10_000);
        assert!(cb.try_acquire());
        cb.record_failure();
        cb.record_failure();
        assert_eq!(cb.state(), BreakerState::Closed);
        cb.record_failure();
        assert_eq!(cb.state(), BreakerState::Open);
        assert!(!cb.try_acquire());
    }

    #[test]
    fn test_success_resets_failure_count() {
        let cb = breaker(3, 10_000);
        cb.record_failure();
        cb.record_failure();
        cb.record_success();
        cb.record_failure();
        cb.record_failure();
        assert_eq!(cb.state(), BreakerState::Closed);
    }

    #[test]
    fn test_half_open_after_cooldown_single_trial() {
        let cb = breaker(1, 20);
        cb.record_failure();
        assert!(!cb.try_acquire());

        std::thread::sleep(Duration::from_millis(30));
        assert_eq!(cb.state(), BreakerState::HalfOpen);

        // Exactly one trial call is admitted.
        assert!(cb.try_acquire());
        assert!(!cb.try_acquire());
    }

    #[test]
    fn test_trial_success_closes() {
        let cb = breaker(1, 10);
        cb.record_failure();
        std::thread::sleep(Duration::from_millis(20));
        assert!(cb.try_acquire());
        cb.record_success();
        assert_eq!(cb.state(), BreakerState::Closed);
        assert!(cb.try_acquire());
    }

    #[test]
    fn test_trial_failure_reopens() {
        let cb = breaker(1, 10);
        cb.record_failure();
        std::thread::sleep(Duration::from_millis(20));
        assert!(cb.try_acquire());
        cb.record_failure();
        assert_eq!(cb.state(), BreakerState::Open);
        assert!(!cb.try_acquire());
    }

    #[test]
    fn test_registry_reuses_breakers() {
        let registry = BreakerRegistry::new(2, Duration::from_secs(30));
        let a = registry.get("stock:/items");
        let b = registry.get("stock:/items");
        a.record_failure();
        a.record_failure();
        // Same underlying breaker.
        assert_eq!(b.state(), BreakerState::Open);
        assert_eq!(registry.snapshot().len(), 1);
    }
}
