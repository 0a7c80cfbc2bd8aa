//! Resilience subsystem.
//!
//! # Data Flow
//! ```text
//! Call to the external stock system:
//!     → circuit_breaker.rs (admit or fail fast per endpoint)
//!     → per-attempt timeout
//!     → On failure: retries.rs (idempotent reads only, fixed spacing)
//!     → Outcome recorded back into the breaker
//! ```
//!
//! # Design Decisions
//! - Per-endpoint circuit breaker (not global)
//! - Fail fast in Open state, no waiting for the cooldown
//! - Single trial call in Half-Open (prevents hammering a recovering system)
//! - Retries never apply to non-idempotent methods

pub mod circuit_breaker;
pub mod retries;

pub use circuit_breaker::{BreakerRegistry, BreakerState, CircuitBreaker};
pub use retries::{is_retryable, retry_pause};
