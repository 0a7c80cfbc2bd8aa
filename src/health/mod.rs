//! Health aggregation subsystem.
//!
//! # Data Flow
//! ```text
//! GET /health
//!     → aggregator.rs (runs every declared probe under a bounded timeout)
//!     → probes.rs (upstream HTTP probes, Redis TCP probe, closures)
//!     → HealthReport (built fresh per call, never cached)
//! ```
//!
//! # Design Decisions
//! - The aggregator is a stateless function over probe handles; there is no
//!   shared mutable health state
//! - Probe failures are reported, never propagated; the endpoint itself
//!   always answers 200

pub mod aggregator;
pub mod probes;

use chrono::{DateTime, Utc};
use serde::Serialize;

pub use aggregator::aggregate;
pub use probes::{DependencyProbe, FnProbe, HttpProbe, TcpProbe};

/// Overall service status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum OverallStatus {
    /// Every required and optional dependency is reachable.
    Ok,
    /// Only optional dependencies are failing.
    Degraded,
    /// At least one required dependency is failing.
    Unhealthy,
}

/// Status of a single dependency.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum DependencyStatus {
    Healthy,
    Unhealthy,
}

/// Observed health of one dependency.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DependencyHealth {
    pub name: String,
    pub status: DependencyStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub response_time_ms: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// Health report returned by `GET /health`. Constructed fresh per call.
#[derive(Debug, Clone, Serialize)]
pub struct HealthReport {
    pub status: OverallStatus,
    pub timestamp: DateTime<Utc>,
    pub service: String,
    pub version: String,
    pub environment: String,
    pub dependencies: Vec<DependencyHealth>,
}
