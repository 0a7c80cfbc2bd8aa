//! Configuration schema definitions.
//!
//! This module defines the complete configuration structure for the gateway.
//! All types derive Serde traits for deserialization from config files; the
//! stock resilience, Keycloak and Redis blocks are additionally overlaid
//! from environment variables (see `env.rs`).

use serde::{Deserialize, Serialize};

/// Root configuration for the operator gateway.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct GatewayConfig {
    /// Listener configuration (bind address).
    pub listener: ListenerConfig,

    /// Upstream service definitions the gateway forwards to.
    pub upstreams: Vec<UpstreamConfig>,

    /// Timeout configuration.
    pub timeouts: TimeoutConfig,

    /// Health aggregation settings.
    pub health: HealthConfig,

    /// Observability settings.
    pub observability: ObservabilityConfig,

    /// Admin endpoint settings.
    pub admin: AdminConfig,

    /// Resilience parameters for the external stock system.
    pub stock: StockApiConfig,

    /// Identity provider connection (token validation is delegated upstream).
    pub keycloak: KeycloakConfig,

    /// Optional Redis connection, probed as an optional dependency.
    pub redis: Option<RedisConfig>,

    /// Deployment environment label reported by the health endpoint.
    pub environment: String,
}

/// Listener configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ListenerConfig {
    /// Bind address (e.g., "0.0.0.0:8080").
    pub bind_address: String,
}

impl Default for ListenerConfig {
    fn default() -> Self {
        Self {
            bind_address: "0.0.0.0:8080".to_string(),
        }
    }
}

/// One upstream service reachable through the gateway.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct UpstreamConfig {
    /// Service name, also the route prefix ("config" → `/config/...`).
    pub name: String,

    /// Base URL requests are forwarded to (e.g., "http://config-svc:3001").
    pub base_url: String,
}

/// Timeout configuration for various operations.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct TimeoutConfig {
    /// Total time budget for one inbound request in seconds.
    pub request_secs: u64,

    /// Budget for a single upstream forwarding attempt in seconds.
    /// Must stay below `request_secs` so a slow upstream resolves as 502
    /// rather than a client-facing hang.
    pub forward_secs: u64,
}

impl Default for TimeoutConfig {
    fn default() -> Self {
        Self {
            request_secs: 30,
            forward_secs: 10,
        }
    }
}

/// Health aggregation configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct HealthConfig {
    /// Per-probe timeout in milliseconds.
    pub probe_timeout_ms: u64,

    /// Path probed on each upstream.
    pub probe_path: String,
}

impl Default for HealthConfig {
    fn default() -> Self {
        Self {
            probe_timeout_ms: 2000,
            probe_path: "/health".to_string(),
        }
    }
}

/// Observability configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Log level (trace, debug, info, warn, error).
    pub log_level: String,

    /// Enable metrics endpoint.
    pub metrics_enabled: bool,

    /// Metrics endpoint bind address.
    pub metrics_address: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            metrics_enabled: true,
            metrics_address: "0.0.0.0:9090".to_string(),
        }
    }
}

/// Admin endpoint configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct AdminConfig {
    /// Enable the `/admin` routes.
    pub enabled: bool,

    /// API key for authentication (Bearer token).
    pub api_key: String,
}

impl Default for AdminConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            api_key: String::new(),
        }
    }
}

/// Resilience parameters for calls to the external stock system.
///
/// Every numeric field is bounds-checked at startup (see `validation.rs`);
/// the table there is the single source of truth for the ranges.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct StockApiConfig {
    /// Base URL of the external stock API. Required.
    pub base_url: String,

    /// Per-attempt timeout in milliseconds.
    pub timeout_ms: u64,

    /// Additional attempts after the first, for idempotent reads only.
    pub retry_attempts: u32,

    /// Spacing between attempts in milliseconds.
    pub retry_delay_ms: u64,

    /// Consecutive failures before the circuit opens.
    pub breaker_threshold: u32,

    /// Cooldown before an open circuit admits a trial call, in milliseconds.
    pub breaker_timeout_ms: u64,

    /// Response cache entry lifetime in seconds.
    pub cache_ttl_secs: u64,

    /// Response cache capacity; least-recently-used entries go when full.
    pub cache_max_items: usize,
}

impl Default for StockApiConfig {
    fn default() -> Self {
        Self {
            base_url: String::new(),
            timeout_ms: 5000,
            retry_attempts: 3,
            retry_delay_ms: 1000,
            breaker_threshold: 5,
            breaker_timeout_ms: 30_000,
            cache_ttl_secs: 300,
            cache_max_items: 1000,
        }
    }
}

/// Identity provider connection parameters.
///
/// The gateway only carries these for the services behind it; token issuance
/// and validation happen elsewhere. All three are required.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct KeycloakConfig {
    pub url: String,
    pub realm: String,
    pub client_id: String,
}

/// Optional Redis connection.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct RedisConfig {
    pub url: String,
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            listener: ListenerConfig::default(),
            upstreams: Vec::new(),
            timeouts: TimeoutConfig::default(),
            health: HealthConfig::default(),
            observability: ObservabilityConfig::default(),
            admin: AdminConfig::default(),
            stock: StockApiConfig::default(),
            keycloak: KeycloakConfig::default(),
            redis: None,
            environment: "development".to_string(),
        }
    }
}
