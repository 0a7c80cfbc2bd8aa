//! Configuration management subsystem.
//!
//! # Data Flow
//! ```text
//! config file (TOML, optional)
//!     → loader.rs (parse & deserialize)
//!     → env.rs (environment overlay: stock resilience, Keycloak, Redis)
//!     → validation.rs (semantic checks, bounds)
//!     → GatewayConfig (validated, immutable)
//!     → shared via Arc to all subsystems
//! ```
//!
//! # Design Decisions
//! - Config is immutable once loaded; out-of-bounds values are fatal at
//!   startup, never a runtime fallback
//! - All fields have defaults to allow minimal configs; required identity
//!   fields are enforced by validation, not by deserialization
//! - Validation separates syntactic (serde) from semantic checks and
//!   reports every violation, not just the first

pub mod env;
pub mod loader;
pub mod schema;
pub mod validation;

pub use schema::{
    AdminConfig, GatewayConfig, HealthConfig, KeycloakConfig, ListenerConfig,
    ObservabilityConfig, RedisConfig, StockApiConfig, TimeoutConfig, UpstreamConfig,
};
