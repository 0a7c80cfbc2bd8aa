//! Request forwarding subsystem.
//!
//! # Data Flow
//! ```text
//! Inbound operator request
//!     → routes.rs (prefix → upstream base URL)
//!     → forwarder.rs (rewrite URI, forward once, relay or 502)
//! ```
//!
//! # Design Decisions
//! - Exactly one forwarding attempt per inbound request; retries belong to
//!   the downstream clients, not the gateway
//! - The gateway holds no business data and no per-request state beyond the
//!   correlation id

pub mod forwarder;
pub mod routes;

pub use forwarder::{forward_handler, stock_handler};
pub use routes::{RouteTable, UpstreamRoute};
