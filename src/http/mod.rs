//! HTTP protocol handling subsystem.
//!
//! # Data Flow
//! ```text
//! TCP connection
//!     → server.rs (Axum setup, middleware wiring)
//!     → request.rs (correlation id stamped, logged)
//!     → gateway / health / admin handlers
//!     → response.rs (hop-by-hop header hygiene)
//!     → Send to client (correlation id re-stamped on the way out)
//! ```

pub mod request;
pub mod response;
pub mod server;

pub use request::{RequestId, RequestIdExt, RequestIdLayer, X_REQUEST_ID};
pub use server::HttpServer;
