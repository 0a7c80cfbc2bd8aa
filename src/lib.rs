//! Logistics Operator Gateway Library

pub mod admin;
pub mod config;
pub mod error;
pub mod gateway;
pub mod health;
pub mod http;
pub mod lifecycle;
pub mod observability;
pub mod resilience;
pub mod stock;

pub use config::schema::GatewayConfig;
pub use error::GatewayError;
pub use http::HttpServer;
pub use lifecycle::Shutdown;
