//! Stock system integration.
//!
//! # Data Flow
//! ```text
//! Read request for stock data:
//!     → cache.rs (signature lookup; TTL then LRU eviction)
//!     → circuit breaker admission (resilience subsystem)
//!     → client.rs (timed attempts against STOCK_API_URL, retries for reads)
//!     → cache fill on success
//! ```
//!
//! The resilience parameters come from the validated startup configuration
//! and are immutable for the process lifetime.

pub mod cache;
pub mod client;

pub use cache::{CacheStats, CachedResponse, ResponseCache};
pub use client::{StockClient, StockResponse};
