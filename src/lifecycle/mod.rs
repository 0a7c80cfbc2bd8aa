//! Process lifecycle.
//!
//! Startup is orchestrated in `main.rs` (config first, listeners last);
//! shutdown coordination lives here.

pub mod shutdown;

pub use shutdown::{wait_for_signal, Shutdown};
