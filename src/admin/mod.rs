//! Admin surface.
//!
//! Read-only operational endpoints behind a bearer key, disabled by
//! default. Exposes the upstream route table, circuit breaker states and
//! stock cache counters.

pub mod auth;
pub mod handlers;

use axum::middleware;
use axum::routing::get;
use axum::Router;

use crate::http::server::AppState;

/// Build the `/admin` router. Caller merges it only when enabled.
pub fn admin_router(state: AppState) -> Router<AppState> {
    Router::new()
        .route("/admin/status", get(handlers::get_status))
        .route("/admin/upstreams", get(handlers::get_upstreams))
        .route("/admin/stock", get(handlers::get_stock))
        .layer(middleware::from_fn_with_state(state, auth::require_api_key))
}
