//! Bearer-key authentication for the admin surface.

use axum::body::Body;
use axum::extract::State;
use axum::http::{header, Request};
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};

use crate::error::GatewayError;
use crate::http::server::AppState;

/// Reject requests whose bearer token does not match the configured key.
pub async fn require_api_key(
    State(state): State<AppState>,
    request: Request<Body>,
    next: Next,
) -> Response {
    let expected = state.config.admin.api_key.as_str();
    let presented = request
        .headers()
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "));

    match presented {
        Some(key) if !expected.is_empty() && key == expected => next.run(request).await,
        _ => {
            tracing::warn!(path = request.uri().path(), "Admin request rejected");
            GatewayError::Authentication("Invalid or missing API key".to_string()).into_response()
        }
    }
}
