//! Gateway error taxonomy.
//!
//! One tagged-variant error type for every fault the gateway can surface.
//! The single `IntoResponse` impl at the bottom is the only place errors are
//! rendered to HTTP; internal causes are logged before an error reaches it
//! and are never written into the response body.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use chrono::Utc;
use serde::Serialize;

/// Faults the gateway can report to callers.
#[derive(Debug, thiserror::Error)]
pub enum GatewayError {
    /// Malformed input or out-of-bounds startup configuration.
    #[error("{0}")]
    Validation(String),

    /// Requested resource or route does not exist.
    #[error("{0}")]
    NotFound(String),

    /// An upstream service or external dependency is unreachable.
    #[error("{0}")]
    DependencyUnavailable(String),

    /// Missing or invalid credentials.
    #[error("{0}")]
    Authentication(String),

    /// Credentials valid but insufficient.
    #[error("{0}")]
    Authorization(String),

    /// Unexpected internal fault.
    #[error("{0}")]
    Internal(String),
}

impl GatewayError {
    /// HTTP status code for this error class.
    pub fn status_code(&self) -> StatusCode {
        match self {
            GatewayError::Validation(_) => StatusCode::BAD_REQUEST,
            GatewayError::NotFound(_) => StatusCode::NOT_FOUND,
            GatewayError::DependencyUnavailable(_) => StatusCode::BAD_GATEWAY,
            GatewayError::Authentication(_) => StatusCode::UNAUTHORIZED,
            GatewayError::Authorization(_) => StatusCode::FORBIDDEN,
            GatewayError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Stable discriminant string carried in the response body.
    pub fn label(&self) -> &'static str {
        match self {
            GatewayError::Validation(_) => "ValidationError",
            GatewayError::NotFound(_) => "NotFoundError",
            GatewayError::DependencyUnavailable(_) => "DependencyUnavailableError",
            GatewayError::Authentication(_) => "AuthenticationError",
            GatewayError::Authorization(_) => "AuthorizationError",
            GatewayError::Internal(_) => "ServerError",
        }
    }
}

/// Stable JSON shape for every error response.
#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub message: String,
    pub error: String,
    #[serde(rename = "statusCode")]
    pub status_code: u16,
    pub timestamp: String,
}

impl ErrorBody {
    pub fn from_error(err: &GatewayError) -> Self {
        Self {
            message: err.to_string(),
            error: err.label().to_string(),
            status_code: err.status_code().as_u16(),
            timestamp: Utc::now().to_rfc3339(),
        }
    }
}

impl IntoResponse for GatewayError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let body = ErrorBody::from_error(&self);
        (status, Json(body)).into_response()
    }
}
