//! Request forwarding to upstream services.
//!
//! # Responsibilities
//! - Rewrite the inbound URI onto the matched upstream base URL
//! - Forward method, remaining path, query and body verbatim
//! - Relay upstream status, headers and body unchanged on success
//! - Translate transport failures and timeouts into a uniform 502

use std::time::{Duration, Instant};

use axum::body::Body;
use axum::extract::State;
use axum::http::{header, HeaderValue, Request, Uri};
use axum::response::{IntoResponse, Response};

use crate::error::GatewayError;
use crate::http::request::RequestIdExt;
use crate::http::response::{sanitize_forward_headers, strip_hop_by_hop};
use crate::http::server::AppState;
use crate::http::X_REQUEST_ID;
use crate::observability::metrics;

/// Main forwarding handler for `/{config|shipping|stock}/...`.
///
/// Exactly one upstream attempt per inbound request. The request body is
/// streamed through without buffering.
pub async fn forward_handler(State(state): State<AppState>, request: Request<Body>) -> Response {
    let start = Instant::now();
    let request_id = request.request_id().to_string();
    let method = request.method().clone();
    let path = request.uri().path().to_string();
    let query = request.uri().query().map(str::to_owned);

    let (route, remainder) = match state.routes.match_path(&path) {
        Some(found) => found,
        None => {
            tracing::debug!(request_id = %request_id, path = %path, "No upstream route matched");
            metrics::record_forward(method.as_str(), 404, "none", start);
            return GatewayError::NotFound(format!("No route for {path}")).into_response();
        }
    };
    let upstream = route.name.clone();

    let uri = match upstream_uri(route.base_url.as_str(), remainder, query.as_deref()) {
        Ok(uri) => uri,
        Err(e) => {
            tracing::error!(request_id = %request_id, upstream = %upstream, error = %e, "Failed to build upstream URI");
            metrics::record_forward(method.as_str(), 500, &upstream, start);
            return GatewayError::Internal("Failed to route request".to_string()).into_response();
        }
    };

    let (mut parts, body) = request.into_parts();
    sanitize_forward_headers(&mut parts.headers);
    if let Ok(value) = HeaderValue::from_str(&request_id) {
        parts.headers.insert(X_REQUEST_ID, value);
    }

    let mut upstream_request = Request::from_parts(parts, body);
    *upstream_request.uri_mut() = uri;

    let timeout = Duration::from_secs(state.config.timeouts.forward_secs);
    match tokio::time::timeout(timeout, state.client.request(upstream_request)).await {
        Ok(Ok(response)) => {
            let status = response.status();
            tracing::debug!(
                request_id = %request_id,
                upstream = %upstream,
                status = %status,
                "Upstream responded"
            );
            metrics::record_forward(method.as_str(), status.as_u16(), &upstream, start);

            let (mut parts, body) = response.into_parts();
            strip_hop_by_hop(&mut parts.headers);
            Response::from_parts(parts, Body::new(body))
        }
        Ok(Err(e)) => {
            tracing::error!(
                request_id = %request_id,
                upstream = %upstream,
                error = %e,
                "Upstream request failed"
            );
            metrics::record_forward(method.as_str(), 502, &upstream, start);
            metrics::record_upstream_error(&upstream);
            GatewayError::DependencyUnavailable(format!("{upstream} service is unavailable"))
                .into_response()
        }
        Err(_) => {
            tracing::error!(
                request_id = %request_id,
                upstream = %upstream,
                timeout_secs = timeout.as_secs(),
                "Upstream request timed out"
            );
            metrics::record_forward(method.as_str(), 502, &upstream, start);
            metrics::record_upstream_error(&upstream);
            GatewayError::DependencyUnavailable(format!("{upstream} service timed out"))
                .into_response()
        }
    }
}

fn upstream_uri(base: &str, remainder: &str, query: Option<&str>) -> Result<Uri, String> {
    let mut uri = format!("{}{}", base.trim_end_matches('/'), remainder);
    if let Some(query) = query {
        uri.push('?');
        uri.push_str(query);
    }
    uri.parse::<Uri>().map_err(|e| e.to_string())
}

/// Handler for the stock-integration surface at `/integrations/stock/...`.
///
/// Reads go through the resilient stock client (cache, retry, breaker);
/// writes pass through with a single attempt and no cache.
pub async fn stock_handler(State(state): State<AppState>, request: Request<Body>) -> Response {
    let request_id = request.request_id().to_string();
    let method = request.method().clone();
    let path = request.uri().path().to_string();
    let query = request.uri().query().map(str::to_owned);

    let remainder = path
        .strip_prefix("/integrations/stock")
        .filter(|rest| rest.is_empty() || rest.starts_with('/'))
        .map(|rest| if rest.is_empty() { "/" } else { rest });
    let remainder = match remainder {
        Some(r) => r.to_string(),
        None => {
            return GatewayError::NotFound(format!("No route for {path}")).into_response();
        }
    };

    let mut path_and_query = remainder;
    if let Some(query) = query {
        path_and_query.push('?');
        path_and_query.push_str(&query);
    }

    let body = match axum::body::to_bytes(request.into_body(), 1024 * 1024).await {
        Ok(bytes) => bytes,
        Err(e) => {
            tracing::warn!(request_id = %request_id, error = %e, "Failed to read request body");
            return GatewayError::Validation("Request body too large".to_string()).into_response();
        }
    };

    match state.stock.request(method, &path_and_query, body).await {
        Ok(stock_response) => {
            let mut response = Response::new(Body::from(stock_response.body));
            *response.status_mut() = stock_response.status;
            if let Some(content_type) = &stock_response.content_type {
                if let Ok(value) = HeaderValue::from_str(content_type) {
                    response.headers_mut().insert(header::CONTENT_TYPE, value);
                }
            }
            response
        }
        Err(err) => {
            tracing::warn!(request_id = %request_id, error = %err, "Stock integration call failed");
            err.into_response()
        }
    }
}
