//! Request correlation.
//!
//! # Responsibilities
//! - Read an existing `X-Request-ID` header or generate a UUID v4
//! - Attach the identifier to the request as an extension
//! - Stamp the identifier on the response, success and failure paths alike
//!
//! # Design Decisions
//! - Incoming values are accepted verbatim, no format validation
//! - The id is assigned before any handler runs so every log line carries it
//! - This path cannot fail; a missing or unreadable header means a fresh id

use axum::body::Body;
use axum::http::{HeaderName, HeaderValue, Request};
use axum::response::Response;
use std::future::Future;
use std::pin::Pin;
use std::task::{Context, Poll};
use tower::{Layer, Service};
use uuid::Uuid;

/// Correlation header, lowercase per HTTP/2 conventions.
pub const X_REQUEST_ID: &str = "x-request-id";

/// Correlation identifier threaded through one request's lifecycle.
#[derive(Debug, Clone)]
pub struct RequestId(pub String);

/// Extension access to the correlation id from any handler.
pub trait RequestIdExt {
    fn request_id(&self) -> &str;
}

impl<B> RequestIdExt for Request<B> {
    fn request_id(&self) -> &str {
        self.extensions()
            .get::<RequestId>()
            .map(|id| id.0.as_str())
            .unwrap_or("unknown")
    }
}

/// Layer that installs [`RequestIdService`].
#[derive(Debug, Clone, Copy)]
pub struct RequestIdLayer;

impl<S> Layer<S> for RequestIdLayer {
    type Service = RequestIdService<S>;

    fn layer(&self, inner: S) -> Self::Service {
        RequestIdService { inner }
    }
}

/// Tower service that stamps the correlation id on request and response.
#[derive(Debug, Clone)]
pub struct RequestIdService<S> {
    inner: S,
}

impl<S> Service<Request<Body>> for RequestIdService<S>
where
    S: Service<Request<Body>, Response = Response> + Send + 'static,
    S::Future: Send + 'static,
{
    type Response = S::Response;
    type Error = S::Error;
    type Future = Pin<Box<dyn Future<Output = Result<S::Response, S::Error>> + Send>>;

    fn poll_ready(&mut self, cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        self.inner.poll_ready(cx)
    }

    fn call(&mut self, mut req: Request<Body>) -> Self::Future {
        let id = req
            .headers()
            .get(X_REQUEST_ID)
            .and_then(|v| v.to_str().ok())
            .map(str::to_owned)
            .unwrap_or_else(|| Uuid::new_v4().to_string());

        tracing::debug!(
            request_id = %id,
            method = %req.method(),
            path = req.uri().path(),
            "Request received"
        );

        req.extensions_mut().insert(RequestId(id.clone()));

        let future = self.inner.call(req);
        Box::pin(async move {
            let mut response = future.await?;
            if let Ok(value) = HeaderValue::from_str(&id) {
                response
                    .headers_mut()
                    .insert(HeaderName::from_static(X_REQUEST_ID), value);
            }
            Ok(response)
        })
    }
}
