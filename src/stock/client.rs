//! HTTP client wrapper for the external stock system.
//!
//! # Responsibilities
//! - Serve idempotent reads from the response cache when possible
//! - Ask the per-endpoint circuit breaker before touching the network
//! - Bound every attempt by the configured timeout
//! - Retry idempotent reads with fixed spacing; never retry writes
//!
//! Non-2xx upstream statuses are handed back to the caller; 5xx counts as a
//! breaker failure, 4xx does not (the dependency answered).

use std::time::Duration;

use axum::body::{Body, Bytes};
use axum::http::{header, Method, Request, StatusCode};
use hyper_util::{
    client::legacy::{connect::HttpConnector, Client},
    rt::TokioExecutor,
};
use url::Url;

use crate::config::schema::StockApiConfig;
use crate::error::GatewayError;
use crate::resilience::{is_retryable, retry_pause, BreakerRegistry};
use crate::stock::cache::{CachedResponse, CacheStats, ResponseCache};

const MAX_RESPONSE_BYTES: usize = 4 * 1024 * 1024;

/// Response from the stock system, possibly served from cache.
#[derive(Debug, Clone)]
pub struct StockResponse {
    pub status: StatusCode,
    pub content_type: Option<String>,
    pub body: Bytes,
    pub from_cache: bool,
}

/// Resilient client for the external stock API.
pub struct StockClient {
    base_url: Url,
    config: StockApiConfig,
    client: Client<HttpConnector, Body>,
    breakers: BreakerRegistry,
    cache: ResponseCache,
}

impl StockClient {
    pub fn new(config: StockApiConfig) -> Result<Self, GatewayError> {
        let base_url = Url::parse(&config.base_url)
            .map_err(|e| GatewayError::Validation(format!("STOCK_API_URL: {e}")))?;
        let client = Client::builder(TokioExecutor::new()).build(HttpConnector::new());
        let breakers = BreakerRegistry::new(
            config.breaker_threshold,
            Duration::from_millis(config.breaker_timeout_ms),
        );
        let cache = ResponseCache::new(
            Duration::from_secs(config.cache_ttl_secs),
            config.cache_max_items,
        );
        Ok(Self {
            base_url,
            config,
            client,
            breakers,
            cache,
        })
    }

    /// The validated configuration this client runs with.
    pub fn config(&self) -> &StockApiConfig {
        &self.config
    }

    pub fn cache_stats(&self) -> CacheStats {
        self.cache.stats()
    }

    pub fn breakers(&self) -> &BreakerRegistry {
        &self.breakers
    }

    /// Perform a request against the stock API with the full resilience
    /// stack. `path_and_query` is rooted at the API base, e.g.
    /// `/items?sku=A1`.
    pub async fn request(
        &self,
        method: Method,
        path_and_query: &str,
        body: Bytes,
    ) -> Result<StockResponse, GatewayError> {
        let cacheable = method == Method::GET;
        let cache_key = ResponseCache::key(&method, path_and_query);

        if cacheable {
            if let Some(hit) = self.cache.get(&cache_key) {
                return Ok(StockResponse {
                    status: StatusCode::from_u16(hit.status)
                        .unwrap_or(StatusCode::OK),
                    content_type: hit.content_type,
                    body: hit.body,
                    from_cache: true,
                });
            }
        }

        // Breaker keyed by path only, so `/items?sku=A1` and `/items?sku=B2`
        // share one circuit per endpoint.
        let endpoint = path_and_query
            .split('?')
            .next()
            .unwrap_or(path_and_query);
        let breaker = self.breakers.get(endpoint);

        let max_attempts = if is_retryable(&method) {
            self.config.retry_attempts + 1
        } else {
            1
        };

        let mut attempt = 0;
        loop {
            attempt += 1;

            if !breaker.try_acquire() {
                return Err(GatewayError::DependencyUnavailable(
                    "Stock service is unavailable".to_string(),
                ));
            }

            match self.attempt(&method, path_and_query, body.clone()).await {
                Ok(response) => {
                    if response.status.is_server_error() {
                        breaker.record_failure();
                        if attempt < max_attempts {
                            tokio::time::sleep(retry_pause(self.config.retry_delay_ms)).await;
                            continue;
                        }
                        return Ok(response);
                    }

                    breaker.record_success();
                    if cacheable && response.status.is_success() {
                        self.cache.insert(
                            cache_key,
                            CachedResponse {
                                status: response.status.as_u16(),
                                content_type: response.content_type.clone(),
                                body: response.body.clone(),
                            },
                        );
                    }
                    return Ok(response);
                }
                Err(e) => {
                    breaker.record_failure();
                    tracing::warn!(
                        endpoint = %endpoint,
                        attempt,
                        error = %e,
                        "Stock API attempt failed"
                    );
                    if attempt < max_attempts {
                        tokio::time::sleep(retry_pause(self.config.retry_delay_ms)).await;
                        continue;
                    }
                    return Err(GatewayError::DependencyUnavailable(
                        "Stock service is unavailable".to_string(),
                    ));
                }
            }
        }
    }

    /// One timed attempt. Transport errors and timeouts surface as `Err`;
    /// any HTTP response, whatever its status, is `Ok`.
    async fn attempt(
        &self,
        method: &Method,
        path_and_query: &str,
        body: Bytes,
    ) -> Result<StockResponse, String> {
        let uri = format!(
            "{}{}",
            self.base_url.as_str().trim_end_matches('/'),
            path_and_query
        );
        let request = Request::builder()
            .method(method.clone())
            .uri(&uri)
            .header(header::ACCEPT, "application/json")
            .body(Body::from(body))
            .map_err(|e| format!("failed to build request: {e}"))?;

        let timeout = Duration::from_millis(self.config.timeout_ms);
        let response = tokio::time::timeout(timeout, self.client.request(request))
            .await
            .map_err(|_| format!("timed out after {}ms", timeout.as_millis()))?
            .map_err(|e| format!("transport error: {e}"))?;

        let status = response.status();
        let content_type = response
            .headers()
            .get(header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(str::to_owned);
        let body = axum::body::to_bytes(Body::new(response.into_body()), MAX_RESPONSE_BYTES)
            .await
            .map_err(|e| format!("failed to read response body: {e}"))?;

        Ok(StockResponse {
            status,
            content_type,
            body,
            from_cache: false,
        })
    }
}
