//! Dependency probes.

use std::future::Future;
use std::pin::Pin;

use async_trait::async_trait;
use axum::body::Body;
use axum::http::Request;
use hyper_util::{
    client::legacy::{connect::HttpConnector, Client},
    rt::TokioExecutor,
};

/// One direct external collaborator the service depends on.
///
/// Required dependencies make the service unhealthy when failing; optional
/// ones only degrade it.
#[async_trait]
pub trait DependencyProbe: Send + Sync {
    fn name(&self) -> &str;

    fn required(&self) -> bool {
        true
    }

    /// Perform one round-trip. `Err` carries an operator-readable message.
    async fn check(&self) -> Result<(), String>;
}

/// Probe an upstream service's health endpoint over HTTP.
pub struct HttpProbe {
    name: String,
    url: String,
    required: bool,
    client: Client<HttpConnector, Body>,
}

impl HttpProbe {
    pub fn new(name: impl Into<String>, url: impl Into<String>, required: bool) -> Self {
        Self {
            name: name.into(),
            url: url.into(),
            required,
            client: Client::builder(TokioExecutor::new()).build(HttpConnector::new()),
        }
    }
}

#[async_trait]
impl DependencyProbe for HttpProbe {
    fn name(&self) -> &str {
        &self.name
    }

    fn required(&self) -> bool {
        self.required
    }

    async fn check(&self) -> Result<(), String> {
        let request = Request::builder()
            .method("GET")
            .uri(&self.url)
            .header("user-agent", "logistics-gateway-health")
            .body(Body::empty())
            .map_err(|e| format!("failed to build probe request: {e}"))?;

        let response = self
            .client
            .request(request)
            .await
            .map_err(|e| format!("connection failed: {e}"))?;

        if response.status().is_success() {
            Ok(())
        } else {
            Err(format!("unexpected status {}", response.status()))
        }
    }
}

/// Probe a TCP endpoint by opening a connection. Used for Redis, whose
/// reachability matters here but whose protocol does not.
pub struct TcpProbe {
    name: String,
    host: String,
    port: u16,
    required: bool,
}

impl TcpProbe {
    pub fn new(name: impl Into<String>, host: impl Into<String>, port: u16, required: bool) -> Self {
        Self {
            name: name.into(),
            host: host.into(),
            port,
            required,
        }
    }
}

#[async_trait]
impl DependencyProbe for TcpProbe {
    fn name(&self) -> &str {
        &self.name
    }

    fn required(&self) -> bool {
        self.required
    }

    async fn check(&self) -> Result<(), String> {
        tokio::net::TcpStream::connect((self.host.as_str(), self.port))
            .await
            .map(|_| ())
            .map_err(|e| format!("connection failed: {e}"))
    }
}

type ProbeFuture = Pin<Box<dyn Future<Output = Result<(), String>> + Send>>;

/// Closure-backed probe, for database pings and tests.
pub struct FnProbe {
    name: String,
    required: bool,
    f: Box<dyn Fn() -> ProbeFuture + Send + Sync>,
}

impl FnProbe {
    pub fn new<F>(name: impl Into<String>, required: bool, f: F) -> Self
    where
        F: Fn() -> ProbeFuture + Send + Sync + 'static,
    {
        Self {
            name: name.into(),
            required,
            f: Box::new(f),
        }
    }
}

#[async_trait]
impl DependencyProbe for FnProbe {
    fn name(&self) -> &str {
        &self.name
    }

    fn required(&self) -> bool {
        self.required
    }

    async fn check(&self) -> Result<(), String> {
        (self.f)().await
    }
}
