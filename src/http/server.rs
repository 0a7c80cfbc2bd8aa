//! HTTP server setup and configuration.
//!
//! # Responsibilities
//! - Create the Axum router with all handlers
//! - Wire up middleware (tracing, timeout, request ID)
//! - Dispatch requests to the forwarder, health and admin handlers
//! - Serve with graceful shutdown

use std::sync::Arc;
use std::time::Duration;

use axum::extract::State;
use axum::routing::{any, get};
use axum::{Json, Router};
use hyper_util::{
    client::legacy::{connect::HttpConnector, Client},
    rt::TokioExecutor,
};
use tokio::net::TcpListener;
use tokio::sync::broadcast;
use tower_http::{timeout::TimeoutLayer, trace::TraceLayer};
use url::Url;

use crate::admin::admin_router;
use crate::config::schema::GatewayConfig;
use crate::error::GatewayError;
use crate::gateway::{forward_handler, stock_handler, RouteTable};
use crate::health::{aggregate, DependencyProbe, HealthReport, HttpProbe, TcpProbe};
use crate::http::request::RequestIdLayer;
use crate::stock::StockClient;

/// Application state injected into handlers.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<GatewayConfig>,
    pub routes: Arc<RouteTable>,
    pub client: Client<HttpConnector, axum::body::Body>,
    pub stock: Arc<StockClient>,
    pub probes: Arc<Vec<Arc<dyn DependencyProbe>>>,
}

/// HTTP server for the operator gateway.
pub struct HttpServer {
    router: Router,
}

impl HttpServer {
    /// Assemble all subsystems from a validated configuration.
    pub fn new(config: GatewayConfig) -> Result<Self, GatewayError> {
        let routes = Arc::new(RouteTable::from_config(&config.upstreams)?);
        let client = Client::builder(TokioExecutor::new()).build(HttpConnector::new());
        let stock = Arc::new(StockClient::new(config.stock.clone())?);
        let probes = Arc::new(build_probes(&config));
        let config = Arc::new(config);

        let state = AppState {
            config: config.clone(),
            routes,
            client,
            stock,
            probes,
        };

        let router = Self::build_router(&config, state);
        Ok(Self { router })
    }

    /// Build the Axum router with all middleware layers.
    fn build_router(config: &GatewayConfig, state: AppState) -> Router {
        let mut router = Router::new()
            .route("/health", get(health_handler))
            .route("/integrations/stock", any(stock_handler))
            .route("/integrations/stock/{*path}", any(stock_handler));

        if config.admin.enabled {
            router = router.merge(admin_router(state.clone()));
        }

        router
            .route("/", any(forward_handler))
            .route("/{*path}", any(forward_handler))
            .with_state(state)
            .layer(TimeoutLayer::new(Duration::from_secs(
                config.timeouts.request_secs,
            )))
            .layer(RequestIdLayer)
            .layer(TraceLayer::new_for_http())
    }

    /// Run the server, accepting connections on the given listener.
    pub async fn run(
        self,
        listener: TcpListener,
        mut shutdown: broadcast::Receiver<()>,
    ) -> Result<(), std::io::Error> {
        let addr = listener.local_addr()?;
        tracing::info!(address = %addr, "HTTP server starting");

        axum::serve(listener, self.router)
            .with_graceful_shutdown(async move {
                let _ = shutdown.recv().await;
            })
            .await?;

        tracing::info!("HTTP server stopped");
        Ok(())
    }
}

/// Declare the gateway's dependency probes: one per upstream service,
/// plus Redis as an optional dependency when configured.
fn build_probes(config: &GatewayConfig) -> Vec<Arc<dyn DependencyProbe>> {
    let mut probes: Vec<Arc<dyn DependencyProbe>> = Vec::new();

    for upstream in &config.upstreams {
        let url = format!(
            "{}{}",
            upstream.base_url.trim_end_matches('/'),
            config.health.probe_path
        );
        probes.push(Arc::new(HttpProbe::new(upstream.name.clone(), url, true)));
    }

    if let Some(redis) = &config.redis {
        if let Ok(url) = Url::parse(&redis.url) {
            let host = url.host_str().unwrap_or("127.0.0.1").to_string();
            let port = url.port().unwrap_or(6379);
            probes.push(Arc::new(TcpProbe::new("redis", host, port, false)));
        }
    }

    probes
}

/// Aggregate dependency health for `GET /health`, always HTTP 200.
async fn health_handler(State(state): State<AppState>) -> Json<HealthReport> {
    let report = aggregate(
        env!("CARGO_PKG_NAME"),
        env!("CARGO_PKG_VERSION"),
        &state.config.environment,
        &state.probes,
        Duration::from_millis(state.config.health.probe_timeout_ms),
    )
    .await;
    Json(report)
}
