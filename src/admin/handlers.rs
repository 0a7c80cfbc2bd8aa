use axum::extract::State;
use axum::Json;
use serde::Serialize;

use crate::http::server::AppState;
use crate::stock::CacheStats;

#[derive(Serialize)]
pub struct SystemStatus {
    pub version: &'static str,
    pub status: &'static str,
    pub environment: String,
}

#[derive(Serialize)]
pub struct UpstreamStatus {
    pub name: String,
    pub prefix: String,
    pub base_url: String,
}

#[derive(Serialize)]
pub struct BreakerStatus {
    pub endpoint: String,
    pub state: &'static str,
}

#[derive(Serialize)]
pub struct StockStatus {
    pub breakers: Vec<BreakerStatus>,
    pub cache: CacheStats,
}

pub async fn get_status(State(state): State<AppState>) -> Json<SystemStatus> {
    Json(SystemStatus {
        version: env!("CARGO_PKG_VERSION"),
        status: "operational",
        environment: state.config.environment.clone(),
    })
}

pub async fn get_upstreams(State(state): State<AppState>) -> Json<Vec<UpstreamStatus>> {
    let statuses = state
        .routes
        .routes()
        .iter()
        .map(|route| UpstreamStatus {
            name: route.name.clone(),
            prefix: format!("/{}", route.name),
            base_url: route.base_url.to_string(),
        })
        .collect();
    Json(statuses)
}

pub async fn get_stock(State(state): State<AppState>) -> Json<StockStatus> {
    let breakers = state
        .stock
        .breakers()
        .snapshot()
        .into_iter()
        .map(|(endpoint, breaker_state)| BreakerStatus {
            endpoint,
            state: breaker_state.as_str(),
        })
        .collect();
    Json(StockStatus {
        breakers,
        cache: state.stock.cache_stats(),
    })
}
