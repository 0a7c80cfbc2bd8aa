//! Environment overlay for the configuration.
//!
//! The stock resilience block, Keycloak connection, Redis connection, and
//! environment label come from the process environment and take precedence
//! over the config file. A variable that is present but unparseable is a
//! startup error naming the variable; bounds are enforced afterwards by
//! `validation.rs`.

use crate::config::schema::GatewayConfig;
use crate::config::validation::ValidationError;

/// Environment variables consumed by the overlay.
pub const STOCK_API_URL: &str = "STOCK_API_URL";
pub const STOCK_API_TIMEOUT: &str = "STOCK_API_TIMEOUT";
pub const STOCK_API_RETRY_ATTEMPTS: &str = "STOCK_API_RETRY_ATTEMPTS";
pub const STOCK_API_RETRY_DELAY: &str = "STOCK_API_RETRY_DELAY";
pub const STOCK_CIRCUIT_BREAKER_THRESHOLD: &str = "STOCK_CIRCUIT_BREAKER_THRESHOLD";
pub const STOCK_CIRCUIT_BREAKER_TIMEOUT: &str = "STOCK_CIRCUIT_BREAKER_TIMEOUT";
pub const STOCK_CACHE_TTL: &str = "STOCK_CACHE_TTL";
pub const STOCK_CACHE_MAX_ITEMS: &str = "STOCK_CACHE_MAX_ITEMS";
pub const KEYCLOAK_URL: &str = "KEYCLOAK_URL";
pub const KEYCLOAK_REALM: &str = "KEYCLOAK_REALM";
pub const KEYCLOAK_CLIENT_ID: &str = "KEYCLOAK_CLIENT_ID";
pub const REDIS_URL: &str = "REDIS_URL";
pub const GATEWAY_ENV: &str = "GATEWAY_ENV";

/// Overlay configuration from the process environment.
pub fn overlay_env(config: &mut GatewayConfig) -> Result<(), Vec<ValidationError>> {
    overlay_from(config, |name| std::env::var(name).ok())
}

/// Overlay configuration from an arbitrary lookup. Split out so tests can
/// drive it without touching the process environment.
pub fn overlay_from<F>(config: &mut GatewayConfig, get: F) -> Result<(), Vec<ValidationError>>
where
    F: Fn(&str) -> Option<String>,
{
    let mut errors = Vec::new();

    if let Some(value) = get(STOCK_API_URL) {
        config.stock.base_url = value;
    }
    parse_into(&get, STOCK_API_TIMEOUT, &mut config.stock.timeout_ms, &mut errors);
    parse_into(
        &get,
        STOCK_API_RETRY_ATTEMPTS,
        &mut config.stock.retry_attempts,
        &mut errors,
    );
    parse_into(
        &get,
        STOCK_API_RETRY_DELAY,
        &mut config.stock.retry_delay_ms,
        &mut errors,
    );
    parse_into(
        &get,
        STOCK_CIRCUIT_BREAKER_THRESHOLD,
        &mut config.stock.breaker_threshold,
        &mut errors,
    );
    parse_into(
        &get,
        STOCK_CIRCUIT_BREAKER_TIMEOUT,
        &mut config.stock.breaker_timeout_ms,
        &mut errors,
    );
    parse_into(&get, STOCK_CACHE_TTL, &mut config.stock.cache_ttl_secs, &mut errors);
    parse_into(
        &get,
        STOCK_CACHE_MAX_ITEMS,
        &mut config.stock.cache_max_items,
        &mut errors,
    );

    if let Some(value) = get(KEYCLOAK_URL) {
        config.keycloak.url = value;
    }
    if let Some(value) = get(KEYCLOAK_REALM) {
        config.keycloak.realm = value;
    }
    if let Some(value) = get(KEYCLOAK_CLIENT_ID) {
        config.keycloak.client_id = value;
    }

    if let Some(value) = get(REDIS_URL) {
        config.redis = Some(crate::config::schema::RedisConfig { url: value });
    }

    if let Some(value) = get(GATEWAY_ENV) {
        config.environment = value;
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

fn parse_into<F, T>(get: &F, name: &'static str, slot: &mut T, errors: &mut Vec<ValidationError>)
where
    F: Fn(&str) -> Option<String>,
    T: std::str::FromStr,
{
    if let Some(raw) = get(name) {
        match raw.trim().parse::<T>() {
            Ok(value) => *slot = value,
            Err(_) => errors.push(ValidationError::new(
                name,
                format!("expected an integer, got \"{raw}\""),
            )),
        }
    }
}
