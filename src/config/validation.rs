//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Enforce the resilience bounds before the service accepts traffic
//! - Check URLs parse and required identity fields are present
//!
//! # Design Decisions
//! - Returns all validation errors, not just the first
//! - Validation is a pure function: GatewayConfig → Result<(), Vec<ValidationError>>
//! - The `STOCK_BOUNDS` table below is the single source of truth for the
//!   resilience ranges; error messages name the environment variable

use crate::config::schema::{GatewayConfig, StockApiConfig};
use crate::config::env;
use url::Url;

/// One violated constraint, naming the offending field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationError {
    pub field: String,
    pub message: String,
}

impl ValidationError {
    pub fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
        }
    }
}

impl std::fmt::Display for ValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

/// Declarative bound on one numeric resilience parameter.
struct Bound {
    field: &'static str,
    min: u64,
    max: u64,
    get: fn(&StockApiConfig) -> u64,
}

/// Resilience parameter ranges. Out-of-range is fatal at startup.
const STOCK_BOUNDS: &[Bound] = &[
    Bound {
        field: env::STOCK_API_TIMEOUT,
        min: 1000,
        max: 10_000,
        get: |s| s.timeout_ms,
    },
    Bound {
        field: env::STOCK_API_RETRY_ATTEMPTS,
        min: 1,
        max: 5,
        get: |s| s.retry_attempts as u64,
    },
    Bound {
        field: env::STOCK_API_RETRY_DELAY,
        min: 500,
        max: 5000,
        get: |s| s.retry_delay_ms,
    },
    Bound {
        field: env::STOCK_CIRCUIT_BREAKER_THRESHOLD,
        min: 1,
        max: 10,
        get: |s| s.breaker_threshold as u64,
    },
    Bound {
        field: env::STOCK_CIRCUIT_BREAKER_TIMEOUT,
        min: 10_000,
        max: 120_000,
        get: |s| s.breaker_timeout_ms,
    },
    Bound {
        field: env::STOCK_CACHE_TTL,
        min: 60,
        max: 3600,
        get: |s| s.cache_ttl_secs,
    },
    Bound {
        field: env::STOCK_CACHE_MAX_ITEMS,
        min: 100,
        max: 10_000,
        get: |s| s.cache_max_items as u64,
    },
];

/// Validate the full configuration, collecting every violation.
pub fn validate_config(config: &GatewayConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    if config.listener.bind_address.parse::<std::net::SocketAddr>().is_err() {
        errors.push(ValidationError::new(
            "listener.bind_address",
            format!("not a valid socket address: \"{}\"", config.listener.bind_address),
        ));
    }

    if config.timeouts.forward_secs == 0 || config.timeouts.request_secs == 0 {
        errors.push(ValidationError::new(
            "timeouts",
            "request_secs and forward_secs must be greater than zero",
        ));
    } else if config.timeouts.forward_secs >= config.timeouts.request_secs {
        errors.push(ValidationError::new(
            "timeouts.forward_secs",
            "must be below timeouts.request_secs",
        ));
    }

    if config.health.probe_timeout_ms == 0 {
        errors.push(ValidationError::new(
            "health.probe_timeout_ms",
            "must be greater than zero",
        ));
    }

    for upstream in &config.upstreams {
        if upstream.name.is_empty() || upstream.name.contains('/') {
            errors.push(ValidationError::new(
                "upstreams.name",
                format!("invalid upstream name \"{}\"", upstream.name),
            ));
        }
        if let Err(e) = Url::parse(&upstream.base_url) {
            errors.push(ValidationError::new(
                format!("upstreams.{}.base_url", upstream.name),
                format!("invalid URL: {e}"),
            ));
        }
    }

    let mut names: Vec<&str> = config.upstreams.iter().map(|u| u.name.as_str()).collect();
    names.sort_unstable();
    names.dedup();
    if names.len() != config.upstreams.len() {
        errors.push(ValidationError::new("upstreams", "duplicate upstream names"));
    }

    validate_stock(&config.stock, &mut errors);

    for (field, value) in [
        (env::KEYCLOAK_URL, &config.keycloak.url),
        (env::KEYCLOAK_REALM, &config.keycloak.realm),
        (env::KEYCLOAK_CLIENT_ID, &config.keycloak.client_id),
    ] {
        if value.is_empty() {
            errors.push(ValidationError::new(field, "is required"));
        }
    }
    if !config.keycloak.url.is_empty() {
        if let Err(e) = Url::parse(&config.keycloak.url) {
            errors.push(ValidationError::new(env::KEYCLOAK_URL, format!("invalid URL: {e}")));
        }
    }

    if let Some(redis) = &config.redis {
        if let Err(e) = Url::parse(&redis.url) {
            errors.push(ValidationError::new(env::REDIS_URL, format!("invalid URL: {e}")));
        }
    }

    if config.admin.enabled && config.admin.api_key.is_empty() {
        errors.push(ValidationError::new(
            "admin.api_key",
            "must be set when the admin endpoint is enabled",
        ));
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

fn validate_stock(stock: &StockApiConfig, errors: &mut Vec<ValidationError>) {
    if stock.base_url.is_empty() {
        errors.push(ValidationError::new(env::STOCK_API_URL, "is required"));
    } else {
        match Url::parse(&stock.base_url) {
            Ok(url) if url.scheme() == "http" || url.scheme() == "https" => {}
            Ok(url) => errors.push(ValidationError::new(
                env::STOCK_API_URL,
                format!("unsupported scheme \"{}\"", url.scheme()),
            )),
            Err(e) => errors.push(ValidationError::new(
                env::STOCK_API_URL,
                format!("invalid URL: {e}"),
            )),
        }
    }

    for bound in STOCK_BOUNDS {
        let value = (bound.get)(stock);
        if value < bound.min || value > bound.max {
            errors.push(ValidationError::new(
                bound.field,
                format!("must be between {} and {} (got {})", bound.min, bound.max, value),
            ));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::schema::UpstreamConfig;

    fn valid_config() -> GatewayConfig {
        let mut config = GatewayConfig::default();
        config.stock.base_url = "http://stock.example.com".to_string();
        config.keycloak.url = "http://keycloak.example.com".to_string();
        config.keycloak.realm = "logistics".to_string();
        config.keycloak.client_id = "operator-gateway".to_string();
        config.upstreams = vec![
            UpstreamConfig {
                name: "config".into(),
                base_url: "http://127.0.0.1:3001".into(),
            },
            UpstreamConfig {
                name: "shipping".into(),
                base_url: "http://127.0.0.1:3002".into(),
            },
        ];
        config
    }

    #[test]
    fn test_valid_config_passes() {
        validate_config(&valid_config()).unwrap();
    }

    #[test]
    fn test_timeout_below_minimum_names_field() {
        let mut config = valid_config();
        config.stock.timeout_ms = 500;

        let errors = validate_config(&config).unwrap_err();

        assert!(
            errors.iter().any(|e| e.field == "STOCK_API_TIMEOUT"),
            "expected STOCK_API_TIMEOUT violation, got {errors:?}"
        );
    }

    #[test]
    fn test_all_violations_reported() {
        let mut config = valid_config();
        config.stock.retry_attempts = 0;
        config.stock.cache_ttl_secs = 10;
        config.keycloak.realm = String::new();

        let errors = validate_config(&config).unwrap_err();

        let fields: Vec<&str> = errors.iter().map(|e| e.field.as_str()).collect();
        assert!(fields.contains(&"STOCK_API_RETRY_ATTEMPTS"));
        assert!(fields.contains(&"STOCK_CACHE_TTL"));
        assert!(fields.contains(&"KEYCLOAK_REALM"));
    }

    #[test]
    fn test_missing_stock_url_is_fatal() {
        let mut config = valid_config();
        config.stock.base_url = String::new();

        let errors = validate_config(&config).unwrap_err();
        assert!(errors.iter().any(|e| e.field == "STOCK_API_URL"));
    }

    #[test]
    fn test_in_bounds_values_are_kept_unchanged() {
        let mut config = valid_config();
        config.stock.timeout_ms = 1000;
        config.stock.retry_attempts = 5;
        config.stock.cache_ttl_secs = 3600;

        validate_config(&config).unwrap();

        assert_eq!(config.stock.timeout_ms, 1000);
        assert_eq!(config.stock.retry_attempts, 5);
        assert_eq!(config.stock.cache_ttl_secs, 3600);
    }

    #[test]
    fn test_duplicate_upstreams_rejected() {
        let mut config = valid_config();
        config.upstreams.push(UpstreamConfig {
            name: "config".into(),
            base_url: "http://127.0.0.1:3003".into(),
        });

        let errors = validate_config(&config).unwrap_err();
        assert!(errors.iter().any(|e| e.field == "upstreams"));
    }
}
