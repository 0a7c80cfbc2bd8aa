//! Configuration loading.

use std::path::Path;

use crate::config::env::overlay_env;
use crate::config::schema::GatewayConfig;
use crate::config::validation::{validate_config, ValidationError};

/// Error type for configuration loading. Any variant is fatal at startup.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Parse error: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("Validation failed: {}", format_errors(.0))]
    Validation(Vec<ValidationError>),
}

fn format_errors(errors: &[ValidationError]) -> String {
    errors
        .iter()
        .map(|e| e.to_string())
        .collect::<Vec<_>>()
        .join(", ")
}

/// Load configuration: TOML file (when present) plus environment overlay,
/// then the semantic validation pass. The returned config is final and is
/// never mutated after this point.
pub fn load_config(path: &Path) -> Result<GatewayConfig, ConfigError> {
    let mut config = if path.exists() {
        let content = std::fs::read_to_string(path)?;
        toml::from_str(&content)?
    } else {
        GatewayConfig::default()
    };

    overlay_env(&mut config).map_err(ConfigError::Validation)?;
    validate_config(&config).map_err(ConfigError::Validation)?;

    Ok(config)
}
