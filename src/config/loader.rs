// src/config/loader.rs

use crate::config::{AppConfig, ConfigValidator, EnvironmentConfig};
use crate::error::{AppError, Result};
use crate::utils::ApiKey;
use std::path::Path;
use tracing::{debug, info};

/// Load configuration from an optional YAML file, apply environment
/// overrides, then validate.
pub fn load_config(config_path: &Path) -> Result<AppConfig> {
    let mut config = if config_path.exists() {
        info!(config.path = %config_path.display(), "Loading configuration from file");
        load_from_file(config_path)?
    } else {
        info!(config.path = %config_path.display(), "Configuration file not found, using defaults");
        AppConfig::default()
    };

    apply_env_overrides(&mut config, EnvironmentConfig::from_env());

    ConfigValidator::validate(&config)?;

    debug!("Configuration loaded and validated successfully");
    Ok(config)
}

/// Parse and validate YAML without consulting the environment.
pub fn load_from_str(content: &str) -> Result<AppConfig> {
    let config = parse_yaml(content)?;
    ConfigValidator::validate(&config)?;
    Ok(config)
}

fn load_from_file(config_path: &Path) -> Result<AppConfig> {
    let content = std::fs::read_to_string(config_path).map_err(|_| AppError::ConfigNotFound {
        path: config_path.display().to_string(),
    })?;
    parse_yaml(&content)
}

fn parse_yaml(content: &str) -> Result<AppConfig> {
    if content.trim().is_empty() {
        return Ok(AppConfig::default());
    }
    serde_yaml::from_str(content).map_err(|e| AppError::ConfigParse {
        message: format!("Failed to parse config file: {e}"),
        line: e.location().map(|loc| loc.line()),
    })
}

pub(crate) fn apply_env_overrides(config: &mut AppConfig, env: EnvironmentConfig) {
    if env.has_overrides() {
        info!(overrides = ?env.override_summary(), "Applying environment overrides");
    }
    if let Some(key) = env.api_key {
        config.api.api_key = Some(ApiKey::new(key));
    }
    if let Some(endpoint) = env.endpoint {
        config.api.endpoint = endpoint;
    }
    if let Some(host) = env.server_host {
        config.server.host = host;
    }
    if let Some(port) = env.server_port {
        config.server.port = port;
    }
    if let Some(max_concurrency) = env.max_concurrency {
        config.batch.max_concurrency = max_concurrency;
    }
    if let Some(deadline) = env.deadline_secs {
        config.batch.deadline_secs = deadline;
    }
    if let Some(preset) = env.default_preset {
        config.default_preset = preset;
    }
}
