// src/config/validation.rs

use crate::config::AppConfig;
use crate::error::{AppError, Result};
use tracing::{debug, warn};
use url::Url;

pub struct ConfigValidator;

impl ConfigValidator {
    pub fn validate(config: &AppConfig) -> Result<()> {
        debug!("Starting configuration validation");

        if let Err(e) = Self::validate_api_config(config) {
            warn!("API config validation failed: {}", e);
            return Err(e);
        }
        debug!("API config validation passed");

        if let Err(e) = Self::validate_batch_config(config) {
            warn!("Batch config validation failed: {}", e);
            return Err(e);
        }
        debug!("Batch config validation passed");

        if let Err(e) = Self::validate_server_config(config) {
            warn!("Server config validation failed: {}", e);
            return Err(e);
        }
        debug!("Server config validation passed");

        if let Err(e) = Self::validate_presets(config) {
            warn!("Preset validation failed: {}", e);
            return Err(e);
        }
        debug!("Preset validation passed");

        debug!("Configuration validation completed successfully");
        Ok(())
    }

    fn validate_api_config(config: &AppConfig) -> Result<()> {
        let url = Url::parse(&config.api.endpoint).map_err(|e| {
            AppError::config_validation(
                format!("Invalid URL in api.endpoint: {} - {}", config.api.endpoint, e),
                Some("api.endpoint"),
            )
        })?;
        if !matches!(url.scheme(), "http" | "https") {
            return Err(AppError::config_validation(
                format!("Unsupported endpoint scheme '{}'. Supported: http, https", url.scheme()),
                Some("api.endpoint"),
            ));
        }

        if config.api.connect_timeout_secs == 0 {
            return Err(AppError::config_validation(
                "Connect timeout cannot be 0",
                Some("api.connect_timeout_secs"),
            ));
        }
        if config.api.request_timeout_secs == 0 {
            return Err(AppError::config_validation(
                "Request timeout cannot be 0",
                Some("api.request_timeout_secs"),
            ));
        }

        if config.api.api_key.as_ref().is_some_and(|key| key.is_blank()) {
            return Err(AppError::config_validation(
                "API key is set but empty",
                Some("api.api_key"),
            ));
        }
        Ok(())
    }

    fn validate_batch_config(config: &AppConfig) -> Result<()> {
        if config.batch.max_concurrency == 0 {
            return Err(AppError::config_validation(
                "max_concurrency must be at least 1",
                Some("batch.max_concurrency"),
            ));
        }
        if config.batch.deadline_secs == 0 {
            return Err(AppError::config_validation(
                "Batch deadline cannot be 0",
                Some("batch.deadline_secs"),
            ));
        }
        Ok(())
    }

    fn validate_server_config(config: &AppConfig) -> Result<()> {
        if config.server.host.trim().is_empty() {
            return Err(AppError::config_validation(
                "Server host cannot be empty",
                Some("server.host"),
            ));
        }
        Ok(())
    }

    fn validate_presets(config: &AppConfig) -> Result<()> {
        for (name, preset) in &config.presets {
            if name.trim().is_empty() {
                return Err(AppError::config_validation(
                    "Preset names cannot be empty",
                    Some("presets"),
                ));
            }
            preset.validate()?;
        }

        config
            .preset_registry()
            .resolve(&config.default_preset)
            .map_err(|e| AppError::config_validation(e.to_string(), Some("default_preset")))?;
        Ok(())
    }
}
