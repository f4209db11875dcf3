// src/state.rs

use crate::batch::{BatchAggregator, BatchSettings};
use crate::config::AppConfig;
use crate::error::{AppError, Result};
use crate::explain::{ExplanationClient, HttpTransport, SearchTransport};
use crate::presets::{ModelConfig, PresetRegistry};
use std::sync::Arc;
use tracing::info;

/// Shared, read-only state behind the JSON API and the CLI commands.
///
/// Nothing here changes between requests; every lookup gets its token and
/// model configuration as arguments.
#[derive(Debug)]
pub struct AppState {
    pub config: AppConfig,
    pub presets: PresetRegistry,
    pub client: ExplanationClient,
    pub aggregator: BatchAggregator,
}

impl AppState {
    /// Creates a new `AppState` talking to the configured search endpoint.
    pub fn new(config: AppConfig) -> Result<Self> {
        let transport = HttpTransport::from_config(&config.api)?;
        Ok(Self::with_transport(config, Arc::new(transport)))
    }

    /// Creates a new `AppState` over an arbitrary transport.
    pub fn with_transport(config: AppConfig, transport: Arc<dyn SearchTransport>) -> Self {
        let presets = config.preset_registry();
        let client = ExplanationClient::new(transport);
        let aggregator = BatchAggregator::new(client.clone(), BatchSettings::from(&config.batch));
        info!(
            presets = ?presets.names().collect::<Vec<_>>(),
            default_preset = %config.default_preset,
            max_concurrency = config.batch.max_concurrency,
            lookup_policy = ?config.batch.lookup_policy,
            "Application state initialized"
        );
        Self {
            config,
            presets,
            client,
            aggregator,
        }
    }

    /// Picks the model configuration for one request: an inline config wins,
    /// then a named preset, then the configured default preset.
    pub fn resolve_model(
        &self,
        preset: Option<&str>,
        inline: Option<ModelConfig>,
    ) -> Result<ModelConfig> {
        if let Some(config) = inline {
            config
                .validate()
                .map_err(|e| AppError::invalid_request(e.to_string()))?;
            return Ok(config);
        }
        self.presets
            .resolve(preset.unwrap_or(&self.config.default_preset))
    }
}
