// src/presets.rs

use crate::error::{AppError, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use tracing::debug;

pub const GPT2_SMALL: &str = "gpt2-small";
pub const LLAMA3_1_8B: &str = "llama3.1-8b";

/// Parameters selecting which remote model, layers and source set to search.
///
/// Supplied by the caller and never mutated by the lookup code.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelConfig {
    #[serde(alias = "modelId")]
    pub model_id: String,
    #[serde(alias = "sourceSet")]
    pub source_set: String,
    #[serde(alias = "selectedLayers")]
    pub selected_layers: Vec<String>,
    #[serde(default = "default_sort_indexes", alias = "sortIndexes")]
    pub sort_indexes: Vec<i64>,
    #[serde(default, alias = "ignoreBos")]
    pub ignore_bos: bool,
    /// `-1` disables the density filter.
    #[serde(default = "default_density_threshold", alias = "densityThreshold")]
    pub density_threshold: f64,
    #[serde(default = "default_num_results", alias = "numResults")]
    pub num_results: u32,
}

fn default_sort_indexes() -> Vec<i64> {
    vec![1]
}

fn default_density_threshold() -> f64 {
    -1.0
}

fn default_num_results() -> u32 {
    5
}

impl ModelConfig {
    /// Residual-stream preset for a single layer, using the remaining defaults.
    pub fn new(model_id: impl Into<String>, source_set: impl Into<String>, layer: u32) -> Self {
        let source_set = source_set.into();
        Self {
            model_id: model_id.into(),
            selected_layers: vec![format!("{layer}-{source_set}")],
            source_set,
            sort_indexes: default_sort_indexes(),
            ignore_bos: false,
            density_threshold: default_density_threshold(),
            num_results: default_num_results(),
        }
    }

    pub fn gpt2_small() -> Self {
        Self::new(GPT2_SMALL, "res-jb", 12)
    }

    pub fn llama3_1_8b() -> Self {
        Self::new(LLAMA3_1_8B, "llamascope-res-32k", 31)
    }

    pub fn with_num_results(mut self, num_results: u32) -> Self {
        self.num_results = num_results;
        self
    }

    pub fn validate(&self) -> Result<()> {
        if self.model_id.trim().is_empty() {
            return Err(AppError::config_validation(
                "Model id cannot be empty",
                Some("model_id"),
            ));
        }
        if self.source_set.trim().is_empty() {
            return Err(AppError::config_validation(
                format!("Source set cannot be empty for model '{}'", self.model_id),
                Some("source_set"),
            ));
        }
        if self.selected_layers.is_empty()
            || self.selected_layers.iter().any(|l| l.trim().is_empty())
        {
            return Err(AppError::config_validation(
                format!("Model '{}' needs at least one non-empty layer", self.model_id),
                Some("selected_layers"),
            ));
        }
        if self.num_results == 0 {
            return Err(AppError::config_validation(
                format!("num_results must be positive for model '{}'", self.model_id),
                Some("num_results"),
            ));
        }
        if !self.density_threshold.is_finite() {
            return Err(AppError::config_validation(
                format!("density_threshold must be finite for model '{}'", self.model_id),
                Some("density_threshold"),
            ));
        }
        Ok(())
    }
}

/// Named model presets: the built-in ones plus any declared in configuration.
#[derive(Debug, Clone)]
pub struct PresetRegistry {
    presets: BTreeMap<String, ModelConfig>,
}

impl PresetRegistry {
    pub fn builtin() -> Self {
        let presets = [
            (GPT2_SMALL.to_string(), ModelConfig::gpt2_small()),
            (LLAMA3_1_8B.to_string(), ModelConfig::llama3_1_8b()),
        ]
        .into_iter()
        .collect();
        Self { presets }
    }

    /// Built-ins overlaid with `custom`; a custom entry replaces a built-in of the same name.
    pub fn with_custom<'a>(custom: impl IntoIterator<Item = (&'a String, &'a ModelConfig)>) -> Self {
        let mut registry = Self::builtin();
        for (name, config) in custom {
            if registry.presets.insert(name.clone(), config.clone()).is_some() {
                debug!(preset = %name, "Custom preset overrides built-in");
            }
        }
        registry
    }

    pub fn get(&self, name: &str) -> Option<&ModelConfig> {
        self.presets.get(name)
    }

    pub fn resolve(&self, name: &str) -> Result<ModelConfig> {
        self.get(name).cloned().ok_or_else(|| AppError::UnknownPreset {
            name: name.to_string(),
            available: self.names().collect::<Vec<_>>().join(", "),
        })
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.presets.keys().map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &ModelConfig)> {
        self.presets.iter().map(|(k, v)| (k.as_str(), v))
    }
}

impl Default for PresetRegistry {
    fn default() -> Self {
        Self::builtin()
    }
}
