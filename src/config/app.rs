// src/config/app.rs

use crate::{
    batch::LookupPolicy,
    presets::{ModelConfig, PresetRegistry, GPT2_SMALL},
    utils::ApiKey,
};
use serde::Deserialize;
use std::collections::BTreeMap;

pub const DEFAULT_ENDPOINT: &str = "https://www.neuronpedia.org/api/search-all";

#[derive(Debug, Deserialize, Clone, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

/// Remote search API settings. The key is injected from configuration or the
/// environment and passed through opaquely.
#[derive(Debug, Deserialize, Clone)]
#[serde(deny_unknown_fields)]
pub struct ApiConfig {
    #[serde(default = "default_endpoint")]
    pub endpoint: String,
    #[serde(default)]
    pub api_key: Option<ApiKey>,
    #[serde(default = "default_connect_timeout")]
    pub connect_timeout_secs: u64,
    #[serde(default = "default_request_timeout")]
    pub request_timeout_secs: u64,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            endpoint: default_endpoint(),
            api_key: None,
            connect_timeout_secs: default_connect_timeout(),
            request_timeout_secs: default_request_timeout(),
        }
    }
}

#[derive(Debug, Deserialize, Clone, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct BatchConfig {
    #[serde(default = "default_max_concurrency")]
    pub max_concurrency: usize,
    #[serde(default = "default_deadline")]
    pub deadline_secs: u64,
    #[serde(default)]
    pub lookup_policy: LookupPolicy,
}

impl Default for BatchConfig {
    fn default() -> Self {
        Self {
            max_concurrency: default_max_concurrency(),
            deadline_secs: default_deadline(),
            lookup_policy: LookupPolicy::default(),
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
#[serde(deny_unknown_fields)]
pub struct AppConfig {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub api: ApiConfig,
    #[serde(default)]
    pub batch: BatchConfig,
    #[serde(default = "default_preset")]
    pub default_preset: String,
    /// Extra presets; an entry named like a built-in replaces it.
    #[serde(default)]
    pub presets: BTreeMap<String, ModelConfig>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            server: ServerConfig::default(),
            api: ApiConfig::default(),
            batch: BatchConfig::default(),
            default_preset: default_preset(),
            presets: BTreeMap::new(),
        }
    }
}

impl AppConfig {
    pub fn preset_registry(&self) -> PresetRegistry {
        PresetRegistry::with_custom(&self.presets)
    }
}

// Default value functions
fn default_host() -> String {
    "127.0.0.1".to_string()
}

fn default_port() -> u16 {
    8080
}

fn default_endpoint() -> String {
    DEFAULT_ENDPOINT.to_string()
}

fn default_connect_timeout() -> u64 {
    10
}

fn default_request_timeout() -> u64 {
    30
}

fn default_max_concurrency() -> usize {
    4
}

fn default_deadline() -> u64 {
    60
}

fn default_preset() -> String {
    GPT2_SMALL.to_string()
}
