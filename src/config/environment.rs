//! Environment-based configuration overrides

use std::{env, str::FromStr};
use tracing::warn;

pub const ENV_API_KEY: &str = "NEURON_LENS_API_KEY";
pub const ENV_ENDPOINT: &str = "NEURON_LENS_ENDPOINT";
pub const ENV_HOST: &str = "NEURON_LENS_HOST";
pub const ENV_PORT: &str = "NEURON_LENS_PORT";
pub const ENV_MAX_CONCURRENCY: &str = "NEURON_LENS_MAX_CONCURRENCY";
pub const ENV_DEADLINE_SECS: &str = "NEURON_LENS_DEADLINE_SECS";
pub const ENV_DEFAULT_PRESET: &str = "NEURON_LENS_DEFAULT_PRESET";

/// Environment values that override the file-based config
#[derive(Debug, Clone, Default)]
pub struct EnvironmentConfig {
    pub api_key: Option<String>,
    pub endpoint: Option<String>,
    pub server_host: Option<String>,
    pub server_port: Option<u16>,
    pub max_concurrency: Option<usize>,
    pub deadline_secs: Option<u64>,
    pub default_preset: Option<String>,
}

impl EnvironmentConfig {
    /// Load overrides from environment variables. Blank values count as unset;
    /// unparsable numbers are logged and ignored.
    pub fn from_env() -> Self {
        Self {
            api_key: secret_var(ENV_API_KEY),
            endpoint: string_var(ENV_ENDPOINT),
            server_host: string_var(ENV_HOST),
            server_port: parsed_var(ENV_PORT),
            max_concurrency: parsed_var(ENV_MAX_CONCURRENCY),
            deadline_secs: parsed_var(ENV_DEADLINE_SECS),
            default_preset: string_var(ENV_DEFAULT_PRESET),
        }
    }

    pub fn has_overrides(&self) -> bool {
        !self.override_summary().is_empty()
    }

    /// Names of the variables that are in effect. Never includes values.
    pub fn override_summary(&self) -> Vec<&'static str> {
        [
            (self.api_key.is_some(), ENV_API_KEY),
            (self.endpoint.is_some(), ENV_ENDPOINT),
            (self.server_host.is_some(), ENV_HOST),
            (self.server_port.is_some(), ENV_PORT),
            (self.max_concurrency.is_some(), ENV_MAX_CONCURRENCY),
            (self.deadline_secs.is_some(), ENV_DEADLINE_SECS),
            (self.default_preset.is_some(), ENV_DEFAULT_PRESET),
        ]
        .into_iter()
        .filter_map(|(set, name)| set.then_some(name))
        .collect()
    }
}

fn string_var(name: &str) -> Option<String> {
    env::var(name)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

// Credentials are passed through as given; only an all-blank value counts as unset.
fn secret_var(name: &str) -> Option<String> {
    env::var(name).ok().filter(|v| !v.trim().is_empty())
}

fn parsed_var<T: FromStr>(name: &str) -> Option<T> {
    let raw = string_var(name)?;
    match raw.parse() {
        Ok(value) => Some(value),
        Err(_) => {
            warn!(variable = name, value = %raw, "Ignoring invalid environment variable");
            None
        }
    }
}
