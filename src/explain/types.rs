// src/explain/types.rs

use crate::presets::ModelConfig;
use serde::{Deserialize, Serialize, Serializer};
use serde_json::{Map, Value};

/// Placeholder used when an explanation carries no usable description.
pub const NO_DESCRIPTION: &str = "No description available";

/// One explanation returned for a token, paired with the neuron it belongs to.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExplanationRecord {
    pub description: String,
    /// Neuron metadata exactly as the API returned it (name, layer, index,
    /// the explanations themselves, ...). Not interpreted here.
    pub neuron: Map<String, Value>,
}

/// Request body for the search endpoint. Field names are fixed by the API.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchRequest<'a> {
    pub model_id: &'a str,
    pub source_set: &'a str,
    pub text: &'a str,
    pub selected_layers: &'a [String],
    pub sort_indexes: &'a [i64],
    pub ignore_bos: bool,
    #[serde(serialize_with = "serialize_threshold")]
    pub density_threshold: f64,
    pub num_results: u32,
}

impl<'a> SearchRequest<'a> {
    pub fn new(token: &'a str, config: &'a ModelConfig) -> Self {
        Self {
            model_id: &config.model_id,
            source_set: &config.source_set,
            text: token,
            selected_layers: &config.selected_layers,
            sort_indexes: &config.sort_indexes,
            ignore_bos: config.ignore_bos,
            density_threshold: config.density_threshold,
            num_results: config.num_results,
        }
    }
}

// The API expects `-1` rather than `-1.0` for "no threshold".
fn serialize_threshold<S: Serializer>(value: &f64, serializer: S) -> Result<S::Ok, S::Error> {
    if value.fract() == 0.0 && value.abs() <= i64::MAX as f64 {
        serializer.serialize_i64(*value as i64)
    } else {
        serializer.serialize_f64(*value)
    }
}
