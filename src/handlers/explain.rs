// src/handlers/explain.rs

use crate::{
    batch::{BatchResult, Interruption, LookupOutcome, LookupPolicy, TokenLookup},
    error::{AppError, Result},
    explain::ExplanationRecord,
    presets::ModelConfig,
    state::AppState,
    tokenizer::tokenize,
};
use axum::{extract::State, Json};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::info;

/// Shown for a token whose lookup produced no descriptions, failed or not.
pub const NO_DESCRIPTIONS_FOUND: &str = "No descriptions found";

#[derive(Debug, Serialize)]
pub struct PresetView<'a> {
    pub name: &'a str,
    pub is_default: bool,
    pub config: &'a ModelConfig,
}

pub async fn list_presets(State(state): State<Arc<AppState>>) -> Json<serde_json::Value> {
    let presets: Vec<PresetView<'_>> = state
        .presets
        .iter()
        .map(|(name, config)| PresetView {
            name,
            is_default: name == state.config.default_preset,
            config,
        })
        .collect();
    Json(serde_json::json!({ "presets": presets }))
}

#[derive(Debug, Deserialize)]
pub struct ExplainRequest {
    pub token: String,
    #[serde(default)]
    pub preset: Option<String>,
    #[serde(default)]
    pub config: Option<ModelConfig>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ExplainResponse {
    pub token: String,
    pub model_id: String,
    pub descriptions: Vec<String>,
    pub records: Vec<ExplanationRecord>,
}

pub async fn explain_token(
    State(state): State<Arc<AppState>>,
    Json(request): Json<ExplainRequest>,
) -> Result<Json<ExplainResponse>> {
    if request.token.trim().is_empty() {
        return Err(AppError::invalid_request("token must not be empty"));
    }
    let model = state.resolve_model(request.preset.as_deref(), request.config)?;

    let records = state.client.fetch(&request.token, &model).await?;
    info!(token = %request.token, model = %model.model_id, records = records.len(), "Explained token");

    Ok(Json(ExplainResponse {
        descriptions: records.iter().map(|r| r.description.clone()).collect(),
        token: request.token,
        model_id: model.model_id,
        records,
    }))
}

#[derive(Debug, Deserialize)]
pub struct BatchRequest {
    /// Raw text, tokenized server-side. Mutually exclusive with `tokens`.
    #[serde(default)]
    pub text: Option<String>,
    #[serde(default)]
    pub tokens: Option<Vec<String>>,
    #[serde(default)]
    pub preset: Option<String>,
    #[serde(default)]
    pub config: Option<ModelConfig>,
    #[serde(default)]
    pub lookup_policy: Option<LookupPolicy>,
}

#[derive(Debug, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "snake_case")]
pub enum EntryStatus {
    Completed,
    Failed,
    NotCompleted,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct BatchEntry {
    pub position: usize,
    pub token: String,
    pub status: EntryStatus,
    pub descriptions: Vec<String>,
    pub records: Vec<ExplanationRecord>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl From<TokenLookup> for BatchEntry {
    fn from(lookup: TokenLookup) -> Self {
        let (status, error) = match &lookup.outcome {
            LookupOutcome::Completed => (EntryStatus::Completed, None),
            LookupOutcome::Failed(e) => (EntryStatus::Failed, Some(e.to_string())),
            LookupOutcome::NotCompleted => (EntryStatus::NotCompleted, None),
        };
        let descriptions: Vec<String> = lookup.descriptions().map(str::to_string).collect();
        Self {
            position: lookup.position,
            message: descriptions
                .is_empty()
                .then(|| NO_DESCRIPTIONS_FOUND.to_string()),
            token: lookup.token,
            status,
            descriptions,
            records: lookup.records,
            error,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct BatchResponse {
    pub model_id: String,
    pub entries: Vec<BatchEntry>,
    pub partial: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub interruption: Option<Interruption>,
    pub calls_issued: usize,
}

impl BatchResponse {
    pub fn new(model_id: impl Into<String>, result: BatchResult) -> Self {
        Self {
            model_id: model_id.into(),
            partial: result.is_partial(),
            interruption: result.interruption,
            calls_issued: result.calls_issued,
            entries: result.lookups.into_iter().map(BatchEntry::from).collect(),
        }
    }
}

pub async fn explain_batch(
    State(state): State<Arc<AppState>>,
    Json(request): Json<BatchRequest>,
) -> Result<Json<BatchResponse>> {
    let tokens: Vec<String> = match (request.text, request.tokens) {
        (Some(text), None) => tokenize(&text).into_iter().map(str::to_string).collect(),
        (None, Some(tokens)) => {
            if tokens.iter().any(|t| t.trim().is_empty()) {
                return Err(AppError::invalid_request("tokens must not be empty strings"));
            }
            tokens
        }
        _ => {
            return Err(AppError::invalid_request(
                "exactly one of `text` or `tokens` is required",
            ))
        }
    };
    let model = state.resolve_model(request.preset.as_deref(), request.config)?;

    let aggregator = match request.lookup_policy {
        Some(policy) => state.aggregator.clone().with_policy(policy),
        None => state.aggregator.clone(),
    };
    let result = aggregator.fetch_all(&tokens, &model).await;

    Ok(Json(BatchResponse::new(model.model_id, result)))
}
