// src/handlers/mod.rs

pub mod explain;
pub mod tokenize;

pub use explain::{explain_batch, explain_token, list_presets};
pub use tokenize::tokenize_text;

use axum::Json;
use serde_json::{json, Value};

/// Liveness probe. Does not touch the search API.
pub async fn health_check() -> Json<Value> {
    Json(json!({ "status": "ok" }))
}
