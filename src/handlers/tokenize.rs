// src/handlers/tokenize.rs

use crate::tokenizer::tokenize;
use axum::Json;
use serde::{Deserialize, Serialize};
use tracing::debug;

#[derive(Debug, Deserialize)]
pub struct TokenizeRequest {
    pub text: String,
}

#[derive(Debug, Serialize, Deserialize, PartialEq)]
pub struct TokenizeResponse {
    pub tokens: Vec<String>,
    pub count: usize,
}

pub async fn tokenize_text(Json(request): Json<TokenizeRequest>) -> Json<TokenizeResponse> {
    let tokens: Vec<String> = tokenize(&request.text)
        .into_iter()
        .map(str::to_string)
        .collect();
    debug!(chars = request.text.len(), tokens = tokens.len(), "Tokenized input");
    Json(TokenizeResponse {
        count: tokens.len(),
        tokens,
    })
}
