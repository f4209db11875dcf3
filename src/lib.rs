// src/lib.rs

pub mod batch;
pub mod cli;
pub mod commands;
pub mod config;
pub mod error;
pub mod explain;
pub mod handlers;
pub mod presets;
pub mod state;
pub mod tokenizer;
pub mod utils;

use crate::handlers::{explain_batch, explain_token, health_check, list_presets, tokenize_text};
use axum::{
    body::Body,
    http::{header, HeaderValue, Method, Request as AxumRequest},
    response::IntoResponse,
    routing::{get, post},
    Router,
};
use std::{path::Path, sync::Arc, time::Instant};
use tower_http::cors::{Any, CorsLayer};
use tracing::{error, info, info_span, Instrument};
use uuid::Uuid;

pub use batch::{BatchAggregator, BatchResult, LookupOutcome, LookupPolicy, TokenLookup};
pub use config::AppConfig;
pub use error::{AppError, RemoteError, Result};
pub use explain::{ExplanationClient, ExplanationRecord};
pub use presets::{ModelConfig, PresetRegistry};
pub use state::AppState;
pub use tokenizer::tokenize;

/// Builds the JSON API router.
pub fn create_router(state: Arc<AppState>) -> Router {
    // Browser front ends render tokens and descriptions from these endpoints.
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::GET, Method::POST])
        .allow_headers([header::CONTENT_TYPE]);

    Router::new()
        .route("/health", get(health_check))
        .route("/presets", get(list_presets))
        .route("/tokenize", post(tokenize_text))
        .route("/explanations", post(explain_token))
        .route("/explanations/batch", post(explain_batch))
        .layer(cors)
        .layer(axum::middleware::from_fn(trace_requests))
        .with_state(state)
}

/// Middleware adding a request id span and `X-Request-ID` header.
async fn trace_requests(
    mut req: AxumRequest<Body>,
    next: axum::middleware::Next,
) -> impl IntoResponse {
    let request_id = Uuid::new_v4();
    let start_time = Instant::now();
    let method = req.method().clone();
    let path = req.uri().path().to_string();

    let span = info_span!(
        "request",
        request_id = %request_id,
        http.method = %method,
        url.path = %path,
    );

    req.extensions_mut().insert(request_id);

    async move {
        let mut response = next.run(req).await;
        let elapsed = start_time.elapsed();

        if let Ok(value) = HeaderValue::from_str(&request_id.to_string()) {
            response.headers_mut().insert("X-Request-ID", value);
        }

        info!(
            http.response.duration = ?elapsed,
            http.status_code = response.status().as_u16(),
            "Finished processing request"
        );

        response
    }
    .instrument(span)
    .await
}

/// Loads, validates and logs the application configuration.
pub fn setup_configuration(config_path: &Path) -> Result<AppConfig> {
    let config_path_display = config_path.display().to_string();

    let app_config = config::load_config(config_path).map_err(|e| {
        error!(
            config.path = %config_path_display,
            error = ?e,
            "Failed to load or validate configuration"
        );
        e
    })?;

    info!(
        config.path = %config_path_display,
        api.endpoint = %app_config.api.endpoint,
        api.key_configured = app_config.api.api_key.is_some(),
        batch.max_concurrency = app_config.batch.max_concurrency,
        batch.deadline_secs = app_config.batch.deadline_secs,
        default_preset = %app_config.default_preset,
        "Configuration loaded and validated successfully."
    );

    Ok(app_config)
}
