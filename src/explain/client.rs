// src/explain/client.rs

use super::{
    decode,
    transport::SearchTransport,
    types::{ExplanationRecord, SearchRequest},
};
use crate::{error::RemoteError, presets::ModelConfig, utils::OperationTimer};
use std::{sync::Arc, time::Duration};
use tracing::{debug, instrument, warn};

const SLOW_LOOKUP: Duration = Duration::from_secs(5);

/// Looks up the explanations of one token. Stateless between calls; each
/// `fetch` is exactly one request with no retry and no caching.
#[derive(Clone)]
pub struct ExplanationClient {
    transport: Arc<dyn SearchTransport>,
}

impl ExplanationClient {
    pub fn new(transport: Arc<dyn SearchTransport>) -> Self {
        Self { transport }
    }

    /// Fetches the explanations for `token` under `config`.
    ///
    /// A non-2xx status becomes [`RemoteError::Status`] with the response
    /// body; no partial data is returned alongside an error.
    #[instrument(name = "explanation_lookup", skip(self, config), fields(model = %config.model_id))]
    pub async fn fetch(
        &self,
        token: &str,
        config: &ModelConfig,
    ) -> Result<Vec<ExplanationRecord>, RemoteError> {
        let timer = OperationTimer::start("explanation_lookup").with_warn_threshold(SLOW_LOOKUP);
        let request = SearchRequest::new(token, config);

        let response = self.transport.post_search(&request).await.map_err(|e| {
            warn!(error = %e, "Search request failed");
            e
        })?;

        if !response.is_success() {
            warn!(status = response.status, "Search API returned an error status");
            return Err(RemoteError::status(response.status, response.body));
        }

        let records = decode::decode_records(&response.body).map_err(|e| {
            warn!(error = %e, "Search response was not valid JSON");
            e
        })?;

        let elapsed = timer.finish(token);
        debug!(
            records = records.len(),
            elapsed_ms = elapsed.as_millis() as u64,
            "Explanation lookup finished"
        );
        Ok(records)
    }
}

impl std::fmt::Debug for ExplanationClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ExplanationClient").finish_non_exhaustive()
    }
}
