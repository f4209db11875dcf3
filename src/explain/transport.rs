// src/explain/transport.rs

use super::types::SearchRequest;
use crate::{
    config::ApiConfig,
    error::{AppError, RemoteError, Result},
    utils::ApiKey,
};
use async_trait::async_trait;
use reqwest::{header, Client, ClientBuilder};
use std::time::Duration;
use tracing::{debug, info, warn};
use url::Url;

/// Header carrying the search API credential.
pub const API_KEY_HEADER: &str = "X-Api-Key";

/// Status and body of a search call that reached the API.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawResponse {
    pub status: u16,
    pub body: String,
}

impl RawResponse {
    pub fn new(status: u16, body: impl Into<String>) -> Self {
        Self {
            status,
            body: body.into(),
        }
    }

    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// Sends one search request. `Err` means no response was obtained at all;
/// status handling is left to the caller.
#[async_trait]
pub trait SearchTransport: Send + Sync {
    async fn post_search(&self, request: &SearchRequest<'_>) -> std::result::Result<RawResponse, RemoteError>;
}

/// `reqwest`-backed transport posting JSON to the configured endpoint.
#[derive(Debug, Clone)]
pub struct HttpTransport {
    client: Client,
    endpoint: Url,
    api_key: Option<ApiKey>,
}

impl HttpTransport {
    pub fn new(client: Client, endpoint: Url, api_key: Option<ApiKey>) -> Self {
        Self {
            client,
            endpoint,
            api_key,
        }
    }

    /// Builds the HTTP client with the configured timeouts.
    pub fn from_config(api: &ApiConfig) -> Result<Self> {
        let endpoint = Url::parse(&api.endpoint)?;

        let configure_builder = |builder: ClientBuilder| -> ClientBuilder {
            builder
                .connect_timeout(Duration::from_secs(api.connect_timeout_secs))
                .timeout(Duration::from_secs(api.request_timeout_secs))
                .pool_idle_timeout(Duration::from_secs(90))
                .tcp_keepalive(Some(Duration::from_secs(60)))
        };

        let client = configure_builder(Client::builder())
            .build()
            .map_err(|e| AppError::HttpClientBuild {
                message: e.to_string(),
            })?;

        match &api.api_key {
            Some(key) => info!(endpoint = %endpoint, api_key_preview = %key.preview(), "Search API client ready"),
            None => warn!(endpoint = %endpoint, "No search API key configured; requests are sent without credentials"),
        }

        Ok(Self::new(client, endpoint, api.api_key.clone()))
    }

    pub fn endpoint(&self) -> &Url {
        &self.endpoint
    }
}

#[async_trait]
impl SearchTransport for HttpTransport {
    async fn post_search(&self, request: &SearchRequest<'_>) -> std::result::Result<RawResponse, RemoteError> {
        let mut builder = self
            .client
            .post(self.endpoint.clone())
            .header(header::CONTENT_TYPE, "application/json")
            .json(request);
        if let Some(key) = &self.api_key {
            builder = builder.header(API_KEY_HEADER, key.expose_secret());
        }

        debug!(endpoint = %self.endpoint, text = %request.text, "Posting search request");
        let response = builder.send().await?;
        let status = response.status().as_u16();
        let body = response.text().await?;

        Ok(RawResponse { status, body })
    }
}
