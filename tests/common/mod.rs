//! Common test utilities and fixtures
#![allow(dead_code)]

use async_trait::async_trait;
use neuron_lens::{
    config::AppConfig,
    error::RemoteError,
    explain::{ExplanationClient, RawResponse, SearchRequest, SearchTransport},
    AppState,
};
use serde_json::json;
use std::{
    collections::HashMap,
    sync::{
        atomic::{AtomicUsize, Ordering},
        Arc, Mutex,
    },
    time::Duration,
};

/// What the stub answers for a given token text.
#[derive(Clone)]
pub enum Scripted {
    Reply(RawResponse),
    Fail(RemoteError),
}

/// In-memory search API. Records every request and answers from a script;
/// unscripted tokens get one neuron with the description `about <token>`.
#[derive(Default)]
pub struct StubTransport {
    script: HashMap<String, Scripted>,
    delays: HashMap<String, Duration>,
    default_delay: Option<Duration>,
    calls: Mutex<Vec<String>>,
    requests: Mutex<Vec<serde_json::Value>>,
    in_flight: AtomicUsize,
    max_in_flight: AtomicUsize,
}

impl StubTransport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn reply(mut self, token: &str, status: u16, body: impl Into<String>) -> Self {
        self.script
            .insert(token.to_string(), Scripted::Reply(RawResponse::new(status, body)));
        self
    }

    pub fn fail(mut self, token: &str, error: RemoteError) -> Self {
        self.script.insert(token.to_string(), Scripted::Fail(error));
        self
    }

    pub fn delay(mut self, token: &str, delay: Duration) -> Self {
        self.delays.insert(token.to_string(), delay);
        self
    }

    pub fn delay_all(mut self, delay: Duration) -> Self {
        self.default_delay = Some(delay);
        self
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    pub fn requests(&self) -> Vec<serde_json::Value> {
        self.requests.lock().unwrap().clone()
    }

    pub fn max_in_flight(&self) -> usize {
        self.max_in_flight.load(Ordering::SeqCst)
    }
}

pub fn default_body(token: &str) -> String {
    json!({
        "result": [
            {"neuron": {"name": format!("n-{token}"), "explanations": [{"description": format!("about {token}")}]}}
        ]
    })
    .to_string()
}

#[async_trait]
impl SearchTransport for StubTransport {
    async fn post_search(&self, request: &SearchRequest<'_>) -> Result<RawResponse, RemoteError> {
        self.calls.lock().unwrap().push(request.text.to_string());
        self.requests
            .lock()
            .unwrap()
            .push(serde_json::to_value(request).unwrap());

        let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.max_in_flight.fetch_max(now, Ordering::SeqCst);

        let delay = self.delays.get(request.text).copied().or(self.default_delay);
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }
        self.in_flight.fetch_sub(1, Ordering::SeqCst);

        match self.script.get(request.text) {
            Some(Scripted::Reply(response)) => Ok(response.clone()),
            Some(Scripted::Fail(error)) => Err(error.clone()),
            None => Ok(RawResponse::new(200, default_body(request.text))),
        }
    }
}

pub fn client_over(stub: &Arc<StubTransport>) -> ExplanationClient {
    ExplanationClient::new(stub.clone())
}

/// Test configuration builder
pub struct TestConfigBuilder {
    config: AppConfig,
}

impl TestConfigBuilder {
    pub fn new() -> Self {
        Self {
            config: AppConfig::default(),
        }
    }

    pub fn with_max_concurrency(mut self, max_concurrency: usize) -> Self {
        self.config.batch.max_concurrency = max_concurrency;
        self
    }

    pub fn with_deadline_secs(mut self, deadline_secs: u64) -> Self {
        self.config.batch.deadline_secs = deadline_secs;
        self
    }

    pub fn with_default_preset(mut self, preset: impl Into<String>) -> Self {
        self.config.default_preset = preset.into();
        self
    }

    pub fn build(self) -> AppConfig {
        self.config
    }
}

impl Default for TestConfigBuilder {
    fn default() -> Self {
        Self::new()
    }
}

pub fn state_over(stub: &Arc<StubTransport>, config: AppConfig) -> Arc<AppState> {
    Arc::new(AppState::with_transport(config, stub.clone()))
}
