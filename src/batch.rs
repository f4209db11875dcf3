// src/batch.rs

use crate::{
    config::BatchConfig,
    error::RemoteError,
    explain::{ExplanationClient, ExplanationRecord},
    presets::ModelConfig,
};
use serde::{Deserialize, Serialize};
use std::{collections::HashMap, sync::Arc, time::Duration};
use tokio::task::JoinSet;
use tokio_util::sync::CancellationToken;
use tracing::{error, info, warn};

/// How repeated tokens within one batch are looked up.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LookupPolicy {
    /// Every position gets its own remote call and its own result.
    #[default]
    PerOccurrence,
    /// One call per distinct token text; the result is copied to every position.
    Shared,
}

/// What happened to the lookup for one token position.
#[derive(Debug, Clone, PartialEq)]
pub enum LookupOutcome {
    Completed,
    Failed(RemoteError),
    /// The batch was cancelled or ran out of time before this lookup finished.
    NotCompleted,
}

/// Why a batch stopped before every lookup finished.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Interruption {
    DeadlineExceeded,
    Cancelled,
}

#[derive(Debug, Clone, PartialEq)]
pub struct TokenLookup {
    pub position: usize,
    pub token: String,
    /// Empty when the lookup failed or did not complete.
    pub records: Vec<ExplanationRecord>,
    pub outcome: LookupOutcome,
}

impl TokenLookup {
    pub fn error(&self) -> Option<&RemoteError> {
        match &self.outcome {
            LookupOutcome::Failed(e) => Some(e),
            _ => None,
        }
    }

    pub fn is_completed(&self) -> bool {
        matches!(self.outcome, LookupOutcome::Completed)
    }

    pub fn descriptions(&self) -> impl Iterator<Item = &str> {
        self.records.iter().map(|r| r.description.as_str())
    }
}

/// Per-position results of one batch, in input order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BatchResult {
    pub lookups: Vec<TokenLookup>,
    pub interruption: Option<Interruption>,
    /// Remote calls started for this batch.
    pub calls_issued: usize,
}

impl BatchResult {
    pub fn len(&self) -> usize {
        self.lookups.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lookups.is_empty()
    }

    /// True when some lookup never finished.
    pub fn is_partial(&self) -> bool {
        self.interruption.is_some()
            || self
                .lookups
                .iter()
                .any(|l| l.outcome == LookupOutcome::NotCompleted)
    }

    /// Failed lookups with their errors, in position order.
    pub fn errors(&self) -> impl Iterator<Item = (&TokenLookup, &RemoteError)> {
        self.lookups.iter().filter_map(|l| l.error().map(|e| (l, e)))
    }

    /// Ordered `token -> records` pairs; repeated tokens keep their own entries.
    pub fn entries(&self) -> Vec<(&str, &[ExplanationRecord])> {
        self.lookups
            .iter()
            .map(|l| (l.token.as_str(), l.records.as_slice()))
            .collect()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct BatchSettings {
    pub max_concurrency: usize,
    pub deadline: Duration,
    pub policy: LookupPolicy,
}

impl Default for BatchSettings {
    fn default() -> Self {
        Self::from(&BatchConfig::default())
    }
}

impl From<&BatchConfig> for BatchSettings {
    fn from(config: &BatchConfig) -> Self {
        Self {
            max_concurrency: config.max_concurrency,
            deadline: Duration::from_secs(config.deadline_secs),
            policy: config.lookup_policy,
        }
    }
}

/// Fans a token sequence out to [`ExplanationClient::fetch`].
///
/// At most `max_concurrency` lookups are in flight; they are started in token
/// order, so a limit of one gives strictly sequential calls. A failing token
/// never aborts the batch: its entry is empty and carries the error.
#[derive(Debug, Clone)]
pub struct BatchAggregator {
    client: ExplanationClient,
    settings: BatchSettings,
}

impl BatchAggregator {
    pub fn new(client: ExplanationClient, settings: BatchSettings) -> Self {
        Self { client, settings }
    }

    pub fn settings(&self) -> &BatchSettings {
        &self.settings
    }

    pub fn with_policy(mut self, policy: LookupPolicy) -> Self {
        self.settings.policy = policy;
        self
    }

    pub async fn fetch_all<S: AsRef<str>>(&self, tokens: &[S], config: &ModelConfig) -> BatchResult {
        self.fetch_all_with_cancel(tokens, config, CancellationToken::new())
            .await
    }

    /// Like [`fetch_all`](Self::fetch_all), stopping early when `cancel` fires.
    /// Lookups still running at that point (or at the deadline) are aborted
    /// and reported as [`LookupOutcome::NotCompleted`].
    pub async fn fetch_all_with_cancel<S: AsRef<str>>(
        &self,
        tokens: &[S],
        config: &ModelConfig,
        cancel: CancellationToken,
    ) -> BatchResult {
        let positions: Vec<String> = tokens.iter().map(|t| t.as_ref().to_string()).collect();
        if positions.is_empty() {
            return BatchResult::default();
        }

        let (jobs, job_of_position) = plan_jobs(&positions, self.settings.policy);
        let limit = self.settings.max_concurrency.max(1);
        info!(
            tokens = positions.len(),
            lookups = jobs.len(),
            policy = ?self.settings.policy,
            max_concurrency = limit,
            model = %config.model_id,
            "Starting explanation batch"
        );

        let config = Arc::new(config.clone());
        let mut job_results: Vec<Option<Result<Vec<ExplanationRecord>, RemoteError>>> =
            vec![None; jobs.len()];
        let mut join_set = JoinSet::new();
        let mut next_job = 0;
        let mut interruption = None;

        let deadline = tokio::time::sleep(self.settings.deadline);
        tokio::pin!(deadline);

        loop {
            if cancel.is_cancelled() {
                interruption = Some(Interruption::Cancelled);
                break;
            }
            while join_set.len() < limit && next_job < jobs.len() {
                let client = self.client.clone();
                let config = Arc::clone(&config);
                let token = jobs[next_job].clone();
                let index = next_job;
                join_set.spawn(async move { (index, client.fetch(&token, &config).await) });
                next_job += 1;
            }
            if join_set.is_empty() {
                break;
            }

            tokio::select! {
                biased;
                () = cancel.cancelled() => {
                    interruption = Some(Interruption::Cancelled);
                    break;
                }
                () = &mut deadline => {
                    interruption = Some(Interruption::DeadlineExceeded);
                    break;
                }
                joined = join_set.join_next() => match joined {
                    Some(Ok((index, result))) => job_results[index] = Some(result),
                    Some(Err(e)) => error!(error = %e, "Lookup task terminated abnormally"),
                    None => break,
                },
            }
        }
        if interruption.is_some() {
            // Lookups that finished in the same tick as the interruption still count.
            tokio::task::yield_now().await;
            while let Some(joined) = join_set.try_join_next() {
                match joined {
                    Ok((index, result)) => job_results[index] = Some(result),
                    Err(e) if !e.is_cancelled() => {
                        error!(error = %e, "Lookup task terminated abnormally")
                    }
                    Err(_) => {}
                }
            }
        }
        join_set.abort_all();

        let lookups: Vec<TokenLookup> = positions
            .into_iter()
            .enumerate()
            .map(|(position, token)| {
                let (records, outcome) = match &job_results[job_of_position[position]] {
                    Some(Ok(records)) => (records.clone(), LookupOutcome::Completed),
                    Some(Err(e)) => {
                        warn!(position, token = %token, error = %e, "Lookup failed for token");
                        (Vec::new(), LookupOutcome::Failed(e.clone()))
                    }
                    None => (Vec::new(), LookupOutcome::NotCompleted),
                };
                TokenLookup {
                    position,
                    token,
                    records,
                    outcome,
                }
            })
            .collect();

        let result = BatchResult {
            lookups,
            interruption,
            calls_issued: next_job,
        };
        let failed = result.errors().count();
        if let Some(reason) = interruption {
            warn!(?reason, calls_issued = next_job, failed, "Explanation batch interrupted");
        } else {
            info!(calls_issued = next_job, failed, "Explanation batch finished");
        }
        result
    }
}

/// Distinct lookups to run, and which lookup serves each position.
fn plan_jobs(tokens: &[String], policy: LookupPolicy) -> (Vec<String>, Vec<usize>) {
    match policy {
        LookupPolicy::PerOccurrence => (tokens.to_vec(), (0..tokens.len()).collect()),
        LookupPolicy::Shared => {
            let mut jobs: Vec<String> = Vec::new();
            let mut job_of_token: HashMap<&str, usize> = HashMap::new();
            let mut job_of_position = Vec::with_capacity(tokens.len());
            for token in tokens {
                let index = *job_of_token.entry(token.as_str()).or_insert_with(|| {
                    jobs.push(token.clone());
                    jobs.len() - 1
                });
                job_of_position.push(index);
            }
            (jobs, job_of_position)
        }
    }
}
