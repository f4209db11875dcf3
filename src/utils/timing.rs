// src/utils/timing.rs

use std::time::{Duration, Instant};
use tracing::{debug, warn};

/// Measures one operation and logs its duration once, at debug level, or as a
/// warning when it ran past the configured threshold.
pub struct OperationTimer {
    operation: &'static str,
    start_time: Instant,
    warn_threshold: Option<Duration>,
}

impl OperationTimer {
    pub fn start(operation: &'static str) -> Self {
        Self {
            operation,
            start_time: Instant::now(),
            warn_threshold: None,
        }
    }

    pub fn with_warn_threshold(mut self, threshold: Duration) -> Self {
        self.warn_threshold = Some(threshold);
        self
    }

    /// Logs the elapsed time together with a short `subject` (e.g. the token).
    pub fn finish(self, subject: &str) -> Duration {
        let duration = self.start_time.elapsed();
        match self.warn_threshold {
            Some(threshold) if duration > threshold => {
                warn!(
                    operation = self.operation,
                    subject = %subject,
                    duration_ms = duration.as_millis() as u64,
                    threshold_ms = threshold.as_millis() as u64,
                    "Operation exceeded warning threshold"
                );
            }
            _ => {
                debug!(
                    operation = self.operation,
                    subject = %subject,
                    duration_ms = duration.as_millis() as u64,
                    "Operation completed"
                );
            }
        }
        duration
    }

    pub fn elapsed(&self) -> Duration {
        self.start_time.elapsed()
    }
}
