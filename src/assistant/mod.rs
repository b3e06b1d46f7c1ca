pub mod client;
pub mod prompts;
pub mod types;

pub use client::{AssistantBackend, AssistantClient, ConfigError};
pub use types::FallbackError;

use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use tracing::{debug, info, warn};

use types::{FallbackJob, RunState};

/// Bounds for the poll loop. Interval × attempts is the total time
/// budget for one fallback run (defaults: 750 ms × 60 ≈ 45 s).
#[derive(Debug, Clone)]
pub struct PollPolicy {
    pub interval: Duration,
    pub max_attempts: u32,
}

impl Default for PollPolicy {
    fn default() -> Self {
        Self {
            interval: Duration::from_millis(750),
            max_attempts: 60,
        }
    }
}

impl PollPolicy {
    pub fn from_env() -> Self {
        let defaults = Self::default();
        let interval = dotenv::var("ASSISTANT_POLL_MS")
            .ok()
            .and_then(|v| v.parse::<u64>().ok())
            .map(Duration::from_millis)
            .unwrap_or(defaults.interval);
        let max_attempts = dotenv::var("ASSISTANT_MAX_POLLS")
            .ok()
            .and_then(|v| v.parse::<u32>().ok())
            .unwrap_or(defaults.max_attempts);
        Self {
            interval,
            max_attempts,
        }
    }
}

/// Drives one fallback job from creation to a final answer. One remote
/// job per invocation; a poll failure is terminal, never re-submitted.
/// Dropping the future stops polling; the remote job is left to its
/// own expiry.
pub struct Orchestrator {
    backend: Arc<dyn AssistantBackend>,
    policy: PollPolicy,
}

impl Orchestrator {
    pub fn new(backend: Arc<dyn AssistantBackend>, policy: PollPolicy) -> Self {
        Self { backend, policy }
    }

    /// Submit `question` (with optional grounding context) as a remote
    /// assistant run and wait for its first textual answer.
    pub async fn run(
        &self,
        question: &str,
        context: Option<&str>,
    ) -> Result<String, FallbackError> {
        let job_id = self
            .backend
            .create_job()
            .await
            .map_err(FallbackError::Create)?;

        let input = prompts::fallback_input(question, context);
        self.backend
            .submit_input(&job_id, &input)
            .await
            .map_err(FallbackError::Create)?;

        let run_id = self
            .backend
            .start_run(&job_id)
            .await
            .map_err(FallbackError::Start)?;

        let mut job = FallbackJob {
            id: job_id,
            run: run_id,
            status: RunState::Queued,
            created_at: Utc::now(),
            last_polled_at: None,
        };
        info!(job = %job.id, run = %job.run, "fallback run started");

        for attempt in 1..=self.policy.max_attempts {
            tokio::time::sleep(self.policy.interval).await;

            let status = self
                .backend
                .run_status(&job.id, &job.run)
                .await
                .map_err(FallbackError::Poll)?;
            job.status = status.status.clone();
            job.last_polled_at = Some(Utc::now());
            debug!(job = %job.id, attempt, status = job.status.as_str(), "fallback run polled");

            if job.status.is_pending() {
                continue;
            }

            if job.status == RunState::Completed {
                return self.extract_answer(&job).await;
            }

            let detail = status
                .last_error
                .map(|e| e.message)
                .unwrap_or_default();
            warn!(
                job = %job.id,
                status = job.status.as_str(),
                detail = %detail,
                elapsed_ms = (Utc::now() - job.created_at).num_milliseconds(),
                "fallback run ended without an answer"
            );
            return Err(FallbackError::RunTerminal {
                status: job.status,
                detail,
            });
        }

        warn!(job = %job.id, attempts = self.policy.max_attempts, "fallback run poll budget exhausted");
        Err(FallbackError::Timeout {
            attempts: self.policy.max_attempts,
        })
    }

    /// Fetch the job's outputs and take the newest assistant message's
    /// first text part.
    async fn extract_answer(&self, job: &FallbackJob) -> Result<String, FallbackError> {
        let outputs = self
            .backend
            .list_outputs(&job.id)
            .await
            .map_err(FallbackError::Poll)?;

        let answer = outputs
            .iter()
            .find(|m| m.role == "assistant")
            .and_then(|m| m.first_text())
            .map(str::trim)
            .filter(|t| !t.is_empty());

        match answer {
            Some(text) => {
                info!(
                    job = %job.id,
                    answer_len = text.len(),
                    elapsed_ms = (Utc::now() - job.created_at).num_milliseconds(),
                    "fallback run completed"
                );
                Ok(text.to_string())
            }
            None => Err(FallbackError::EmptyResult),
        }
    }
}
