use anyhow::{bail, Context, Result};
use async_trait::async_trait;
use serde::Deserialize;
use thiserror::Error;

use super::types::{JobId, OutputMessage, RunId, RunStatus};

/// Capability set the orchestrator needs from the remote assistant API.
/// The production impl speaks the OpenAI Assistants HTTP shape; tests
/// script their own.
#[async_trait]
pub trait AssistantBackend: Send + Sync {
    /// Create a remote job (conversation thread).
    async fn create_job(&self) -> Result<JobId>;
    /// Attach the user input to the job.
    async fn submit_input(&self, job: &JobId, text: &str) -> Result<()>;
    /// Start executing the job against the configured assistant identity.
    async fn start_run(&self, job: &JobId) -> Result<RunId>;
    /// Current status of a run.
    async fn run_status(&self, job: &JobId, run: &RunId) -> Result<RunStatus>;
    /// Output messages of the job, newest first.
    async fn list_outputs(&self, job: &JobId) -> Result<Vec<OutputMessage>>;
}

/// The generative fallback cannot run without these; the KB-direct and
/// KB-link strategies never need them.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("{0} is not set")]
    MissingVar(&'static str),
    #[error("failed to build HTTP client")]
    HttpClient(#[source] reqwest::Error),
}

#[derive(Deserialize)]
struct CreatedObject {
    id: String,
}

#[derive(Deserialize)]
struct MessageList {
    data: Vec<OutputMessage>,
}

/// HTTP client for an OpenAI-Assistants-shaped API.
pub struct AssistantClient {
    client: reqwest::Client,
    base_url: String,
    api_key: String,
    assistant_id: String,
}

impl AssistantClient {
    pub fn from_env() -> Result<Self, ConfigError> {
        let api_key = dotenv::var("OPENAI_API_KEY")
            .ok()
            .filter(|k| !k.is_empty())
            .ok_or(ConfigError::MissingVar("OPENAI_API_KEY"))?;
        let assistant_id = dotenv::var("OPENAI_ASSISTANT_ID")
            .ok()
            .filter(|k| !k.is_empty())
            .ok_or(ConfigError::MissingVar("OPENAI_ASSISTANT_ID"))?;
        let base_url = dotenv::var("OPENAI_BASE_URL")
            .unwrap_or_else(|_| "https://api.openai.com/v1".to_string());

        // Per-request timeout; the overall budget is the poll policy's job.
        let client = reqwest::Client::builder()
            .timeout(std::time::Duration::from_secs(30))
            .build()
            .map_err(ConfigError::HttpClient)?;

        Ok(Self {
            client,
            base_url,
            api_key,
            assistant_id,
        })
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}/{}", self.base_url.trim_end_matches('/'), path)
    }

    fn headers(&self, req: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        req.header("Authorization", format!("Bearer {}", self.api_key))
            .header("OpenAI-Beta", "assistants=v2")
    }

    async fn parse<T: serde::de::DeserializeOwned>(resp: reqwest::Response) -> Result<T> {
        let status = resp.status();
        let body = resp.text().await.context("failed to read assistant API response")?;
        if !status.is_success() {
            bail!("assistant API returned {}: {}", status, body);
        }
        serde_json::from_str(&body).context("failed to parse assistant API response")
    }
}

#[async_trait]
impl AssistantBackend for AssistantClient {
    async fn create_job(&self) -> Result<JobId> {
        let req = self
            .client
            .post(self.endpoint("threads"))
            .json(&serde_json::json!({}));
        let resp = self.headers(req).send().await.context("thread create request failed")?;
        let created: CreatedObject = Self::parse(resp).await?;
        Ok(JobId(created.id))
    }

    async fn submit_input(&self, job: &JobId, text: &str) -> Result<()> {
        let req = self
            .client
            .post(self.endpoint(&format!("threads/{}/messages", job)))
            .json(&serde_json::json!({ "role": "user", "content": text }));
        let resp = self.headers(req).send().await.context("message create request failed")?;
        let _: CreatedObject = Self::parse(resp).await?;
        Ok(())
    }

    async fn start_run(&self, job: &JobId) -> Result<RunId> {
        let req = self
            .client
            .post(self.endpoint(&format!("threads/{}/runs", job)))
            .json(&serde_json::json!({ "assistant_id": self.assistant_id }));
        let resp = self.headers(req).send().await.context("run create request failed")?;
        let created: CreatedObject = Self::parse(resp).await?;
        Ok(RunId(created.id))
    }

    async fn run_status(&self, job: &JobId, run: &RunId) -> Result<RunStatus> {
        let req = self
            .client
            .get(self.endpoint(&format!("threads/{}/runs/{}", job, run)));
        let resp = self.headers(req).send().await.context("run status request failed")?;
        Self::parse(resp).await
    }

    async fn list_outputs(&self, job: &JobId) -> Result<Vec<OutputMessage>> {
        let req = self
            .client
            .get(self.endpoint(&format!("threads/{}/messages", job)));
        let resp = self.headers(req).send().await.context("message list request failed")?;
        let list: MessageList = Self::parse(resp).await?;
        Ok(list.data)
    }
}
