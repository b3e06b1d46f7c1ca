use chrono::{DateTime, Utc};
use serde::Deserialize;
use thiserror::Error;

/// Remote job (conversation thread) identifier.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JobId(pub String);

/// Remote run identifier within a job.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunId(pub String);

impl std::fmt::Display for JobId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl std::fmt::Display for RunId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Run status as reported by the assistant API. Explicit variants so the
/// poll loop's handling is exhaustive; anything the API adds later lands
/// in `Unknown` and is treated as terminal.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RunState {
    Queued,
    InProgress,
    Cancelling,
    RequiresAction,
    Incomplete,
    Completed,
    Failed,
    Cancelled,
    Expired,
    #[serde(other)]
    Unknown,
}

impl RunState {
    /// Still making progress, keep polling. `RequiresAction` is not
    /// pending: this service submits no tools, so such a run can never
    /// advance.
    pub fn is_pending(&self) -> bool {
        matches!(self, RunState::Queued | RunState::InProgress | RunState::Cancelling)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            RunState::Queued => "queued",
            RunState::InProgress => "in_progress",
            RunState::Cancelling => "cancelling",
            RunState::RequiresAction => "requires_action",
            RunState::Incomplete => "incomplete",
            RunState::Completed => "completed",
            RunState::Failed => "failed",
            RunState::Cancelled => "cancelled",
            RunState::Expired => "expired",
            RunState::Unknown => "unknown",
        }
    }
}

impl std::fmt::Display for RunState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error detail attached to a failed run.
#[derive(Debug, Clone, Deserialize)]
pub struct RunError {
    #[serde(default)]
    pub code: Option<String>,
    pub message: String,
}

/// One poll's view of a run.
#[derive(Debug, Clone, Deserialize)]
pub struct RunStatus {
    pub status: RunState,
    #[serde(default)]
    pub last_error: Option<RunError>,
}

/// One content part of an output message. Non-text parts are kept as an
/// explicit variant instead of being dropped during deserialization.
#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ContentPart {
    Text { text: TextValue },
    #[serde(other)]
    Other,
}

#[derive(Debug, Clone, Deserialize)]
pub struct TextValue {
    pub value: String,
}

/// One output message of a job. The API lists newest first.
#[derive(Debug, Clone, Deserialize)]
pub struct OutputMessage {
    pub role: String,
    #[serde(default)]
    pub content: Vec<ContentPart>,
}

impl OutputMessage {
    /// The first text part, if the message has one.
    pub fn first_text(&self) -> Option<&str> {
        self.content.iter().find_map(|part| match part {
            ContentPart::Text { text } => Some(text.value.as_str()),
            ContentPart::Other => None,
        })
    }
}

/// Bookkeeping for one fallback invocation. Mutated only by the
/// orchestrator, logged when the run ends, never persisted.
#[derive(Debug)]
pub struct FallbackJob {
    pub id: JobId,
    pub run: RunId,
    pub status: RunState,
    pub created_at: DateTime<Utc>,
    pub last_polled_at: Option<DateTime<Utc>>,
}

/// Failure of one fallback invocation, tagged by the stage that failed.
#[derive(Debug, Error)]
pub enum FallbackError {
    #[error("assistant job could not be created")]
    Create(#[source] anyhow::Error),
    #[error("assistant run could not be started")]
    Start(#[source] anyhow::Error),
    #[error("assistant run status could not be read")]
    Poll(#[source] anyhow::Error),
    #[error("assistant run ended as {status}: {detail}")]
    RunTerminal { status: RunState, detail: String },
    #[error("assistant run finished without any text output")]
    EmptyResult,
    #[error("assistant run did not finish within {attempts} polls")]
    Timeout { attempts: u32 },
}

impl FallbackError {
    /// Stable stage tag used in logs and error payloads.
    pub fn stage(&self) -> &'static str {
        match self {
            FallbackError::Create(_) => "create",
            FallbackError::Start(_) => "start",
            FallbackError::Poll(_) => "poll",
            FallbackError::RunTerminal { .. } => "run-terminal",
            FallbackError::EmptyResult => "empty-result",
            FallbackError::Timeout { .. } => "timeout",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_run_state_wire_parse() {
        let s: RunState = serde_json::from_str("\"in_progress\"").unwrap();
        assert_eq!(s, RunState::InProgress);
        assert!(s.is_pending());

        let s: RunState = serde_json::from_str("\"completed\"").unwrap();
        assert_eq!(s, RunState::Completed);
        assert!(!s.is_pending());
    }

    #[test]
    fn test_unknown_run_state_is_terminal() {
        let s: RunState = serde_json::from_str("\"some_future_state\"").unwrap();
        assert_eq!(s, RunState::Unknown);
        assert!(!s.is_pending());
    }

    #[test]
    fn test_first_text_skips_non_text_parts() {
        let msg: OutputMessage = serde_json::from_value(serde_json::json!({
            "role": "assistant",
            "content": [
                {"type": "image_file", "image_file": {"file_id": "f1"}},
                {"type": "text", "text": {"value": "odpověď"}}
            ]
        }))
        .unwrap();
        assert_eq!(msg.first_text(), Some("odpověď"));
    }

    #[test]
    fn test_first_text_none_when_no_text() {
        let msg: OutputMessage = serde_json::from_value(serde_json::json!({
            "role": "assistant",
            "content": [{"type": "image_file", "image_file": {"file_id": "f1"}}]
        }))
        .unwrap();
        assert_eq!(msg.first_text(), None);
    }

    #[test]
    fn test_stage_tags() {
        assert_eq!(FallbackError::EmptyResult.stage(), "empty-result");
        assert_eq!(FallbackError::Timeout { attempts: 60 }.stage(), "timeout");
        assert_eq!(
            FallbackError::RunTerminal {
                status: RunState::Expired,
                detail: String::new()
            }
            .stage(),
            "run-terminal"
        );
    }
}
