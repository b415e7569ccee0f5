use serde::{Deserialize, Serialize};

/// Server-side conversation state. Only the ID is kept by Vira.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Thread {
    pub id: String,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum RunStatus {
    Queued,
    InProgress,
    RequiresAction,
    Cancelling,
    Cancelled,
    Failed,
    Completed,
    Incomplete,
    Expired,
    #[serde(other)]
    Unknown,
}

impl RunStatus {
    /// The run is still being worked on and must be polled again.
    pub fn is_pending(&self) -> bool {
        matches!(
            self,
            RunStatus::Queued | RunStatus::InProgress | RunStatus::Cancelling
        )
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunError {
    pub code: Option<String>,
    pub message: String,
}

/// One assistant-inference invocation against a thread.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Run {
    pub id: String,
    pub thread_id: String,
    pub status: RunStatus,
    #[serde(default)]
    pub last_error: Option<RunError>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TextValue {
    pub value: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MessageContent {
    #[serde(rename = "type")]
    pub content_type: String,
    #[serde(default)]
    pub text: Option<TextValue>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Message {
    pub id: String,
    pub role: String,
    #[serde(default)]
    pub run_id: Option<String>,
    #[serde(default)]
    pub content: Vec<MessageContent>,
}

impl Message {
    /// Extracts the text content from the first text block.
    pub fn text(&self) -> Option<&str> {
        self.content
            .iter()
            .find(|c| c.content_type == "text")
            .and_then(|c| c.text.as_ref())
            .map(|t| t.value.as_str())
    }

    pub fn is_assistant(&self) -> bool {
        self.role == "assistant"
    }
}

#[derive(Debug, Deserialize)]
pub(crate) struct MessageList {
    pub data: Vec<Message>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FileObject {
    pub id: String,
}

#[derive(Debug, Deserialize)]
pub(crate) struct ApiErrorEnvelope {
    pub error: ApiErrorBody,
}

#[derive(Debug, Deserialize)]
pub(crate) struct ApiErrorBody {
    pub message: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unknown_run_status_does_not_fail_parsing() {
        let run: Run = serde_json::from_str(
            r#"{"id":"run_1","thread_id":"thread_1","assistant_id":"asst_1","status":"paused"}"#,
        )
        .unwrap();
        assert_eq!(run.status, RunStatus::Unknown);
        assert!(!run.status.is_pending());
    }

    #[test]
    fn test_pending_statuses() {
        assert!(RunStatus::Queued.is_pending());
        assert!(RunStatus::InProgress.is_pending());
        assert!(RunStatus::Cancelling.is_pending());
        assert!(!RunStatus::Completed.is_pending());
        assert!(!RunStatus::RequiresAction.is_pending());
    }

    #[test]
    fn test_message_text_skips_non_text_blocks() {
        let msg: Message = serde_json::from_str(
            r#"{
                "id": "msg_1",
                "role": "assistant",
                "run_id": "run_1",
                "content": [
                    {"type": "image_file", "image_file": {"file_id": "file_1"}},
                    {"type": "text", "text": {"value": "Start with a data structures course.", "annotations": []}}
                ]
            }"#,
        )
        .unwrap();
        assert_eq!(msg.text(), Some("Start with a data structures course."));
        assert!(msg.is_assistant());
    }
}
