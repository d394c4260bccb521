use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::core::types::ChatMessage;

#[derive(Debug, Clone, Serialize)]
pub struct ChatRequest<'a> {
    pub model: &'a str,
    pub messages: &'a [ChatMessage],
    pub stream: bool,
    pub options: ChatOptions,
}

#[derive(Debug, Clone, Copy, Serialize)]
pub struct ChatOptions {
    pub temperature: f32,
}

/// One line of a streamed `/api/chat` response.
#[derive(Debug, Clone, Deserialize)]
pub struct ChatChunk {
    #[serde(default)]
    pub message: Option<ChunkMessage>,
    #[serde(default)]
    pub done: bool,
    #[serde(default)]
    pub error: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ChunkMessage {
    #[serde(default)]
    pub content: String,
}

impl ChatChunk {
    #[must_use]
    pub fn text(&self) -> &str {
        self.message.as_ref().map_or("", |m| m.content.as_str())
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct TagsResponse {
    #[serde(default)]
    pub models: Vec<LocalModel>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct LocalModel {
    pub name: String,
    #[serde(default)]
    pub size: u64,
    #[serde(default)]
    pub modified_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub digest: String,
    #[serde(default)]
    pub details: Option<ModelDetails>,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ModelDetails {
    #[serde(default)]
    pub family: Option<String>,
    #[serde(default)]
    pub parameter_size: Option<String>,
    #[serde(default)]
    pub quantization_level: Option<String>,
}

impl LocalModel {
    /// Size in gigabytes with one decimal, e.g. `"4.1 GB"`.
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn size_label(&self) -> String {
        format!("{:.1} GB", self.size as f64 / 1_000_000_000.0)
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct PullRequest<'a> {
    pub model: &'a str,
    pub stream: bool,
}

/// Raw `/api/pull` status line.
#[derive(Debug, Clone, Deserialize)]
pub struct PullStatus {
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub total: Option<u64>,
    #[serde(default)]
    pub completed: Option<u64>,
    #[serde(default)]
    pub error: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum PullProgress {
    Status(String),
    /// Fraction of the current layer downloaded, in `[0, 1]`.
    Progress(f64),
    Success,
    Failed(String),
}

impl From<PullStatus> for PullProgress {
    #[allow(clippy::cast_precision_loss)]
    fn from(status: PullStatus) -> Self {
        if let Some(err) = status.error {
            return Self::Failed(err);
        }

        if let (Some(total), Some(completed)) = (status.total, status.completed)
            && total > 0
        {
            return Self::Progress((completed as f64 / total as f64).clamp(0.0, 1.0));
        }

        match status.status {
            Some(s) if s == "success" => Self::Success,
            Some(s) => Self::Status(s),
            None => Self::Status(String::new()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn status(json: &str) -> PullProgress {
        serde_json::from_str::<PullStatus>(json).unwrap().into()
    }

    #[test]
    fn pull_status_maps_to_progress() {
        assert_eq!(
            status(r#"{"status":"pulling manifest"}"#),
            PullProgress::Status("pulling manifest".into())
        );
        assert_eq!(
            status(r#"{"status":"pulling abc","total":200,"completed":50}"#),
            PullProgress::Progress(0.25)
        );
        assert_eq!(status(r#"{"status":"success"}"#), PullProgress::Success);
        assert_eq!(
            status(r#"{"error":"pull model manifest: file does not exist"}"#),
            PullProgress::Failed("pull model manifest: file does not exist".into())
        );
    }

    #[test]
    fn progress_is_clamped() {
        assert_eq!(
            status(r#"{"status":"x","total":10,"completed":20}"#),
            PullProgress::Progress(1.0)
        );
    }

    #[test]
    fn tags_response_parses() {
        let json = r#"{"models":[{"name":"llama3:latest","size":4661224676,
            "modified_at":"2024-05-01T10:00:00.000000Z","digest":"365c0bd3c000",
            "details":{"family":"llama","parameter_size":"8.0B"}}]}"#;

        let tags: TagsResponse = serde_json::from_str(json).unwrap();
        assert_eq!(tags.models.len(), 1);
        let model = &tags.models[0];
        assert_eq!(model.name, "llama3:latest");
        assert!(model.modified_at.is_some());
        assert_eq!(model.size_label(), "4.7 GB");
    }

    #[test]
    fn chat_chunk_text() {
        let chunk: ChatChunk =
            serde_json::from_str(r#"{"message":{"role":"assistant","content":"Hi"},"done":false}"#)
                .unwrap();
        assert_eq!(chunk.text(), "Hi");

        let done: ChatChunk = serde_json::from_str(r#"{"done":true}"#).unwrap();
        assert!(done.done);
        assert_eq!(done.text(), "");
    }

    #[test]
    fn chat_request_serializes_temperature() {
        let messages = vec![ChatMessage::user("hi")];
        let request = ChatRequest {
            model: "llama3",
            messages: &messages,
            stream: true,
            options: ChatOptions { temperature: 0.5 },
        };

        let value = serde_json::to_value(&request).unwrap();
        assert_eq!(value["model"], "llama3");
        assert_eq!(value["messages"][0]["role"], "user");
        assert_eq!(value["options"]["temperature"], 0.5);
    }
}
