use async_trait::async_trait;
use futures::StreamExt;
use futures::stream::BoxStream;
use tracing::{debug, info};

use super::error::ProviderError;
use super::http::{HttpClient, HttpConfig};
use super::ndjson::NdjsonParser;
use super::types::{
    ChatChunk, ChatOptions, ChatRequest, LocalModel, PullProgress, PullRequest, PullStatus,
    TagsResponse,
};
use crate::core::types::ChatMessage;

pub const DEFAULT_SERVER_URL: &str = "http://127.0.0.1:11434";

pub type TextStream = BoxStream<'static, Result<String, ProviderError>>;
pub type PullStream = BoxStream<'static, PullProgress>;

/// The operations the chat front end needs from a model server.
#[async_trait]
pub trait ChatBackend: Send + Sync {
    /// Streams the assistant reply to `user_text` given the prior `context`.
    async fn send_prompt(
        &self,
        model: &str,
        temperature: f32,
        context: &[ChatMessage],
        user_text: &str,
    ) -> Result<TextStream, ProviderError>;

    async fn list_local_models(&self) -> Result<Vec<LocalModel>, ProviderError>;

    async fn pull_model(&self, name: &str) -> Result<PullStream, ProviderError>;
}

/// Prior turns followed by the new user message.
#[must_use]
pub fn build_messages(context: &[ChatMessage], user_text: &str) -> Vec<ChatMessage> {
    let mut messages = Vec::with_capacity(context.len() + 1);
    messages.extend_from_slice(context);
    messages.push(ChatMessage::user(user_text));
    messages
}

#[derive(Debug, Clone)]
pub struct OllamaClient {
    http: HttpClient,
}

impl OllamaClient {
    pub fn new(base_url: impl Into<String>) -> Result<Self, ProviderError> {
        Self::with_http_config(base_url, &HttpConfig::default())
    }

    pub fn with_http_config(
        base_url: impl Into<String>,
        config: &HttpConfig,
    ) -> Result<Self, ProviderError> {
        Ok(Self {
            http: HttpClient::new(&base_url.into(), config)?,
        })
    }

    #[must_use]
    pub fn base_url(&self) -> &str {
        self.http.base_url()
    }
}

#[async_trait]
impl ChatBackend for OllamaClient {
    async fn send_prompt(
        &self,
        model: &str,
        temperature: f32,
        context: &[ChatMessage],
        user_text: &str,
    ) -> Result<TextStream, ProviderError> {
        let messages = build_messages(context, user_text);
        let request = ChatRequest {
            model,
            messages: &messages,
            stream: true,
            options: ChatOptions { temperature },
        };

        debug!(model, messages = messages.len(), "sending chat request");
        let body = self.http.post_streaming("/api/chat", &request).await?;

        let stream = NdjsonParser::parse_stream::<_, ChatChunk>(body).filter_map(|item| async move {
            match item {
                Ok(chunk) => {
                    if let Some(error) = chunk.error {
                        return Some(Err(ProviderError::StreamError(error)));
                    }
                    let text = chunk.text();
                    (!text.is_empty()).then(|| Ok(text.to_string()))
                }
                Err(e) => Some(Err(e)),
            }
        });

        Ok(stream.boxed())
    }

    async fn list_local_models(&self) -> Result<Vec<LocalModel>, ProviderError> {
        let tags: TagsResponse = self.http.get_json("/api/tags").await?;
        debug!(count = tags.models.len(), "listed local models");
        Ok(tags.models)
    }

    async fn pull_model(&self, name: &str) -> Result<PullStream, ProviderError> {
        info!(model = name, "pulling model");
        let request = PullRequest {
            model: name,
            stream: true,
        };
        let body = self.http.post_streaming("/api/pull", &request).await?;

        let stream = NdjsonParser::parse_stream::<_, PullStatus>(body).map(|item| match item {
            Ok(status) => PullProgress::from(status),
            Err(e) => PullProgress::Failed(e.to_string()),
        });

        Ok(stream.boxed())
    }
}
