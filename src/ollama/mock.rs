use async_trait::async_trait;
use futures::StreamExt;
use parking_lot::Mutex;
use std::sync::Arc;

use super::client::{ChatBackend, PullStream, TextStream};
use super::error::ProviderError;
use super::types::{LocalModel, PullProgress};
use crate::core::types::ChatMessage;

/// A prompt as received by [`MockBackend`].
#[derive(Debug, Clone, PartialEq)]
pub struct RecordedPrompt {
    pub model: String,
    pub temperature: f32,
    pub context: Vec<ChatMessage>,
    pub user_text: String,
}

#[derive(Debug, Clone)]
pub enum MockReply {
    Chunks(Vec<String>),
    /// Sends the chunks, then keeps the stream open without finishing.
    Stalled(Vec<String>),
    Error(String),
}

impl MockReply {
    #[must_use]
    pub fn chunks<I, S>(chunks: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::Chunks(chunks.into_iter().map(Into::into).collect())
    }
}

/// In-memory backend with queued replies, used to drive the chat runner
/// without a server.
#[derive(Clone, Default)]
pub struct MockBackend {
    replies: Arc<Mutex<Vec<MockReply>>>,
    models: Arc<Mutex<Vec<LocalModel>>>,
    prompts: Arc<Mutex<Vec<RecordedPrompt>>>,
}

impl MockBackend {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_reply(self, reply: MockReply) -> Self {
        self.replies.lock().push(reply);
        self
    }

    #[must_use]
    pub fn with_model(self, name: impl Into<String>) -> Self {
        self.models.lock().push(LocalModel {
            name: name.into(),
            size: 0,
            modified_at: None,
            digest: String::new(),
            details: None,
        });
        self
    }

    #[must_use]
    pub fn prompts(&self) -> Vec<RecordedPrompt> {
        self.prompts.lock().clone()
    }
}

impl std::fmt::Debug for MockBackend {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MockBackend")
            .field("queued", &self.replies.lock().len())
            .finish_non_exhaustive()
    }
}

#[async_trait]
impl ChatBackend for MockBackend {
    async fn send_prompt(
        &self,
        model: &str,
        temperature: f32,
        context: &[ChatMessage],
        user_text: &str,
    ) -> Result<TextStream, ProviderError> {
        self.prompts.lock().push(RecordedPrompt {
            model: model.to_string(),
            temperature,
            context: context.to_vec(),
            user_text: user_text.to_string(),
        });

        let reply = {
            let mut replies = self.replies.lock();
            if replies.is_empty() {
                return Err(ProviderError::Rejected {
                    status: 400,
                    message: "no mock reply queued".into(),
                });
            }
            replies.remove(0)
        };

        match reply {
            MockReply::Chunks(chunks) => {
                Ok(futures::stream::iter(chunks.into_iter().map(Ok)).boxed())
            }
            MockReply::Stalled(chunks) => Ok(futures::stream::iter(chunks.into_iter().map(Ok))
                .chain(futures::stream::pending())
                .boxed()),
            MockReply::Error(message) => Err(ProviderError::Connection(message)),
        }
    }

    async fn list_local_models(&self) -> Result<Vec<LocalModel>, ProviderError> {
        Ok(self.models.lock().clone())
    }

    async fn pull_model(&self, name: &str) -> Result<PullStream, ProviderError> {
        self.models.lock().push(LocalModel {
            name: name.to_string(),
            size: 0,
            modified_at: None,
            digest: String::new(),
            details: None,
        });

        let events = vec![
            PullProgress::Status("pulling manifest".into()),
            PullProgress::Progress(0.5),
            PullProgress::Progress(1.0),
            PullProgress::Success,
        ];
        Ok(futures::stream::iter(events).boxed())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn replies_in_queue_order() {
        let backend = MockBackend::new()
            .with_reply(MockReply::chunks(["a", "b"]))
            .with_reply(MockReply::Error("down".into()));

        let stream = backend.send_prompt("m", 0.1, &[], "hi").await.unwrap();
        let chunks: Vec<String> = stream.map(Result::unwrap).collect().await;
        assert_eq!(chunks, vec!["a", "b"]);

        assert!(backend.send_prompt("m", 0.1, &[], "again").await.is_err());
        assert!(backend.send_prompt("m", 0.1, &[], "empty").await.is_err());

        let prompts = backend.prompts();
        assert_eq!(prompts.len(), 3);
        assert_eq!(prompts[0].user_text, "hi");
    }

    #[tokio::test]
    async fn pull_registers_model() {
        let backend = MockBackend::new().with_model("llama3");
        let events: Vec<PullProgress> = backend.pull_model("phi3").await.unwrap().collect().await;

        assert_eq!(events.last(), Some(&PullProgress::Success));
        let names: Vec<String> = backend
            .list_local_models()
            .await
            .unwrap()
            .into_iter()
            .map(|m| m.name)
            .collect();
        assert_eq!(names, vec!["llama3", "phi3"]);
    }
}
