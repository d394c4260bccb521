use crate::config::persistence::ConfigPersister;
use std::sync::Arc;
use tokio::sync::mpsc;
use tracing::{debug, warn};

/// Settings changed from inside the chat that should outlive the session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigEvent {
    ModelChanged { model: String },
}

pub type ConfigEventSender = mpsc::UnboundedSender<ConfigEvent>;

/// Background task that writes [`ConfigEvent`]s to disk so the UI never
/// blocks on file IO.
pub struct ConfigEventHandler {
    persister: Arc<ConfigPersister>,
    events: mpsc::UnboundedReceiver<ConfigEvent>,
}

impl ConfigEventHandler {
    #[must_use]
    pub fn new(persister: Arc<ConfigPersister>) -> (Self, ConfigEventSender) {
        let (tx, events) = mpsc::unbounded_channel();
        (Self { persister, events }, tx)
    }

    pub async fn run(mut self) {
        while let Some(first) = self.events.recv().await {
            // Flicking through the model picker queues several changes;
            // only the last one needs writing.
            let mut latest = first;
            while let Ok(next) = self.events.try_recv() {
                latest = next;
            }
            self.persist(latest).await;
        }
    }

    async fn persist(&self, event: ConfigEvent) {
        let persister = Arc::clone(&self.persister);
        let outcome = tokio::task::spawn_blocking(move || match &event {
            ConfigEvent::ModelChanged { model } => persister.set_model(model),
        })
        .await;

        match outcome {
            Ok(Ok(())) => debug!(path = %self.persister.path().display(), "saved config change"),
            Ok(Err(e)) => warn!(error = %e, "failed to persist config change, keeping it in memory"),
            Err(e) => warn!(error = %e, "config writer task failed"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[tokio::test]
    async fn last_queued_model_wins() {
        let temp_dir = TempDir::new().expect("temp dir");
        let path = temp_dir.path().join("config.toml");
        let (handler, tx) = ConfigEventHandler::new(Arc::new(ConfigPersister::new(path.clone())));

        for model in ["llama3", "mistral", "qwen2.5:7b"] {
            tx.send(ConfigEvent::ModelChanged {
                model: model.to_string(),
            })
            .expect("send event");
        }
        drop(tx);
        handler.run().await;

        let content = std::fs::read_to_string(&path).expect("read config");
        assert!(content.contains("model = \"qwen2.5:7b\""));
    }
}
