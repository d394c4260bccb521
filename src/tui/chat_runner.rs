use crate::core::types::ChatMessage;
use crate::ollama::ChatBackend;
use crate::tui::events::AppEvent;
use futures::StreamExt;
use parking_lot::Mutex;
use std::sync::Arc;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

#[derive(Debug)]
pub enum ChatCommand {
    Prompt {
        model: String,
        temperature: f32,
        context: Vec<ChatMessage>,
        user_text: String,
    },
    ListModels,
    Pull {
        name: String,
    },
    Shutdown,
}

/// A command plus the token that stops it.
#[derive(Debug)]
struct Job {
    command: ChatCommand,
    cancel: CancellationToken,
}

/// UI-side handle to the runner task.
#[derive(Debug, Clone)]
pub struct ChatHandle {
    cmd_tx: mpsc::UnboundedSender<Job>,
    /// Token of the latest prompt. Each prompt gets a fresh one.
    generation: Arc<Mutex<CancellationToken>>,
}

impl ChatHandle {
    pub fn send(&self, command: ChatCommand) {
        let cancel = if matches!(command, ChatCommand::Prompt { .. }) {
            let token = CancellationToken::new();
            *self.generation.lock() = token.clone();
            token
        } else {
            self.generation.lock().clone()
        };

        if self.cmd_tx.send(Job { command, cancel }).is_err() {
            warn!("chat runner is gone, dropping command");
        }
    }

    /// Stops the generation in flight, if any.
    pub fn cancel(&self) {
        self.generation.lock().cancel();
    }
}

/// Owns the model backend and streams replies back to the UI task as
/// [`AppEvent`]s.
pub struct ChatRunner {
    backend: Arc<dyn ChatBackend>,
    cmd_rx: mpsc::UnboundedReceiver<Job>,
    event_tx: mpsc::UnboundedSender<AppEvent>,
}

impl ChatRunner {
    #[must_use]
    pub fn new(
        backend: Arc<dyn ChatBackend>,
        event_tx: mpsc::UnboundedSender<AppEvent>,
    ) -> (Self, ChatHandle) {
        let (cmd_tx, cmd_rx) = mpsc::unbounded_channel();
        let runner = Self {
            backend,
            cmd_rx,
            event_tx,
        };
        let handle = ChatHandle {
            cmd_tx,
            generation: Arc::new(Mutex::new(CancellationToken::new())),
        };
        (runner, handle)
    }

    pub async fn run(mut self) {
        while let Some(Job { command, cancel }) = self.cmd_rx.recv().await {
            match command {
                ChatCommand::Prompt {
                    model,
                    temperature,
                    context,
                    user_text,
                } => {
                    self.stream_reply(&model, temperature, &context, &user_text, &cancel)
                        .await;
                }
                ChatCommand::ListModels => self.spawn_list_models(),
                ChatCommand::Pull { name } => self.spawn_pull(name),
                ChatCommand::Shutdown => {
                    info!("chat runner shutting down");
                    break;
                }
            }
        }
    }

    async fn stream_reply(
        &self,
        model: &str,
        temperature: f32,
        context: &[ChatMessage],
        user_text: &str,
        cancel: &CancellationToken,
    ) {
        let mut stream = match self
            .backend
            .send_prompt(model, temperature, context, user_text)
            .await
        {
            Ok(stream) => stream,
            Err(e) => {
                let _ = self.event_tx.send(AppEvent::chat_error(&e));
                return;
            }
        };

        let mut chunks = 0usize;
        loop {
            tokio::select! {
                biased;
                () = cancel.cancelled() => {
                    info!(chunks, "generation cancelled");
                    let _ = self.event_tx.send(AppEvent::Complete { cancelled: true });
                    return;
                }
                next = stream.next() => match next {
                    Some(Ok(text)) => {
                        chunks += 1;
                        let _ = self.event_tx.send(AppEvent::Chunk(text));
                    }
                    Some(Err(e)) => {
                        let _ = self.event_tx.send(AppEvent::chat_error(&e));
                        return;
                    }
                    None => break,
                },
            }
        }

        debug!(chunks, "generation complete");
        let _ = self.event_tx.send(AppEvent::Complete { cancelled: false });
    }

    fn spawn_list_models(&self) {
        let backend = Arc::clone(&self.backend);
        let tx = self.event_tx.clone();
        tokio::spawn(async move {
            let models = backend
                .list_local_models()
                .await
                .map_err(|e| e.to_string());
            let _ = tx.send(AppEvent::Models(models));
        });
    }

    fn spawn_pull(&self, name: String) {
        let backend = Arc::clone(&self.backend);
        let tx = self.event_tx.clone();
        tokio::spawn(async move {
            let mut progress = match backend.pull_model(&name).await {
                Ok(stream) => stream,
                Err(e) => {
                    let _ = tx.send(AppEvent::PullProgress {
                        model: name,
                        progress: crate::ollama::PullProgress::Failed(e.to_string()),
                    });
                    return;
                }
            };

            while let Some(update) = progress.next().await {
                if tx
                    .send(AppEvent::PullProgress {
                        model: name.clone(),
                        progress: update,
                    })
                    .is_err()
                {
                    break;
                }
            }
        });
    }
}
