pub mod app;
pub mod chat_runner;
pub mod events;
pub mod layout;
pub mod state;
pub mod widgets;

pub use app::{SessionSettings, TuiApp, TuiParts};
pub use chat_runner::{ChatCommand, ChatHandle, ChatRunner};
pub use events::TuiDeleteHandler;

use crate::config::{AppConfig, ConfigEventHandler, ConfigPersister};
use crate::core::error::Result;
use crate::exec::{CommandRunner, ProcessBridge};
use crate::ollama::ChatBackend;
use crate::store::ConversationStore;
use std::path::PathBuf;
use std::sync::Arc;
use tokio::sync::mpsc;
use tracing::{info, warn};

/// Runs the interactive chat until the user quits. Model choices are
/// saved to `config_path` when there is one.
pub async fn run_tui(
    config: &AppConfig,
    config_path: Option<PathBuf>,
    backend: Arc<dyn ChatBackend>,
    open_conversation: Option<u64>,
) -> Result<()> {
    let (event_tx, event_rx) = mpsc::unbounded_channel();

    let config_event_tx = if let Some(path) = config_path {
        let (handler, tx) = ConfigEventHandler::new(Arc::new(ConfigPersister::new(path)));
        tokio::spawn(handler.run());
        Some(tx)
    } else {
        warn!("no config directory, model selection will not be persisted");
        None
    };

    let (runner, chat) = ChatRunner::new(backend, event_tx.clone());
    tokio::spawn(runner.run());

    let bridge = ProcessBridge::new(config.execution.host_bridge);
    info!(escapes_sandbox = bridge.escapes_sandbox(), "command bridge ready");
    let command_runner = CommandRunner::new(Arc::new(bridge)).with_timeouts(
        config.execution.command_timeout(),
        config.execution.chained_timeout(),
    );

    let store = ConversationStore::load(config.conversations_path());

    let mut app = TuiApp::new(TuiParts {
        chat,
        runner: Arc::new(command_runner),
        store,
        settings: SessionSettings::from(config),
        delete_handler: Arc::new(TuiDeleteHandler::new(event_tx.clone())),
        event_tx,
        event_rx,
        config_event_tx,
    })?;
    app.run(open_conversation).await
}
