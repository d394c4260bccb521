mod commands;
mod render;
mod slash;
mod terminal;

pub use commands::{SLASH_COMMANDS, SlashCommand, SlashCommandInfo, help_text};

use crate::config::{AppConfig, ConfigEvent, ConfigEventSender};
use crate::core::error::Result;
use crate::core::types::{Author, MessageId};
use crate::exec::{CommandRunner, ExecutionPolicy};
use crate::ollama::PullProgress;
use crate::render::{CodeBlock, DeleteHandler, MessageView};
use crate::store::{ConversationStore, HistoryEntry, default_title};
use crate::tui::chat_runner::{ChatCommand, ChatHandle};
use crate::tui::events::{AppEvent, terminal_event_loop, tick_loop};
use crate::tui::layout::calculate_layout;
use crate::tui::state::{AppState, Modal, ModalOutcome, PendingExchange};
use crate::tui::widgets::{ChatWidget, InputAction, InputWidget};
use crate::ui::notice::MessageLevel;
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use ratatui::Terminal;
use ratatui::backend::CrosstermBackend;
use std::io;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

use render::{HeaderInfo, render_confirm_run_modal, render_header, render_model_picker_modal, render_status};
use terminal::{reset_terminal, restore_terminal, setup_terminal};

/// Per-session chat settings taken from the loaded configuration.
#[derive(Debug, Clone)]
pub struct SessionSettings {
    pub model: Option<String>,
    pub server_url: String,
    pub temperature: f32,
    pub system_prompt: Option<String>,
    pub policy: ExecutionPolicy,
    pub reformat_delay: Duration,
}

impl From<&AppConfig> for SessionSettings {
    fn from(config: &AppConfig) -> Self {
        Self {
            model: config.model.clone(),
            server_url: config.server_url.clone(),
            temperature: config.temperature,
            system_prompt: config.system_prompt.clone(),
            policy: ExecutionPolicy {
                auto_execute: config.execution.auto_execute,
            },
            reformat_delay: config.reformat_delay(),
        }
    }
}

pub struct TuiApp {
    chat: ChatHandle,
    runner: Arc<CommandRunner>,
    store: ConversationStore,
    settings: SessionSettings,
    delete_handler: Arc<dyn DeleteHandler>,
    state: AppState,
    input_widget: InputWidget<'static>,
    event_rx: mpsc::UnboundedReceiver<AppEvent>,
    event_tx: mpsc::UnboundedSender<AppEvent>,
    config_event_tx: Option<ConfigEventSender>,
    terminal: Terminal<CrosstermBackend<io::Stdout>>,
}

/// Everything the UI task needs besides the terminal itself.
pub struct TuiParts {
    pub chat: ChatHandle,
    pub runner: Arc<CommandRunner>,
    pub store: ConversationStore,
    pub settings: SessionSettings,
    pub delete_handler: Arc<dyn DeleteHandler>,
    pub event_tx: mpsc::UnboundedSender<AppEvent>,
    pub event_rx: mpsc::UnboundedReceiver<AppEvent>,
    pub config_event_tx: Option<ConfigEventSender>,
}

impl TuiApp {
    pub fn new(parts: TuiParts) -> Result<Self> {
        let terminal = setup_terminal()?;

        Ok(Self {
            chat: parts.chat,
            runner: parts.runner,
            store: parts.store,
            settings: parts.settings,
            delete_handler: parts.delete_handler,
            state: AppState::new(),
            input_widget: InputWidget::new(),
            event_rx: parts.event_rx,
            event_tx: parts.event_tx,
            config_event_tx: parts.config_event_tx,
            terminal,
        })
    }

    pub async fn run(&mut self, open_conversation: Option<u64>) -> Result<()> {
        let tx1 = self.event_tx.clone();
        let tx2 = self.event_tx.clone();

        tokio::spawn(async move {
            let _ = terminal_event_loop(tx1).await;
        });

        tokio::spawn(async move {
            tick_loop(tx2).await;
        });

        if let Some(id) = open_conversation {
            self.open_conversation(id);
        }

        if self.settings.model.is_none() {
            self.state
                .add_system_message("No model configured. Pick one from the list.".to_string());
            self.chat.send(ChatCommand::ListModels);
        }

        while !self.state.should_quit {
            let header = HeaderInfo {
                model: self.settings.model.clone(),
                server_url: self.settings.server_url.clone(),
                conversation: self
                    .state
                    .active_conversation
                    .and_then(|id| self.store.get_conversation(id))
                    .map(|c| (c.id, c.title.clone())),
            };
            let is_processing = self.state.is_processing();
            let elapsed = self.state.elapsed();
            let spinner_frame = self.state.spinner_frame();
            let input_lines = self.input_widget.line_count();

            self.terminal.draw(|f| {
                let layout = calculate_layout(f.area(), input_lines);

                render_header(f, layout.header, &header);

                let chat_widget =
                    ChatWidget::new(&self.state.entries, &mut self.state.scroll, spinner_frame);
                chat_widget.render(layout.chat, f.buffer_mut());

                self.input_widget.render(layout.input, f, is_processing);

                render_status(
                    f,
                    layout.status,
                    is_processing,
                    elapsed,
                    spinner_frame,
                    self.state.pull.as_ref(),
                );

                match &self.state.modal {
                    Some(Modal::ModelPicker(picker)) => {
                        render_model_picker_modal(f, f.area(), picker);
                    }
                    Some(Modal::ConfirmRun(confirm)) => {
                        render_confirm_run_modal(f, f.area(), confirm);
                    }
                    None => {}
                }
            })?;

            if let Some(event) = self.event_rx.recv().await {
                self.handle_event(event);
            }
        }

        self.chat.cancel();
        self.chat.send(ChatCommand::Shutdown);

        restore_terminal(&mut self.terminal)?;

        Ok(())
    }

    fn handle_event(&mut self, event: AppEvent) {
        match event {
            AppEvent::Input(key) => {
                self.handle_key_input(key);
            }
            AppEvent::Paste(text) => {
                let action = self.input_widget.handle_paste(text);
                self.handle_input_action(action);
            }
            AppEvent::Resize(_w, _h) => {}
            AppEvent::MouseScroll(delta) => {
                if delta < 0 {
                    self.state.scroll_up(usize::from(delta.unsigned_abs()));
                } else {
                    self.state.scroll_down(usize::from(delta.unsigned_abs()));
                }
            }
            AppEvent::Tick => {
                self.state.tick();
            }
            AppEvent::Chunk(chunk) => {
                if let Some(id) = self.state.append_streaming(&chunk) {
                    self.schedule_reformat(id);
                }
            }
            AppEvent::ReformatCheck(id) => {
                let blocks = self.state.view_mut(id).map_or_else(Vec::new, |view| {
                    view.check_reformat();
                    view.take_pending_executions()
                });
                self.run_blocks(blocks);
            }
            AppEvent::Complete { cancelled } => {
                self.complete_exchange(cancelled);
            }
            AppEvent::ChatError {
                message,
                unreachable,
            } => {
                self.fail_exchange(&message, unreachable);
            }
            AppEvent::ExecutionFinished { command, results } => {
                self.state.add_execution(command, results);
            }
            AppEvent::Models(result) => match result {
                Ok(models) if models.is_empty() => {
                    self.state.add_system_message(
                        "No local models installed. Use /pull NAME to download one.".to_string(),
                    );
                }
                Ok(models) => {
                    self.state
                        .show_model_picker(&models, self.settings.model.as_deref());
                }
                Err(error) => {
                    self.state
                        .add_error_message(format!("Could not list models: {error}"));
                }
            },
            AppEvent::PullProgress { model, progress } => {
                self.handle_pull_progress(model, progress);
            }
            AppEvent::DeleteMessage(id) => {
                self.delete_message(id);
            }
        }
    }

    fn schedule_reformat(&self, id: MessageId) {
        let tx = self.event_tx.clone();
        let delay = self.settings.reformat_delay;
        tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            let _ = tx.send(AppEvent::ReformatCheck(id));
        });
    }

    fn new_view(&self, text: &str, author: Author, id: MessageId) -> MessageView {
        let mut view = MessageView::new(text, author, id).with_policy(self.settings.policy);
        view.set_delete_handler(Arc::clone(&self.delete_handler));
        view
    }

    fn submit_prompt(&mut self, text: String) {
        if self.state.is_streaming() {
            self.state.add_system_message(
                "A reply is still streaming. Press Esc to cancel it.".to_string(),
            );
            return;
        }

        let Some(model) = self.settings.model.clone() else {
            self.state.add_error_message(
                "No model selected. Use /model to pick one or /pull NAME to download one."
                    .to_string(),
            );
            return;
        };

        self.state.add_to_history(text.clone());

        let context = self.store.context_for(
            self.state.active_conversation,
            self.settings.system_prompt.as_deref(),
        );

        let user_id = self.store.next_message_id();
        let user_view = self.new_view(&text, Author::User, user_id);
        self.state.add_message_view(user_view);

        let assistant_id = self.store.next_message_id();
        let reply = self.new_view("", Author::Assistant, assistant_id);
        self.state.begin_streaming(
            PendingExchange {
                user_id,
                user_text: text.clone(),
                assistant_id,
            },
            reply,
        );

        debug!(%assistant_id, context = context.len(), "sending prompt");
        self.chat.send(ChatCommand::Prompt {
            model,
            temperature: self.settings.temperature,
            context,
            user_text: text,
        });
    }

    fn complete_exchange(&mut self, cancelled: bool) {
        let Some((pending, text)) = self.state.finalize_streaming() else {
            return;
        };

        let blocks = self
            .state
            .view_mut(pending.assistant_id)
            .map_or_else(Vec::new, MessageView::take_pending_executions);

        if cancelled {
            self.state.add_system_message_with_level(
                "Generation cancelled.".to_string(),
                MessageLevel::Warning,
            );
        }

        if text.trim().is_empty() {
            self.state.remove_message(pending.assistant_id);
            if !cancelled {
                self.state
                    .add_system_message("The model returned an empty reply.".to_string());
            }
            return;
        }

        self.persist_exchange(&pending, text);
        self.run_blocks(blocks);
    }

    fn fail_exchange(&mut self, error: &str, unreachable: bool) {
        warn!(error, unreachable, "chat request failed");
        if let Some((pending, text)) = self.state.finalize_streaming()
            && text.trim().is_empty()
        {
            self.state.remove_message(pending.assistant_id);
        }

        let message = if unreachable {
            format!(
                "Error: {error}. Is the Ollama server running at {}?",
                self.settings.server_url
            )
        } else {
            format!("Error: {error}")
        };
        self.state.add_error_message(message);
    }

    fn persist_exchange(&mut self, pending: &PendingExchange, reply: String) {
        let user = HistoryEntry::user(pending.user_text.clone()).with_id(pending.user_id);
        let assistant = HistoryEntry::assistant(reply).with_id(pending.assistant_id);

        let updated = self
            .state
            .active_conversation
            .is_some_and(|id| self.store.update_conversation(id, user.clone(), assistant.clone()));

        if !updated {
            let model = self.settings.model.clone().unwrap_or_default();
            let id = self.store.add_conversation(
                model,
                default_title(&pending.user_text),
                user,
                assistant,
            );
            self.state.active_conversation = Some(id);
        }

        self.save_store();
    }

    fn save_store(&mut self) {
        if let Err(e) = self.store.save() {
            warn!(error = %e, "failed to save conversations");
            self.state
                .add_error_message(format!("Could not save conversations: {e}"));
        }
    }

    fn run_blocks(&self, blocks: Vec<CodeBlock>) {
        for block in blocks {
            info!(language = %block.language, "auto-executing shell block");
            self.run_command(block.content);
        }
    }

    fn run_command(&self, command: String) {
        let runner = Arc::clone(&self.runner);
        let tx = self.event_tx.clone();
        tokio::spawn(async move {
            let results = runner.execute(command.as_str()).await;
            let _ = tx.send(AppEvent::ExecutionFinished { command, results });
        });
    }

    fn delete_message(&mut self, id: MessageId) {
        if self
            .state
            .pending
            .as_ref()
            .is_some_and(|p| p.assistant_id == id || p.user_id == id)
        {
            self.state
                .add_system_message("Cannot delete a message while its reply streams.".to_string());
            return;
        }

        if !self.state.remove_message(id) {
            return;
        }

        if let Some(conversation) = self.state.active_conversation
            && self.store.delete_message(conversation, id)
        {
            self.save_store();
        }
        self.state.add_system_message(format!("Deleted message #{id}."));
    }

    fn handle_pull_progress(&mut self, model: String, progress: PullProgress) {
        match progress {
            PullProgress::Success => {
                self.state.pull = None;
                self.state
                    .add_system_message(format!("Downloaded {model}."));
                if self.settings.model.is_none() {
                    self.select_model(model);
                }
            }
            PullProgress::Failed(error) => {
                self.state.pull = None;
                self.state
                    .add_error_message(format!("Could not download {model}: {error}"));
            }
            progress => {
                self.state.pull = Some((model, progress));
            }
        }
    }

    fn select_model(&mut self, model: String) {
        self.state.add_system_message(format!("Using model {model}."));

        if let Some(ref tx) = self.config_event_tx {
            let _ = tx.send(ConfigEvent::ModelChanged {
                model: model.clone(),
            });
        }
        self.settings.model = Some(model);
    }

    fn handle_key_input(&mut self, key: KeyEvent) {
        if key.code == KeyCode::Char('c') && key.modifiers.contains(KeyModifiers::CONTROL) {
            if self.state.has_modal() {
                self.state.dismiss_modal();
                return;
            }
            if self.state.is_streaming() {
                self.chat.cancel();
                return;
            }
            if !self.input_widget.is_empty() {
                self.input_widget.clear();
                return;
            }
            self.state.quit();
            return;
        }

        if key.code == KeyCode::Char('d') && key.modifiers.contains(KeyModifiers::CONTROL) {
            if self.input_widget.is_empty() && !self.state.has_modal() {
                self.state.quit();
            }
            return;
        }

        if let Some(outcome) = self.state.modal_key(key) {
            match outcome {
                ModalOutcome::ModelChosen(model) => self.select_model(model),
                ModalOutcome::RunConfirmed(block) => self.run_command(block.content),
                ModalOutcome::Open | ModalOutcome::Dismissed => {}
            }
            return;
        }

        if key.code == KeyCode::Char('l') && key.modifiers.contains(KeyModifiers::CONTROL) {
            self.state.clear_messages();
            return;
        }

        match key.code {
            KeyCode::PageUp => {
                self.state.scroll_up(10);
                return;
            }
            KeyCode::PageDown => {
                self.state.scroll_down(10);
                return;
            }
            KeyCode::Home if key.modifiers.contains(KeyModifiers::CONTROL) => {
                self.state.scroll_to_top();
                return;
            }
            KeyCode::End if key.modifiers.contains(KeyModifiers::CONTROL) => {
                self.state.scroll_to_bottom();
                return;
            }
            _ => {}
        }

        let action = self.input_widget.handle_key(key);
        self.handle_input_action(action);
    }

    fn handle_input_action(&mut self, action: InputAction) {
        match action {
            InputAction::Continue | InputAction::Clear => {}

            InputAction::Submit(text) => {
                if text.starts_with('/') {
                    self.state.add_to_history(text.clone());
                    self.handle_slash_command(&text);
                } else {
                    self.submit_prompt(text);
                }
            }

            InputAction::HistoryPrev => {
                let current = self.input_widget.text();
                if let Some(text) = self.state.history_prev(&current) {
                    self.input_widget.set_text(&text);
                }
            }

            InputAction::HistoryNext => {
                if let Some(text) = self.state.history_next() {
                    self.input_widget.set_text(&text);
                }
            }

            InputAction::Cancel => {
                if self.state.is_streaming() {
                    self.chat.cancel();
                }
            }
        }
    }
}

impl Drop for TuiApp {
    fn drop(&mut self) {
        reset_terminal();
    }
}
