use super::TuiApp;
use super::commands::{SlashCommand, help_text};
use crate::core::types::{Author, MessageId};
use crate::tui::chat_runner::ChatCommand;
use crate::ollama::PullProgress;
use tracing::info;

impl TuiApp {
    pub(super) fn handle_slash_command(&mut self, command: &str) {
        match SlashCommand::parse(command) {
            SlashCommand::Help => {
                self.state.add_system_message(help_text());
            }
            SlashCommand::Exit => {
                self.state.quit();
            }
            SlashCommand::Clear => {
                self.state.clear_messages();
            }
            SlashCommand::New => {
                if self.refuse_while_streaming() {
                    return;
                }
                self.state.active_conversation = None;
                self.state.clear_messages();
                self.state
                    .add_system_message("Started a new conversation.".to_string());
            }
            SlashCommand::List => self.list_conversations(),
            SlashCommand::Open(id) => {
                if !self.refuse_while_streaming() {
                    self.open_conversation(id);
                }
            }
            SlashCommand::Delete(id) => self.delete_conversation(id),
            SlashCommand::Rename(title) => self.rename_conversation(title),
            SlashCommand::Model => {
                self.chat.send(ChatCommand::ListModels);
            }
            SlashCommand::Pull(name) => {
                if let Some((current, _)) = &self.state.pull {
                    self.state
                        .add_system_message(format!("Already downloading {current}."));
                    return;
                }
                self.state.pull = Some((
                    name.clone(),
                    PullProgress::Status("starting".to_string()),
                ));
                self.chat.send(ChatCommand::Pull { name });
            }
            SlashCommand::Run(number) => match self.state.code_block(number).cloned() {
                Some(block) => self.state.show_confirm_run(number, block),
                None => self
                    .state
                    .add_error_message(format!("There is no code block [{number}].")),
            },
            SlashCommand::Exec(command) => {
                info!(command, "running command typed by the user");
                self.run_command(command);
            }
            SlashCommand::Remove(raw) => {
                match self.state.view(MessageId::new(raw)) {
                    Some(view) => view.request_delete(),
                    None => self
                        .state
                        .add_error_message(format!("There is no message #{raw}.")),
                }
            }
            SlashCommand::Usage(info) => {
                self.state.add_system_message(format!(
                    "Usage: {} - {}",
                    info.usage(),
                    info.description
                ));
            }
            SlashCommand::Unknown(cmd) => {
                self.state.add_system_message(format!(
                    "Unknown command: {cmd}. Type /help for available commands."
                ));
            }
        }
    }

    fn refuse_while_streaming(&mut self) -> bool {
        if self.state.is_streaming() {
            self.state.add_system_message(
                "A reply is still streaming. Press Esc to cancel it first.".to_string(),
            );
            return true;
        }
        false
    }

    fn list_conversations(&mut self) {
        let summaries = self.store.summaries();
        if summaries.is_empty() {
            self.state
                .add_system_message("No saved conversations yet.".to_string());
            return;
        }

        let active = self.state.active_conversation;
        let mut text = String::from("Saved conversations:");
        for summary in summaries {
            let marker = if Some(summary.id) == active { "*" } else { " " };
            text.push_str(&format!(
                "\n{marker} {:>3}  {}  ({}, {} messages)",
                summary.id, summary.title, summary.model, summary.messages
            ));
        }
        text.push_str("\nUse /open N to continue one.");
        self.state.add_system_message(text);
    }

    pub(super) fn open_conversation(&mut self, id: u64) {
        let Some(conversation) = self.store.get_conversation(id) else {
            self.state
                .add_error_message(format!("Conversation {id} not found."));
            return;
        };

        let views: Vec<_> = conversation
            .history
            .iter()
            .map(|entry| self.new_view(&entry.content, Author::from(entry.role), entry.message_id))
            .collect();
        let title = conversation.title.clone();
        let model = conversation.model.clone();

        self.state.clear_messages();
        self.state.active_conversation = Some(id);
        for view in views {
            self.state.add_message_view(view);
        }
        self.state
            .add_system_message(format!("Opened \"{title}\" ({model})."));
    }

    fn delete_conversation(&mut self, id: u64) {
        if self.state.active_conversation == Some(id) && self.refuse_while_streaming() {
            return;
        }
        if !self.store.delete_conversation(id) {
            self.state
                .add_error_message(format!("Conversation {id} not found."));
            return;
        }

        self.save_store();
        if self.state.active_conversation == Some(id) {
            self.state.active_conversation = None;
            self.state.clear_messages();
        }
        self.state
            .add_system_message(format!("Deleted conversation {id}."));
    }

    fn rename_conversation(&mut self, title: String) {
        let Some(id) = self.state.active_conversation else {
            self.state.add_error_message(
                "Nothing to rename yet. Send a message or /open a conversation first."
                    .to_string(),
            );
            return;
        };

        if self.store.rename(id, title.clone()) {
            self.save_store();
            self.state
                .add_system_message(format!("Renamed conversation to \"{title}\"."));
        }
    }
}
