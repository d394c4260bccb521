use crate::core::types::MessageId;
use crate::exec::ExecutionResult;
use crate::render::{CodeBlock, MessageView};
use crate::tui::widgets::{ChatEntry, ScrollState};
use crate::ui::notice::MessageLevel;
use tracing::{debug, error, warn};

use super::AppState;

impl AppState {
    pub fn add_message_view(&mut self, view: MessageView) {
        self.entries.push(ChatEntry::Message(view));
        self.scroll.follow();
    }

    pub fn add_system_message(&mut self, text: String) {
        self.add_system_message_with_level(text, MessageLevel::Info);
    }

    pub fn add_error_message(&mut self, text: String) {
        self.add_system_message_with_level(text, MessageLevel::Error);
    }

    pub fn add_system_message_with_level(&mut self, text: String, level: MessageLevel) {
        match level {
            MessageLevel::Info => debug!(%text, "notice"),
            MessageLevel::Warning => warn!(%text, "notice"),
            MessageLevel::Error => error!(%text, "notice"),
        }
        self.entries.push(ChatEntry::System { text, level });
        self.scroll.follow();
    }

    pub fn add_execution(&mut self, command: String, results: Vec<ExecutionResult>) {
        self.entries.push(ChatEntry::Execution { command, results });
        self.scroll.follow();
    }

    #[must_use]
    pub fn view(&self, id: MessageId) -> Option<&MessageView> {
        self.entries.iter().find_map(|entry| match entry {
            ChatEntry::Message(view) if view.message_id() == id => Some(view),
            _ => None,
        })
    }

    pub fn view_mut(&mut self, id: MessageId) -> Option<&mut MessageView> {
        self.entries.iter_mut().find_map(|entry| match entry {
            ChatEntry::Message(view) if view.message_id() == id => Some(view),
            _ => None,
        })
    }

    /// Drops the view for `id`. Returns whether one was shown.
    pub fn remove_message(&mut self, id: MessageId) -> bool {
        let before = self.entries.len();
        self.entries
            .retain(|entry| !matches!(entry, ChatEntry::Message(view) if view.message_id() == id));
        self.entries.len() != before
    }

    /// The `number`-th code block shown in the chat, counting from 1.
    #[must_use]
    pub fn code_block(&self, number: usize) -> Option<&CodeBlock> {
        number.checked_sub(1).and_then(|index| {
            self.entries
                .iter()
                .filter_map(ChatEntry::as_message)
                .flat_map(MessageView::code_blocks)
                .nth(index)
        })
    }

    /// Empties the chat. A reply that is still streaming stays on screen so
    /// its remaining chunks have somewhere to go.
    pub fn clear_messages(&mut self) {
        let streaming = self.pending.as_ref().map(|p| p.assistant_id);
        self.entries.retain(|entry| {
            matches!(entry, ChatEntry::Message(view) if Some(view.message_id()) == streaming)
        });
        self.scroll = ScrollState::new();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::types::Author;

    #[test]
    fn code_blocks_are_numbered_across_messages() {
        let mut state = AppState::new();
        state.add_message_view(MessageView::new(
            "```python\nprint(1)\n```",
            Author::Assistant,
            MessageId::new(1),
        ));
        state.add_system_message("note".into());
        state.add_message_view(MessageView::new(
            "Run ```\nls -la\n``` now",
            Author::Assistant,
            MessageId::new(2),
        ));

        assert_eq!(state.code_block(1).map(|b| b.language.as_str()), Some("python"));
        assert_eq!(state.code_block(2).map(|b| b.content.as_str()), Some("ls -la"));
        assert!(state.code_block(0).is_none());
        assert!(state.code_block(3).is_none());
    }

    #[test]
    fn remove_message_drops_only_that_view() {
        let mut state = AppState::new();
        state.add_message_view(MessageView::new("a", Author::User, MessageId::new(1)));
        state.add_message_view(MessageView::new("b", Author::Assistant, MessageId::new(2)));

        assert!(state.remove_message(MessageId::new(1)));
        assert!(!state.remove_message(MessageId::new(1)));
        assert!(state.view(MessageId::new(2)).is_some());
        assert_eq!(state.entries.len(), 1);
    }
}
