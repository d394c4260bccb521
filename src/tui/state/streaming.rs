use crate::core::types::MessageId;
use crate::render::{AppendOutcome, MessageView};

use super::AppState;

/// The exchange whose reply is streaming.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingExchange {
    pub user_id: MessageId,
    pub user_text: String,
    pub assistant_id: MessageId,
}

impl AppState {
    pub fn begin_streaming(&mut self, pending: PendingExchange, view: MessageView) {
        self.pending = Some(pending);
        self.add_message_view(view);
        self.start_processing();
    }

    /// Appends a chunk to the streaming reply. Returns the message id when a
    /// reformat check should be scheduled.
    pub fn append_streaming(&mut self, chunk: &str) -> Option<MessageId> {
        let id = self.pending.as_ref()?.assistant_id;
        let outcome = self.view_mut(id)?.append_text(chunk);

        (outcome == AppendOutcome::ScheduleCheck).then_some(id)
    }

    /// Ends the stream and hands back the exchange with the reply text.
    pub fn finalize_streaming(&mut self) -> Option<(PendingExchange, String)> {
        let pending = self.pending.take()?;
        self.stop_processing();

        let view = self.view_mut(pending.assistant_id)?;
        view.finalize();
        let text = view.current_text();
        Some((pending, text))
    }

    #[must_use]
    pub const fn is_streaming(&self) -> bool {
        self.pending.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::types::Author;
    use crate::render::ViewState;

    fn start(state: &mut AppState) {
        let pending = PendingExchange {
            user_id: MessageId::new(1),
            user_text: "hi".into(),
            assistant_id: MessageId::new(2),
        };
        state.begin_streaming(pending, MessageView::new("", Author::Assistant, MessageId::new(2)));
    }

    #[test]
    fn closing_fence_requests_check() {
        let mut state = AppState::new();
        start(&mut state);

        assert_eq!(state.append_streaming("```python\nprint(1)\n"), None);
        assert_eq!(state.append_streaming("```"), Some(MessageId::new(2)));
    }

    #[test]
    fn finalize_returns_text_and_freezes_view() {
        let mut state = AppState::new();
        start(&mut state);
        let _ = state.append_streaming("Hello ");
        let _ = state.append_streaming("world");

        let (pending, text) = state.finalize_streaming().expect("exchange");
        assert_eq!(pending.user_text, "hi");
        assert_eq!(text, "Hello world");
        assert!(!state.is_processing());
        assert_eq!(
            state.view(MessageId::new(2)).map(MessageView::state),
            Some(ViewState::Finalized)
        );
        assert!(state.finalize_streaming().is_none());
    }

    #[test]
    fn clearing_mid_stream_keeps_the_reply() {
        let mut state = AppState::new();
        state.add_message_view(MessageView::new("older", Author::User, MessageId::new(1)));
        start(&mut state);
        let _ = state.append_streaming("hello ");

        state.clear_messages();
        let _ = state.append_streaming("there");

        assert_eq!(state.entries.len(), 1);
        let (pending, text) = state.finalize_streaming().expect("exchange survives /clear");
        assert_eq!(pending.user_text, "hi");
        assert_eq!(text, "hello there");
    }

    #[test]
    fn chunks_without_stream_are_ignored() {
        let mut state = AppState::new();
        assert_eq!(state.append_streaming("x"), None);
    }
}
