use crate::exec::ExecutionResult;
use crate::render::MessageView;
use crate::ui::notice::MessageLevel;

/// One row group in the chat pane.
#[derive(Debug)]
pub enum ChatEntry {
    Message(MessageView),
    System {
        text: String,
        level: MessageLevel,
    },
    Execution {
        command: String,
        results: Vec<ExecutionResult>,
    },
}

impl ChatEntry {
    #[must_use]
    pub const fn as_message(&self) -> Option<&MessageView> {
        match self {
            Self::Message(view) => Some(view),
            _ => None,
        }
    }

    /// Code blocks this entry contributes to the chat-wide numbering.
    #[must_use]
    pub fn code_block_count(&self) -> usize {
        self.as_message()
            .map_or(0, |view| view.code_blocks().count())
    }
}
