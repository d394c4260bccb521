mod handler;
mod loops;

pub use handler::TuiDeleteHandler;
pub use loops::{terminal_event_loop, tick_loop};

use crate::core::types::MessageId;
use crate::exec::ExecutionResult;
use crate::ollama::{LocalModel, ProviderError, PullProgress};
use crossterm::event::KeyEvent;
use std::time::Duration;

pub const POLL_TIMEOUT: Duration = Duration::from_millis(100);
pub const TICK_INTERVAL: Duration = Duration::from_millis(16);
pub const SCROLL_DELTA: i16 = 3;

/// Everything the UI task reacts to. Workers never touch view state; they
/// post one of these instead.
#[derive(Debug)]
pub enum AppEvent {
    Input(KeyEvent),
    Paste(String),
    MouseScroll(i16),
    Resize(u16, u16),
    Tick,
    Chunk(String),
    Complete {
        cancelled: bool,
    },
    ChatError {
        message: String,
        /// The server could not be reached at all.
        unreachable: bool,
    },
    /// The reformat delay for a message has elapsed.
    ReformatCheck(MessageId),
    ExecutionFinished {
        command: String,
        results: Vec<ExecutionResult>,
    },
    Models(Result<Vec<LocalModel>, String>),
    PullProgress {
        model: String,
        progress: PullProgress,
    },
    DeleteMessage(MessageId),
}

impl AppEvent {
    #[must_use]
    pub fn chat_error(error: &ProviderError) -> Self {
        Self::ChatError {
            message: error.to_string(),
            unreachable: error.is_unreachable(),
        }
    }
}
