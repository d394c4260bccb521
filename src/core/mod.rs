pub mod error;
pub mod types;

pub use error::{AppError, Result};
pub use types::{Author, ChatMessage, MessageId, Role};
