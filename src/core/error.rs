use thiserror::Error;

use crate::ollama::ProviderError;
use crate::store::StoreError;

/// Top-level failure reported by the binary as `✗ <message>`.
#[derive(Error, Debug)]
pub enum AppError {
    #[error("Ollama: {0}")]
    Provider(#[from] ProviderError),

    #[error("conversation store: {0}")]
    Store(#[from] StoreError),

    #[error("no conversation with id {0}")]
    ConversationNotFound(u64),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("configuration: {0}")]
    Config(String),

    #[error("terminal: {0}")]
    Terminal(String),
}

pub type Result<T> = std::result::Result<T, AppError>;
