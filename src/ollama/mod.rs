//! Client for the Ollama HTTP API.

pub mod client;
pub mod error;
pub mod http;
pub mod mock;
pub mod ndjson;
pub mod types;

pub use client::{ChatBackend, DEFAULT_SERVER_URL, OllamaClient, PullStream, TextStream};
pub use error::ProviderError;
pub use mock::{MockBackend, MockReply};
pub use types::{LocalModel, PullProgress};
