//! Terminal chat client for a local Ollama server.
//!
//! Replies stream into [`render::MessageView`]s that split fenced code out
//! of the prose once each fence closes. Shell blocks can be run on the host
//! through [`exec::CommandRunner`], and every exchange is kept in a
//! [`store::ConversationStore`].

pub mod config;
pub mod core;
pub mod exec;
pub mod logging;
pub mod ollama;
pub mod render;
pub mod store;
pub mod tui;
pub mod ui;
