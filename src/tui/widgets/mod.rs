pub mod chat;
pub mod input;

pub use chat::{ChatEntry, ChatWidget, ScrollState};
pub use input::{InputAction, InputWidget};
