use serde::{Deserialize, Serialize};

use crate::core::types::{ChatMessage, MessageId, Role};

/// Title used when the first user message is empty.
pub const UNTITLED: &str = "New conversation";

const TITLE_LIMIT: usize = 24;
const TITLE_CUT: usize = 23;

/// One persisted turn. The `message_id` lives only for the session and is
/// assigned by the store on load or insert.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HistoryEntry {
    pub role: Role,
    pub content: String,
    #[serde(skip)]
    pub message_id: MessageId,
}

impl HistoryEntry {
    #[must_use]
    pub fn new(role: Role, content: impl Into<String>) -> Self {
        Self {
            role,
            content: content.into(),
            message_id: MessageId::default(),
        }
    }

    #[must_use]
    pub fn user(content: impl Into<String>) -> Self {
        Self::new(Role::User, content)
    }

    #[must_use]
    pub fn assistant(content: impl Into<String>) -> Self {
        Self::new(Role::Assistant, content)
    }

    #[must_use]
    pub const fn with_id(mut self, id: MessageId) -> Self {
        self.message_id = id;
        self
    }

    #[must_use]
    pub fn to_message(&self) -> ChatMessage {
        ChatMessage::new(self.role, self.content.clone())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Conversation {
    pub id: u64,
    pub model: String,
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub system: Option<String>,
    #[serde(default)]
    pub history: Vec<HistoryEntry>,
}

impl Conversation {
    #[must_use]
    pub fn new(id: u64, model: impl Into<String>, title: impl Into<String>) -> Self {
        Self {
            id,
            model: model.into(),
            title: title.into(),
            system: None,
            history: Vec::new(),
        }
    }

    #[must_use]
    pub fn entry(&self, id: MessageId) -> Option<&HistoryEntry> {
        self.history.iter().find(|e| e.message_id == id)
    }
}

/// Listing row for a conversation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConversationSummary {
    pub id: u64,
    pub title: String,
    pub model: String,
    pub messages: usize,
}

impl From<&Conversation> for ConversationSummary {
    fn from(conversation: &Conversation) -> Self {
        Self {
            id: conversation.id,
            title: conversation.title.clone(),
            model: conversation.model.clone(),
            messages: conversation.history.len(),
        }
    }
}

/// Derives a title from the first user message.
///
/// Inputs longer than 24 characters are cut to 23, then back to the last
/// space if there is one, and get a `...` suffix.
#[must_use]
pub fn default_title(user_input: &str) -> String {
    let input = user_input.trim();
    if input.is_empty() {
        return UNTITLED.to_string();
    }

    if input.chars().count() <= TITLE_LIMIT {
        return input.to_string();
    }

    let cut: String = input.chars().take(TITLE_CUT).collect();
    let head = match cut.rfind(' ') {
        Some(pos) if pos > 0 => cut[..pos].trim_end(),
        _ => cut.as_str(),
    };

    format!("{head}...")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn short_input_is_kept() {
        assert_eq!(default_title("List my files"), "List my files");
        assert_eq!(default_title("exactly twenty-four char"), "exactly twenty-four char");
    }

    #[test]
    fn long_input_is_cut_at_last_space() {
        assert_eq!(
            default_title("How do I list hidden files in a directory?"),
            "How do I list hidden..."
        );
    }

    #[test]
    fn long_word_without_space_is_cut_hard() {
        assert_eq!(
            default_title("abcdefghijklmnopqrstuvwxyz"),
            "abcdefghijklmnopqrstuvw..."
        );
    }

    #[test]
    fn empty_input_gets_placeholder() {
        assert_eq!(default_title("   "), UNTITLED);
    }

    #[test]
    fn multibyte_input_does_not_split_characters() {
        let title = default_title("ééééééééééééééééééééééééééé");
        assert!(title.ends_with("..."));
        assert_eq!(title.chars().count(), 26);
    }

    #[test]
    fn message_id_is_not_serialized() {
        let entry = HistoryEntry::user("hi").with_id(MessageId::new(9));
        let json = serde_json::to_string(&entry).unwrap();
        assert_eq!(json, r#"{"role":"user","content":"hi"}"#);
    }
}
