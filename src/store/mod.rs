//! JSON-backed conversation list.

mod conversation;

pub use conversation::{
    Conversation, ConversationSummary, HistoryEntry, UNTITLED, default_title,
};

use serde::Deserialize;
use serde::Serialize;
use serde_json::ser::PrettyFormatter;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

use crate::core::types::{ChatMessage, MessageId, MessageIdAllocator};

pub const DEFAULT_FILE_NAME: &str = "conversations.json";

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

pub type StoreResult<T> = std::result::Result<T, StoreError>;

/// Shape of a conversation on disk before individual history entries are
/// validated.
#[derive(Deserialize)]
struct RawConversation {
    id: u64,
    model: String,
    title: String,
    #[serde(default)]
    system: Option<String>,
    #[serde(default)]
    history: Vec<serde_json::Value>,
}

pub struct ConversationStore {
    path: PathBuf,
    conversations: Vec<Conversation>,
    ids: MessageIdAllocator,
}

impl ConversationStore {
    /// An empty store that will save to `path`.
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            conversations: Vec::new(),
            ids: MessageIdAllocator::new(),
        }
    }

    /// Reads the store at `path`. A missing or unreadable file yields an
    /// empty store; malformed conversations and entries are skipped.
    #[must_use]
    pub fn load(path: impl Into<PathBuf>) -> Self {
        let mut store = Self::new(path);

        let content = match fs::read_to_string(&store.path) {
            Ok(content) => content,
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                debug!(path = %store.path.display(), "no conversation file yet");
                return store;
            }
            Err(e) => {
                warn!(path = %store.path.display(), error = %e, "failed to read conversations");
                return store;
            }
        };

        let values: Vec<serde_json::Value> = match serde_json::from_str(&content) {
            Ok(values) => values,
            Err(e) => {
                warn!(path = %store.path.display(), error = %e, "conversation file is not a JSON array");
                return store;
            }
        };

        for value in values {
            match serde_json::from_value::<RawConversation>(value) {
                Ok(raw) => {
                    let conversation = store.validate(raw);
                    store.conversations.push(conversation);
                }
                Err(e) => warn!(error = %e, "skipping malformed conversation"),
            }
        }

        info!(count = store.conversations.len(), "loaded conversations");
        store
    }

    fn validate(&self, raw: RawConversation) -> Conversation {
        let mut conversation = Conversation::new(raw.id, raw.model, raw.title);
        conversation.system = raw.system;

        for value in raw.history {
            match serde_json::from_value::<HistoryEntry>(value) {
                Ok(entry) => conversation
                    .history
                    .push(entry.with_id(self.ids.next_id())),
                Err(e) => warn!(conversation = raw.id, error = %e, "skipping malformed history entry"),
            }
        }

        conversation
    }

    /// Writes all conversations as a 4-space indented JSON array through a
    /// temporary file and rename.
    pub fn save(&self) -> StoreResult<()> {
        if let Some(parent) = self.path.parent()
            && !parent.as_os_str().is_empty()
        {
            fs::create_dir_all(parent)?;
        }

        let mut buffer = Vec::new();
        let formatter = PrettyFormatter::with_indent(b"    ");
        let mut serializer = serde_json::Serializer::with_formatter(&mut buffer, formatter);
        self.conversations.serialize(&mut serializer)?;

        let temp_path = self.path.with_extension("json.tmp");
        fs::write(&temp_path, &buffer)?;
        fs::rename(&temp_path, &self.path)?;

        debug!(path = %self.path.display(), count = self.conversations.len(), "saved conversations");
        Ok(())
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    #[must_use]
    pub fn conversations(&self) -> &[Conversation] {
        &self.conversations
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.conversations.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.conversations.is_empty()
    }

    /// Allocates a session-unique id for a message that will be stored here.
    pub fn next_message_id(&self) -> MessageId {
        self.ids.next_id()
    }

    fn stamp(&self, entry: HistoryEntry) -> HistoryEntry {
        if entry.message_id == MessageId::default() {
            entry.with_id(self.ids.next_id())
        } else {
            entry
        }
    }

    /// Starts a conversation with its first exchange and returns its id.
    pub fn add_conversation(
        &mut self,
        model: impl Into<String>,
        title: impl Into<String>,
        user: HistoryEntry,
        assistant: HistoryEntry,
    ) -> u64 {
        let id = self.conversations.iter().map(|c| c.id).max().unwrap_or(0) + 1;

        let mut conversation = Conversation::new(id, model, title);
        conversation.history.push(self.stamp(user));
        conversation.history.push(self.stamp(assistant));
        self.conversations.push(conversation);

        info!(conversation = id, "added conversation");
        id
    }

    #[must_use]
    pub fn get_conversation(&self, id: u64) -> Option<&Conversation> {
        self.conversations.iter().find(|c| c.id == id)
    }

    fn get_mut(&mut self, id: u64) -> Option<&mut Conversation> {
        self.conversations.iter_mut().find(|c| c.id == id)
    }

    /// Appends an exchange. Returns `false` when the conversation is unknown.
    pub fn update_conversation(
        &mut self,
        id: u64,
        user: HistoryEntry,
        assistant: HistoryEntry,
    ) -> bool {
        let user = self.stamp(user);
        let assistant = self.stamp(assistant);

        let Some(conversation) = self.get_mut(id) else {
            warn!(conversation = id, "update for unknown conversation");
            return false;
        };
        conversation.history.push(user);
        conversation.history.push(assistant);
        true
    }

    pub fn delete_conversation(&mut self, id: u64) -> bool {
        let before = self.conversations.len();
        self.conversations.retain(|c| c.id != id);
        let removed = self.conversations.len() != before;
        if removed {
            info!(conversation = id, "deleted conversation");
        }
        removed
    }

    /// Removes exactly one history entry.
    pub fn delete_message(&mut self, conversation: u64, message: MessageId) -> bool {
        let Some(conv) = self.get_mut(conversation) else {
            return false;
        };

        match conv.history.iter().position(|e| e.message_id == message) {
            Some(index) => {
                conv.history.remove(index);
                debug!(conversation, %message, "deleted message");
                true
            }
            None => false,
        }
    }

    pub fn rename(&mut self, id: u64, title: impl Into<String>) -> bool {
        match self.get_mut(id) {
            Some(conversation) => {
                conversation.title = title.into();
                true
            }
            None => false,
        }
    }

    #[must_use]
    pub fn summaries(&self) -> Vec<ConversationSummary> {
        self.conversations.iter().map(ConversationSummary::from).collect()
    }

    /// Prior turns of one conversation as model messages, led by the
    /// conversation's own system prompt or `fallback_system`.
    #[must_use]
    pub fn context_for(&self, id: Option<u64>, fallback_system: Option<&str>) -> Vec<ChatMessage> {
        let conversation = id.and_then(|id| self.get_conversation(id));

        let system = conversation
            .and_then(|c| c.system.as_deref())
            .or(fallback_system)
            .filter(|s| !s.trim().is_empty());

        let mut messages: Vec<ChatMessage> = system.map(ChatMessage::system).into_iter().collect();
        if let Some(conversation) = conversation {
            messages.extend(conversation.history.iter().map(HistoryEntry::to_message));
        }
        messages
    }
}

impl std::fmt::Debug for ConversationStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ConversationStore")
            .field("path", &self.path)
            .field("conversations", &self.conversations.len())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::types::Role;
    use tempfile::TempDir;

    fn store_in(dir: &TempDir) -> ConversationStore {
        ConversationStore::load(dir.path().join(DEFAULT_FILE_NAME))
    }

    #[test]
    fn missing_file_loads_empty() {
        let dir = TempDir::new().unwrap();
        let store = store_in(&dir);
        assert!(store.is_empty());
    }

    #[test]
    fn invalid_json_loads_empty() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join(DEFAULT_FILE_NAME);
        fs::write(&path, "{ not json").unwrap();

        assert!(ConversationStore::load(&path).is_empty());
    }

    #[test]
    fn malformed_entries_are_skipped() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join(DEFAULT_FILE_NAME);
        fs::write(
            &path,
            r#"[
                {"id": 1, "model": "llama3", "title": "ok",
                 "history": [{"role": "user", "content": "hi"}, {"role": "robot"}, 3]},
                {"title": "no id"}
            ]"#,
        )
        .unwrap();

        let store = ConversationStore::load(&path);
        assert_eq!(store.len(), 1);
        assert_eq!(store.conversations()[0].history.len(), 1);
    }

    #[test]
    fn ids_increment_from_max() {
        let dir = TempDir::new().unwrap();
        let mut store = store_in(&dir);

        let first = store.add_conversation("m", "a", HistoryEntry::user("q"), HistoryEntry::assistant("r"));
        let second = store.add_conversation("m", "b", HistoryEntry::user("q"), HistoryEntry::assistant("r"));
        assert_eq!((first, second), (1, 2));

        assert!(store.delete_conversation(1));
        let third = store.add_conversation("m", "c", HistoryEntry::user("q"), HistoryEntry::assistant("r"));
        assert_eq!(third, 3);
    }

    #[test]
    fn save_and_reload() {
        let dir = TempDir::new().unwrap();
        let mut store = store_in(&dir);
        let id = store.add_conversation(
            "llama3",
            default_title("Überprüfe die Dateien"),
            HistoryEntry::user("Überprüfe die Dateien"),
            HistoryEntry::assistant("```bash\nls\n```"),
        );
        assert!(store.update_conversation(id, HistoryEntry::user("danke"), HistoryEntry::assistant("bitte")));
        store.save().unwrap();

        let text = fs::read_to_string(store.path()).unwrap();
        assert!(text.contains("Überprüfe"));
        assert!(text.contains("\n    {\n        \"id\": 1,"));
        assert!(!text.contains("message_id"));

        let reloaded = store_in(&dir);
        let conversation = reloaded.get_conversation(id).unwrap();
        assert_eq!(conversation.history.len(), 4);
        assert_eq!(conversation.history[1].content, "```bash\nls\n```");
        assert_eq!(conversation.history[3].role, Role::Assistant);
    }

    #[test]
    fn delete_message_removes_exactly_one_entry() {
        let dir = TempDir::new().unwrap();
        let mut store = store_in(&dir);
        let id = store.add_conversation("m", "t", HistoryEntry::user("same"), HistoryEntry::assistant("same"));
        store.update_conversation(id, HistoryEntry::user("same"), HistoryEntry::assistant("same"));

        let target = store.get_conversation(id).unwrap().history[1].message_id;
        assert!(store.delete_message(id, target));
        assert!(!store.delete_message(id, target));
        store.save().unwrap();

        let reloaded = store_in(&dir);
        assert_eq!(reloaded.get_conversation(id).unwrap().history.len(), 3);
    }

    #[test]
    fn explicit_ids_are_kept() {
        let dir = TempDir::new().unwrap();
        let mut store = store_in(&dir);
        let user_id = store.next_message_id();
        let id = store.add_conversation(
            "m",
            "t",
            HistoryEntry::user("q").with_id(user_id),
            HistoryEntry::assistant("a"),
        );

        let conversation = store.get_conversation(id).unwrap();
        assert_eq!(conversation.history[0].message_id, user_id);
        assert_ne!(conversation.history[1].message_id, user_id);
    }

    #[test]
    fn rename_and_summaries() {
        let dir = TempDir::new().unwrap();
        let mut store = store_in(&dir);
        let id = store.add_conversation("m", "old", HistoryEntry::user("q"), HistoryEntry::assistant("a"));

        assert!(store.rename(id, "new"));
        assert!(!store.rename(99, "x"));

        let summaries = store.summaries();
        assert_eq!(summaries[0].title, "new");
        assert_eq!(summaries[0].messages, 2);
    }

    #[test]
    fn context_uses_active_conversation_only() {
        let dir = TempDir::new().unwrap();
        let mut store = store_in(&dir);
        let a = store.add_conversation("m", "a", HistoryEntry::user("qa"), HistoryEntry::assistant("ra"));
        store.add_conversation("m", "b", HistoryEntry::user("qb"), HistoryEntry::assistant("rb"));

        let context = store.context_for(Some(a), Some("be brief"));
        assert_eq!(context.len(), 3);
        assert_eq!(context[0], ChatMessage::system("be brief"));
        assert_eq!(context[1].content, "qa");

        assert_eq!(store.context_for(None, None), Vec::new());
        assert_eq!(store.context_for(None, Some("  ")), Vec::new());
    }

    #[test]
    fn update_unknown_conversation_fails() {
        let dir = TempDir::new().unwrap();
        let mut store = store_in(&dir);
        assert!(!store.update_conversation(5, HistoryEntry::user("q"), HistoryEntry::assistant("a")));
    }
}
