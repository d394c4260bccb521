use ollama_chat::core::Role;
use ollama_chat::store::{ConversationStore, HistoryEntry, default_title};

#[test]
fn deleting_a_message_removes_exactly_one_entry() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("conversations.json");

    let mut store = ConversationStore::new(&path);
    let first_user = store.next_message_id();
    let id = store.add_conversation(
        "llama3",
        default_title("list my files"),
        HistoryEntry::user("list my files").with_id(first_user),
        HistoryEntry::assistant("```\nls\n```"),
    );
    assert!(store.update_conversation(
        id,
        HistoryEntry::user("list my files"),
        HistoryEntry::assistant("done"),
    ));
    store.save().unwrap();

    assert!(store.delete_message(id, first_user));
    assert!(!store.delete_message(id, first_user));
    store.save().unwrap();

    let reloaded = ConversationStore::load(&path);
    let history = &reloaded.get_conversation(id).unwrap().history;
    assert_eq!(history.len(), 3);
    assert_eq!(history[0].role, Role::Assistant);
    assert_eq!(history[1].content, "list my files");
}

#[test]
fn saved_file_is_indented_and_keeps_unicode() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("conversations.json");

    let mut store = ConversationStore::new(&path);
    store.add_conversation(
        "llama3",
        "Grüße",
        HistoryEntry::user("héllo"),
        HistoryEntry::assistant("¡hola!"),
    );
    store.save().unwrap();

    let raw = std::fs::read_to_string(&path).unwrap();
    assert!(raw.contains("Grüße"));
    assert!(raw.contains("\n        \"id\": 1"));
    assert!(!raw.contains("message_id"));
}

#[test]
fn corrupt_file_loads_as_empty() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("conversations.json");
    std::fs::write(&path, "{ not json").unwrap();

    assert!(ConversationStore::load(&path).is_empty());
}

#[test]
fn titles_are_cut_at_a_word_boundary() {
    assert_eq!(default_title("short"), "short");
    assert_eq!(
        default_title("how do I find large files on linux"),
        "how do I find large..."
    );
    assert_eq!(default_title("   "), "New conversation");
}
