//! Session manager behaviour against an in-memory store.

use neuralchat::chat::SessionManager;
use neuralchat::storage::{MemoryStore, SessionStore};
use neuralchat::types::{ChatSession, DEFAULT_SESSION_TITLE, NewMessage, Role};

fn manager_with(store: &MemoryStore) -> SessionManager {
    SessionManager::init(Box::new(store.clone()), None)
}

#[test]
fn test_restart_restores_sessions_and_current() {
    let store = MemoryStore::new();
    let first_id = {
        let mut manager = manager_with(&store);
        let first = manager.current_id().map(str::to_string).expect("current");
        manager.add_message(NewMessage::user("hello there"), None);
        manager.create_session();
        first
    };

    let restored = SessionManager::init(Box::new(store.clone()), Some(&first_id));
    assert_eq!(restored.sessions().len(), 2);
    assert_eq!(restored.current_id(), Some(first_id.as_str()));
    let current = restored.current().expect("current session");
    assert_eq!(current.title, "hello there");
    assert_eq!(current.messages[0].role, Role::User);
}

#[test]
fn test_unknown_initial_id_falls_back_to_first_stored() {
    let store = MemoryStore::new();
    store
        .save_all(&[ChatSession::new("b", 2), ChatSession::new("a", 1)])
        .expect("seed");
    let manager = SessionManager::init(Box::new(store), Some("missing"));
    assert_eq!(manager.current_id(), Some("b"));
}

#[test]
fn test_sessions_stay_newest_first_in_store() {
    let store = MemoryStore::new();
    let mut manager = manager_with(&store);
    let older = manager.current_id().map(str::to_string).expect("current");
    let newer = manager.create_session().id;

    let stored: Vec<String> = store.load().into_iter().map(|s| s.id).collect();
    assert_eq!(stored, vec![newer.clone(), older.clone()]);
    let listed: Vec<&str> = manager.sessions().iter().map(|s| s.id.as_str()).collect();
    assert_eq!(listed, vec![newer.as_str(), older.as_str()]);
}

#[test]
fn test_messages_keep_call_order() {
    let store = MemoryStore::new();
    let mut manager = manager_with(&store);
    for n in 0..25 {
        let message = if n % 2 == 0 {
            NewMessage::user(format!("message {n}"))
        } else {
            NewMessage::assistant(format!("message {n}"))
        };
        manager.add_message(message, None).expect("appended");
    }

    let contents: Vec<String> = manager
        .current()
        .expect("current")
        .messages
        .iter()
        .map(|m| m.content.clone())
        .collect();
    let expected: Vec<String> = (0..25).map(|n| format!("message {n}")).collect();
    assert_eq!(contents, expected);
    assert_eq!(store.load()[0].messages.len(), 25);
}

#[test]
fn test_message_for_new_session_lands_there_right_away() {
    let store = MemoryStore::new();
    let mut manager = manager_with(&store);
    let previous = manager.current_id().map(str::to_string).expect("current");

    let created = manager.create_session();
    manager
        .add_message(NewMessage::user("first words"), Some(&created.id))
        .expect("appended");

    let target = manager.session(&created.id).expect("created");
    assert_eq!(target.messages.len(), 1);
    assert_eq!(target.title, "first words");
    assert!(manager.session(&previous).expect("previous").messages.is_empty());
}

#[test]
fn test_update_with_unknown_id_leaves_session_untouched() {
    let store = MemoryStore::new();
    let mut manager = manager_with(&store);
    manager.add_message(NewMessage::user("q"), None);
    manager.add_message(NewMessage::assistant("a"), None);
    let before = manager.current().cloned().expect("current");
    let stored_before = store.load();

    assert!(!manager.update_message("msg-does-not-exist", "changed"));
    assert_eq!(manager.current(), Some(&before));
    assert_eq!(store.load(), stored_before);
}

#[test]
fn test_reply_lands_in_originating_session_after_switch() {
    let store = MemoryStore::new();
    let mut manager = manager_with(&store);
    let origin = manager.current_id().map(str::to_string).expect("current");
    manager.add_message(NewMessage::user("question"), None);

    let other = manager.create_session().id;
    assert_eq!(manager.current_id(), Some(other.as_str()));

    manager
        .add_message(NewMessage::assistant("answer"), Some(&origin))
        .expect("appended");
    assert_eq!(manager.session(&origin).map(|s| s.messages.len()), Some(2));
    assert!(manager.session(&other).expect("other").messages.is_empty());
}

#[test]
fn test_title_is_set_once_from_first_message() {
    let store = MemoryStore::new();
    let mut manager = manager_with(&store);
    assert_eq!(manager.current().expect("current").title, DEFAULT_SESSION_TITLE);

    let long = "x".repeat(80);
    manager.add_message(NewMessage::user(long.clone()), None);
    manager.add_message(NewMessage::assistant("reply"), None);

    let title = &manager.current().expect("current").title;
    assert_eq!(title, &"x".repeat(50));
}

#[test]
fn test_update_message_keeps_id_and_persists() {
    let store = MemoryStore::new();
    let mut manager = manager_with(&store);
    manager.add_message(NewMessage::user("q"), None);
    let answer = manager
        .add_message(NewMessage::assistant("first"), None)
        .expect("answer");

    assert!(manager.update_message(&answer.id, "second"));
    assert!(!manager.update_message("msg-nope", "ignored"));

    let stored = store.load();
    let message = &stored[0].messages[1];
    assert_eq!(message.id, answer.id);
    assert_eq!(message.content, "second");
}

#[test]
fn test_deleting_last_session_starts_fresh() {
    let store = MemoryStore::new();
    let mut manager = manager_with(&store);
    let only = manager.current_id().map(str::to_string).expect("current");

    manager.delete_session(&only);
    assert_eq!(manager.sessions().len(), 1);
    let fresh = manager.current_id().expect("fresh session");
    assert_ne!(fresh, only);
    assert!(store.load().iter().all(|s| s.id != only));
}

#[test]
fn test_deleting_other_session_keeps_current() {
    let store = MemoryStore::new();
    let mut manager = manager_with(&store);
    let older = manager.current_id().map(str::to_string).expect("current");
    let newer = manager.create_session().id;

    manager.delete_session(&older);
    assert_eq!(manager.current_id(), Some(newer.as_str()));
    assert_eq!(store.load().len(), 1);
}

#[test]
fn test_clear_history_wipes_the_store() {
    let store = MemoryStore::new();
    let mut manager = manager_with(&store);
    manager.add_message(NewMessage::user("a"), None);
    manager.create_session();

    let fresh = manager.clear_history();
    assert_eq!(manager.sessions().len(), 1);
    assert_eq!(manager.current_id(), Some(fresh.id.as_str()));
    let stored = store.load();
    assert_eq!(stored.len(), 1);
    assert_eq!(stored[0].id, fresh.id);
}

#[test]
fn test_corrupt_store_starts_with_one_session() {
    let store = MemoryStore::with_raw("[{broken");
    let manager = manager_with(&store);
    assert_eq!(manager.sessions().len(), 1);
    assert!(manager.current().expect("current").messages.is_empty());
}
