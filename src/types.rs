use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicU64, Ordering};
use time::OffsetDateTime;

/// Title every session carries until its first message arrives.
pub const DEFAULT_SESSION_TITLE: &str = "New Chat";

/// Number of characters of the first message used as the session title.
pub const TITLE_CHARS: usize = 50;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Assistant,
}

impl Role {
    pub fn as_str(self) -> &'static str {
        match self {
            Role::User => "user",
            Role::Assistant => "assistant",
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Message {
    pub id: String,
    pub role: Role,
    pub content: String,
    pub timestamp: i64,
}

/// A message as submitted by a caller, before id and timestamp are assigned.
#[derive(Clone, Debug, PartialEq)]
pub struct NewMessage {
    pub role: Role,
    pub content: String,
}

impl NewMessage {
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            content: content.into(),
        }
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: Role::Assistant,
            content: content.into(),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChatSession {
    pub id: String,
    pub title: String,
    pub messages: Vec<Message>,
    pub created_at: i64,
    pub updated_at: i64,
}

impl ChatSession {
    pub fn new(id: impl Into<String>, now: i64) -> Self {
        Self {
            id: id.into(),
            title: DEFAULT_SESSION_TITLE.to_string(),
            messages: Vec::new(),
            created_at: now,
            updated_at: now,
        }
    }

    pub fn last_message(&self) -> Option<&Message> {
        self.messages.last()
    }
}

/// One prior turn as sent along with a completion request.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct HistoryEntry {
    pub role: Role,
    pub content: String,
}

impl From<&Message> for HistoryEntry {
    fn from(msg: &Message) -> Self {
        Self {
            role: msg.role,
            content: msg.content.clone(),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchResult {
    pub id: String,
    pub title: String,
    pub description: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub matched_text: Option<String>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Person {
    pub id: String,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
}

/// Body posted for one chat turn.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ChatRequest {
    pub message: String,
    #[serde(default)]
    pub history: Vec<HistoryEntry>,
}

/// Body returned alongside a failed chat turn.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ErrorBody {
    pub error: String,
}

static MESSAGE_SEQ: AtomicU64 = AtomicU64::new(1);
static SESSION_SEQ: AtomicU64 = AtomicU64::new(1);

pub fn now_millis() -> i64 {
    (OffsetDateTime::now_utc().unix_timestamp_nanos() / 1_000_000) as i64
}

pub fn next_message_id(now: i64) -> String {
    let seq = MESSAGE_SEQ.fetch_add(1, Ordering::Relaxed);
    format!("msg-{now}-{seq}")
}

/// Never repeats within a process, so a deleted session's id is not handed
/// out again even when the replacement is created in the same millisecond.
pub fn next_session_id(now: i64) -> String {
    let seq = SESSION_SEQ.fetch_add(1, Ordering::Relaxed);
    format!("session-{now}-{seq}")
}

pub fn derive_title(content: &str) -> String {
    content.chars().take(TITLE_CHARS).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_session_serializes_with_camel_case_fields() {
        let session = ChatSession::new("session-1", 42);
        let json = serde_json::to_value(&session).unwrap();
        assert_eq!(json["createdAt"], 42);
        assert_eq!(json["updatedAt"], 42);
        assert_eq!(json["title"], "New Chat");
    }

    #[test]
    fn test_title_keeps_first_fifty_chars() {
        let long = "é".repeat(60);
        assert_eq!(derive_title(&long).chars().count(), 50);
        assert_eq!(derive_title("short"), "short");
    }

    #[test]
    fn test_message_ids_are_unique_within_a_millisecond() {
        assert_ne!(next_message_id(7), next_message_id(7));
    }

    #[test]
    fn test_session_ids_are_unique_within_a_millisecond() {
        let first = next_session_id(7);
        assert!(first.starts_with("session-7-"));
        assert_ne!(first, next_session_id(7));
    }
}
