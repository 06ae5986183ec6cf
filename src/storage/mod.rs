//! Session persistence.
//!
//! Every backend stores the whole collection of sessions as one JSON array
//! under [`STORAGE_KEY`]. Writes re-read and replace the full blob, so two
//! writers racing on the same blob lose updates (last write wins).

mod local;
mod memory;

pub use local::LocalStore;
pub use memory::MemoryStore;

use crate::types::ChatSession;
use std::path::PathBuf;

/// Key under which the session blob is stored.
pub const STORAGE_KEY: &str = "chatbot_sessions";

#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    #[error("failed to write {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to serialize sessions: {0}")]
    Serialize(#[from] serde_json::Error),

    #[error("storage unavailable: {0}")]
    Unavailable(String),
}

/// Durable home of the session collection.
///
/// `load` never fails: a missing or unreadable blob is an empty collection.
pub trait SessionStore {
    fn load(&self) -> Vec<ChatSession>;

    fn save_all(&self, sessions: &[ChatSession]) -> Result<(), StorageError>;

    /// Upsert by id. Sessions not yet stored go to the front, keeping the
    /// blob in newest-first order.
    fn save_one(&self, session: &ChatSession) -> Result<(), StorageError> {
        let mut sessions = self.load();
        match sessions.iter_mut().find(|existing| existing.id == session.id) {
            Some(existing) => *existing = session.clone(),
            None => sessions.insert(0, session.clone()),
        }
        self.save_all(&sessions)
    }

    fn delete(&self, id: &str) -> Result<(), StorageError> {
        let mut sessions = self.load();
        sessions.retain(|session| session.id != id);
        self.save_all(&sessions)
    }

    fn clear(&self) -> Result<(), StorageError> {
        self.save_all(&[])
    }
}

pub(crate) fn decode_sessions(raw: Option<String>) -> Vec<ChatSession> {
    let Some(raw) = raw else {
        return Vec::new();
    };
    match serde_json::from_str(&raw) {
        Ok(sessions) => sessions,
        Err(err) => {
            tracing::warn!(error = %err, "discarding unreadable session blob");
            Vec::new()
        }
    }
}

pub(crate) fn encode_sessions(sessions: &[ChatSession]) -> Result<String, StorageError> {
    Ok(serde_json::to_string(sessions)?)
}
