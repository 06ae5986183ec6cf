use super::{SessionStore, StorageError, decode_sessions, encode_sessions};
use crate::types::ChatSession;
use std::sync::{Arc, Mutex, MutexGuard};

/// In-process stand-in for browser storage.
///
/// Clones share the same blob, so a test can keep a handle after moving the
/// store into a [`crate::chat::SessionManager`].
#[derive(Clone, Default)]
pub struct MemoryStore {
    blob: Arc<Mutex<Option<String>>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed the store with raw blob text, valid JSON or not.
    pub fn with_raw(raw: impl Into<String>) -> Self {
        Self {
            blob: Arc::new(Mutex::new(Some(raw.into()))),
        }
    }

    pub fn raw(&self) -> Option<String> {
        self.lock().clone()
    }

    fn lock(&self) -> MutexGuard<'_, Option<String>> {
        self.blob.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl SessionStore for MemoryStore {
    fn load(&self) -> Vec<ChatSession> {
        decode_sessions(self.raw())
    }

    fn save_all(&self, sessions: &[ChatSession]) -> Result<(), StorageError> {
        let encoded = encode_sessions(sessions)?;
        *self.lock() = Some(encoded);
        Ok(())
    }
}
