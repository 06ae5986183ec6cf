use crate::storage::{SessionStore, StorageError};
use crate::types::{
    ChatSession, Message, NewMessage, derive_title, next_message_id, next_session_id, now_millis,
};

/// Owns the working set of sessions and the current-session pointer.
///
/// Every mutation is written through to the injected store before the call
/// returns. A failed write is logged and the in-memory change stands.
pub struct SessionManager {
    store: Box<dyn SessionStore>,
    sessions: Vec<ChatSession>,
    current: Option<String>,
}

impl SessionManager {
    /// Load persisted sessions and pick the current one: `initial_id` if it
    /// exists, otherwise the first stored session, otherwise a fresh session.
    pub fn init(store: Box<dyn SessionStore>, initial_id: Option<&str>) -> Self {
        let sessions = store.load();
        let current = initial_id
            .and_then(|id| sessions.iter().find(|s| s.id == id))
            .or_else(|| sessions.first())
            .map(|s| s.id.clone());

        let mut manager = Self {
            store,
            sessions,
            current,
        };
        if manager.current.is_none() {
            manager.create_session();
        }
        tracing::debug!(
            sessions = manager.sessions.len(),
            current = ?manager.current,
            "session manager ready"
        );
        manager
    }

    pub fn sessions(&self) -> &[ChatSession] {
        &self.sessions
    }

    pub fn current_id(&self) -> Option<&str> {
        self.current.as_deref()
    }

    pub fn current(&self) -> Option<&ChatSession> {
        self.current.as_deref().and_then(|id| self.session(id))
    }

    pub fn session(&self, id: &str) -> Option<&ChatSession> {
        self.sessions.iter().find(|s| s.id == id)
    }

    /// Create an empty session, put it first and make it current.
    ///
    /// The returned copy lets callers address the new session right away.
    pub fn create_session(&mut self) -> ChatSession {
        let now = now_millis();
        let session = ChatSession::new(self.unique_session_id(now), now);
        self.sessions.insert(0, session.clone());
        self.current = Some(session.id.clone());
        self.persist(&session);
        session
    }

    pub fn switch_session(&mut self, id: &str) {
        if self.session(id).is_some() {
            self.current = Some(id.to_string());
        }
    }

    /// Append a message to `session_id`, or to the current session when none
    /// is given. Returns `None` when neither resolves.
    pub fn add_message(
        &mut self,
        message: NewMessage,
        session_id: Option<&str>,
    ) -> Option<Message> {
        let target = session_id.or(self.current.as_deref())?.to_string();
        let index = self.sessions.iter().position(|s| s.id == target)?;

        let now = now_millis();
        let message = Message {
            id: next_message_id(now),
            role: message.role,
            content: message.content,
            timestamp: now,
        };

        let session = &mut self.sessions[index];
        if session.messages.is_empty() {
            session.title = derive_title(&message.content);
        }
        session.messages.push(message.clone());
        session.updated_at = now;

        let snapshot = session.clone();
        self.persist(&snapshot);
        Some(message)
    }

    /// Replace the content of a message in the current session, keeping its
    /// id. Returns `false` (and changes nothing) if there is no such message.
    pub fn update_message(&mut self, message_id: &str, content: impl Into<String>) -> bool {
        let Some(current) = self.current.as_deref() else {
            return false;
        };
        let Some(session) = self.sessions.iter_mut().find(|s| s.id == current) else {
            return false;
        };
        let Some(message) = session.messages.iter_mut().find(|m| m.id == message_id) else {
            return false;
        };

        message.content = content.into();
        session.updated_at = now_millis();

        let snapshot = session.clone();
        self.persist(&snapshot);
        true
    }

    pub fn delete_session(&mut self, id: &str) {
        if let Err(err) = self.store.delete(id) {
            tracing::warn!(session = id, error = %err, "failed to delete session");
        }
        self.sessions.retain(|s| s.id != id);

        if self.current.as_deref() == Some(id) {
            self.current = self.sessions.first().map(|s| s.id.clone());
            if self.current.is_none() {
                self.create_session();
            }
        }
    }

    /// Drop every session, persisted and in memory, and start a fresh one.
    pub fn clear_history(&mut self) -> ChatSession {
        if let Err(err) = self.store.clear() {
            tracing::warn!(error = %err, "failed to clear stored sessions");
        }
        self.sessions.clear();
        self.current = None;
        self.create_session()
    }

    fn persist(&self, session: &ChatSession) {
        if let Err(err) = self.store.save_one(session) {
            log_write_failure(&session.id, &err);
        }
    }

    /// Process-unique id that also skips anything already loaded from the
    /// store.
    fn unique_session_id(&self, now: i64) -> String {
        loop {
            let id = next_session_id(now);
            if self.session(&id).is_none() {
                return id;
            }
        }
    }
}

fn log_write_failure(session_id: &str, err: &StorageError) {
    tracing::warn!(session = session_id, error = %err, "failed to persist session");
}
