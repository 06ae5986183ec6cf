//! Bookkeeping for one chat turn: what history goes out with a request, and
//! whether a reply still belongs to the turn the user is looking at.

use crate::ai::{ChatError, ChatResult, FragmentStream};
use crate::types::{HistoryEntry, Message, Role};
use futures::StreamExt;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

/// The `limit` most recent messages, oldest first.
pub fn recent_history(messages: &[Message], limit: usize) -> Vec<HistoryEntry> {
    let start = messages.len().saturating_sub(limit);
    messages[start..].iter().map(HistoryEntry::from).collect()
}

/// Hands out generation tokens. Starting or cancelling a turn invalidates
/// every token issued before it.
#[derive(Clone, Debug, Default)]
pub struct TurnTracker {
    generation: Arc<AtomicU64>,
}

#[derive(Clone, Debug)]
pub struct TurnToken {
    generation: Arc<AtomicU64>,
    issued: u64,
}

impl TurnTracker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn begin(&self) -> TurnToken {
        let issued = self.generation.fetch_add(1, Ordering::SeqCst) + 1;
        TurnToken {
            generation: self.generation.clone(),
            issued,
        }
    }

    pub fn cancel(&self) {
        self.generation.fetch_add(1, Ordering::SeqCst);
    }
}

impl TurnToken {
    pub fn is_current(&self) -> bool {
        self.generation.load(Ordering::SeqCst) == self.issued
    }
}

/// Drain a reply stream, reporting the accumulated text after every fragment.
///
/// Stops with [`ChatError::Superseded`] as soon as the token goes stale, and
/// with [`ChatError::EmptyResponse`] if the stream produced no text.
pub async fn stream_reply(
    mut fragments: FragmentStream,
    token: &TurnToken,
    mut on_progress: impl FnMut(&str),
) -> ChatResult<String> {
    let mut accumulated = String::new();
    while let Some(fragment) = fragments.next().await {
        if !token.is_current() {
            return Err(ChatError::Superseded);
        }
        accumulated.push_str(&fragment);
        on_progress(&accumulated);
    }

    if !token.is_current() {
        return Err(ChatError::Superseded);
    }
    if accumulated.is_empty() {
        return Err(ChatError::EmptyResponse);
    }
    Ok(accumulated)
}

/// What to re-send when regenerating an assistant reply.
#[derive(Clone, Debug, PartialEq)]
pub struct RegenerateRequest {
    pub answer_id: String,
    pub question: String,
    pub history: Vec<HistoryEntry>,
}

/// The user message directly before `answer_id`, with the (truncated) history
/// that preceded it. `None` unless `answer_id` is an assistant message that
/// follows a user message.
pub fn regenerate_request(
    messages: &[Message],
    answer_id: &str,
    limit: usize,
) -> Option<RegenerateRequest> {
    let index = messages.iter().position(|m| m.id == answer_id)?;
    if messages[index].role != Role::Assistant || index == 0 {
        return None;
    }
    let question = &messages[index - 1];
    if question.role != Role::User {
        return None;
    }
    Some(RegenerateRequest {
        answer_id: answer_id.to_string(),
        question: question.content.clone(),
        history: recent_history(&messages[..index - 1], limit),
    })
}
