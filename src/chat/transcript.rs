//! Turns a session's messages plus the live streaming buffer into what the
//! chat view should draw.

use crate::types::{Message, Role};

/// A user question and the assistant reply that immediately follows it.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct MessageGroup<'a> {
    pub question: &'a Message,
    pub answer: Option<&'a Message>,
}

/// The in-progress reply of an active turn.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LiveAnswer<'a> {
    /// Text received so far, drawn with a blinking caret.
    Typing(&'a str),
    /// Nothing received yet.
    Thinking,
}

impl<'a> LiveAnswer<'a> {
    fn from_buffer(buffer: &'a str) -> Self {
        if buffer.is_empty() {
            LiveAnswer::Thinking
        } else {
            LiveAnswer::Typing(buffer)
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub enum AnswerView<'a> {
    Committed(&'a Message),
    Live(LiveAnswer<'a>),
    Pending,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct GroupPlan<'a> {
    pub question: &'a Message,
    pub answer: AnswerView<'a>,
}

#[derive(Clone, Debug, PartialEq)]
pub enum TranscriptPlan<'a> {
    /// No messages yet: show the "start a conversation" placeholder.
    Empty,
    Conversation {
        groups: Vec<GroupPlan<'a>>,
        /// Live reply with no question to attach to.
        standalone: Option<LiveAnswer<'a>>,
        /// Last user message that formed no group, with its live reply.
        trailing: Option<(&'a Message, LiveAnswer<'a>)>,
    },
}

pub fn group_messages(messages: &[Message]) -> Vec<MessageGroup<'_>> {
    let mut groups = Vec::new();
    let mut iter = messages.iter().peekable();
    while let Some(msg) = iter.next() {
        if msg.role != Role::User {
            continue;
        }
        let answer = iter.next_if(|next| next.role == Role::Assistant);
        groups.push(MessageGroup {
            question: msg,
            answer,
        });
    }
    groups
}

pub fn plan_transcript<'a>(
    messages: &'a [Message],
    buffer: &'a str,
    streaming: bool,
) -> TranscriptPlan<'a> {
    if messages.is_empty() {
        return TranscriptPlan::Empty;
    }

    let groups = group_messages(messages);
    let last_user = messages.last().filter(|m| m.role == Role::User);
    let group_count = groups.len();

    let plans = groups
        .iter()
        .enumerate()
        .map(|(idx, group)| {
            let awaiting = streaming
                && idx + 1 == group_count
                && last_user.is_some_and(|last| last.id == group.question.id);
            let answer = if awaiting {
                AnswerView::Live(LiveAnswer::from_buffer(buffer))
            } else {
                group
                    .answer
                    .map_or(AnswerView::Pending, AnswerView::Committed)
            };
            GroupPlan {
                question: group.question,
                answer,
            }
        })
        .collect::<Vec<_>>();

    let standalone = (streaming && groups.is_empty()).then(|| LiveAnswer::from_buffer(buffer));

    let trailing = last_user
        .filter(|last| streaming && !groups.iter().any(|g| g.question.id == last.id))
        .map(|last| (last, LiveAnswer::from_buffer(buffer)));

    TranscriptPlan::Conversation {
        groups: plans,
        standalone,
        trailing,
    }
}
