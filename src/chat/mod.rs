//! Conversation state: the session list, the transcript layout and the
//! bookkeeping around a single request/reply turn.

pub mod session;
pub mod transcript;
pub mod turn;

pub use session::SessionManager;
pub use transcript::{
    AnswerView, GroupPlan, LiveAnswer, MessageGroup, TranscriptPlan, group_messages,
    plan_transcript,
};
pub use turn::{
    RegenerateRequest, TurnToken, TurnTracker, recent_history, regenerate_request, stream_reply,
};
