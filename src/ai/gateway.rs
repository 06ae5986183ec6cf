use super::gemini::{GeminiBackend, GenerateContentRequest, build_request};
use super::stream::{FragmentStream, emulate_stream};
use crate::config::ChatConfig;
use crate::types::HistoryEntry;
use async_trait::async_trait;
use std::sync::Arc;
use std::time::Duration;

// ============================================
// Error Types
// ============================================

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ChatError {
    #[error("Message is required")]
    MissingMessage,

    #[error("{0}")]
    NotConfigured(String),

    /// Non-success status; displays as the extracted message alone.
    #[error("{message}")]
    Upstream { status: u16, message: String },

    #[error("{0}")]
    Network(String),

    #[error("Malformed response: {0}")]
    MalformedResponse(String),

    #[error("Empty response from server")]
    EmptyResponse,

    #[error("Reply superseded by a newer turn")]
    Superseded,
}

impl From<reqwest::Error> for ChatError {
    fn from(err: reqwest::Error) -> Self {
        ChatError::Network(err.to_string())
    }
}

impl From<anyhow::Error> for ChatError {
    fn from(err: anyhow::Error) -> Self {
        ChatError::NotConfigured(err.to_string())
    }
}

pub type ChatResult<T> = Result<T, ChatError>;

// ============================================
// Backend seam
// ============================================

/// One-shot completion call returning the full reply text.
#[cfg_attr(not(target_arch = "wasm32"), async_trait)]
#[cfg_attr(target_arch = "wasm32", async_trait(?Send))]
pub trait CompletionBackend: Send + Sync {
    async fn generate(&self, request: &GenerateContentRequest) -> ChatResult<String>;
}

/// Sends a message and its history to a backend and replays the reply as a
/// word stream.
#[derive(Clone)]
pub struct CompletionGateway {
    backend: Arc<dyn CompletionBackend>,
    word_delay: Duration,
}

impl CompletionGateway {
    pub fn new(backend: impl CompletionBackend + 'static, word_delay: Duration) -> Self {
        Self {
            backend: Arc::new(backend),
            word_delay,
        }
    }

    pub fn from_config(config: &ChatConfig) -> anyhow::Result<Self> {
        let backend = GeminiBackend::from_config(config)?;
        Ok(Self::new(backend, config.word_delay))
    }

    /// One request per call, no retry. History truncation is up to the caller.
    pub async fn complete(
        &self,
        message: &str,
        history: &[HistoryEntry],
    ) -> ChatResult<FragmentStream> {
        if message.trim().is_empty() {
            return Err(ChatError::MissingMessage);
        }

        let request = build_request(message, history);
        let text = self.backend.generate(&request).await?;
        Ok(emulate_stream(&text, self.word_delay))
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use futures::StreamExt;
    use std::sync::Mutex;

    /// Backend answering from a fixed result and recording requests.
    pub(crate) struct ScriptedBackend {
        reply: ChatResult<String>,
        pub(crate) seen: Arc<Mutex<Vec<GenerateContentRequest>>>,
    }

    impl ScriptedBackend {
        pub(crate) fn replying(reply: ChatResult<String>) -> Self {
            Self {
                reply,
                seen: Arc::default(),
            }
        }
    }

    #[async_trait]
    impl CompletionBackend for ScriptedBackend {
        async fn generate(&self, request: &GenerateContentRequest) -> ChatResult<String> {
            self.seen
                .lock()
                .expect("request log poisoned")
                .push(request.clone());
            self.reply.clone()
        }
    }

    #[tokio::test]
    async fn test_streams_the_backend_reply() {
        let gateway = CompletionGateway::new(
            ScriptedBackend::replying(Ok("hello world test".into())),
            Duration::ZERO,
        );
        let fragments: Vec<String> = gateway
            .complete("Hi", &[])
            .await
            .expect("completion")
            .collect()
            .await;
        assert_eq!(fragments, vec!["hello ", "world ", "test"]);
    }

    #[tokio::test]
    async fn test_blank_message_is_rejected_before_any_request() {
        let backend = ScriptedBackend::replying(Ok("unused".into()));
        let seen = backend.seen.clone();
        let gateway = CompletionGateway::new(backend, Duration::ZERO);
        assert_eq!(
            gateway.complete("   ", &[]).await.err(),
            Some(ChatError::MissingMessage)
        );
        assert!(seen.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_upstream_error_surfaces_its_message() {
        let gateway = CompletionGateway::new(
            ScriptedBackend::replying(Err(ChatError::Upstream {
                status: 429,
                message: "quota exceeded".into(),
            })),
            Duration::ZERO,
        );
        let err = gateway.complete("Hi", &[]).await.err().expect("error");
        assert_eq!(err.to_string(), "quota exceeded");
    }
}
