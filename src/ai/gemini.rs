use super::{ChatError, ChatResult, CompletionBackend};
use crate::config::ChatConfig;
use crate::types::{HistoryEntry, Role};
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};

/// Reply used when the model returns no text candidate.
pub const FALLBACK_REPLY: &str = "Sorry, I couldn't generate a response.";

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct GenerateContentRequest {
    pub contents: Vec<Content>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Content {
    pub role: String,
    pub parts: Vec<Part>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Part {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
}

impl Content {
    fn text(role: &str, text: &str) -> Self {
        Self {
            role: role.to_string(),
            parts: vec![Part {
                text: Some(text.to_string()),
            }],
        }
    }
}

#[derive(Deserialize)]
struct GenerateContentResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Deserialize)]
struct Candidate {
    #[serde(default)]
    content: Option<CandidateContent>,
}

#[derive(Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<Part>,
}

#[derive(Deserialize)]
struct ErrorEnvelope {
    error: Option<ErrorDetail>,
}

#[derive(Deserialize)]
struct ErrorDetail {
    message: Option<String>,
}

pub fn gemini_role(role: Role) -> &'static str {
    match role {
        Role::User => "user",
        Role::Assistant => "model",
    }
}

/// History in order, then the new message as the final user turn.
pub fn build_request(message: &str, history: &[HistoryEntry]) -> GenerateContentRequest {
    let mut contents: Vec<Content> = history
        .iter()
        .map(|entry| Content::text(gemini_role(entry.role), &entry.content))
        .collect();
    contents.push(Content::text(gemini_role(Role::User), message));
    GenerateContentRequest { contents }
}

/// Human-readable error text from a failed response body.
pub fn extract_error_message(status: u16, body: &str) -> String {
    if let Ok(envelope) = serde_json::from_str::<ErrorEnvelope>(body)
        && let Some(message) = envelope
            .error
            .and_then(|detail| detail.message)
            .filter(|m| !m.is_empty())
    {
        return message;
    }
    if body.is_empty() {
        format!("API Error: {status}")
    } else {
        body.to_string()
    }
}

/// Text of the first candidate, or [`FALLBACK_REPLY`] when there is none.
pub fn extract_reply(body: &str) -> ChatResult<String> {
    let parsed: GenerateContentResponse = serde_json::from_str(body)
        .map_err(|err| ChatError::MalformedResponse(err.to_string()))?;

    let text = parsed
        .candidates
        .into_iter()
        .next()
        .and_then(|candidate| candidate.content)
        .and_then(|content| {
            content
                .parts
                .into_iter()
                .filter_map(|part| part.text)
                .find(|text| !text.is_empty())
        });

    match text {
        Some(text) => Ok(text),
        None => {
            tracing::warn!("completion returned no text candidate");
            Ok(FALLBACK_REPLY.to_string())
        }
    }
}

pub struct GeminiBackend {
    client: Client,
    endpoint: String,
    api_key: String,
}

impl GeminiBackend {
    pub fn new(client: Client, endpoint: String, api_key: String) -> Self {
        Self {
            client,
            endpoint,
            api_key,
        }
    }

    pub fn from_config(config: &ChatConfig) -> anyhow::Result<Self> {
        let api_key = config
            .api_key
            .clone()
            .ok_or_else(|| anyhow::anyhow!("No completion API configured. Set GEMINI_API_KEY."))?;

        #[cfg(not(target_arch = "wasm32"))]
        let client = {
            let mut builder = Client::builder();
            if let Some(timeout) = config.request_timeout {
                builder = builder.timeout(timeout);
            }
            builder.build()?
        };
        #[cfg(target_arch = "wasm32")]
        let client = Client::new();

        Ok(Self::new(client, config.endpoint(), api_key))
    }
}

#[cfg_attr(not(target_arch = "wasm32"), async_trait)]
#[cfg_attr(target_arch = "wasm32", async_trait(?Send))]
impl CompletionBackend for GeminiBackend {
    async fn generate(&self, request: &GenerateContentRequest) -> ChatResult<String> {
        tracing::debug!(
            endpoint = %self.endpoint,
            turns = request.contents.len(),
            "calling completion endpoint"
        );

        let response = self
            .client
            .post(&self.endpoint)
            .query(&[("key", self.api_key.as_str())])
            .json(request)
            .send()
            .await?;
        let status = response.status();
        let body = response.text().await?;

        if status.is_success() {
            extract_reply(&body)
        } else {
            let message = extract_error_message(status.as_u16(), &body);
            tracing::error!(status = status.as_u16(), %message, "completion endpoint error");
            Err(ChatError::Upstream {
                status: status.as_u16(),
                message,
            })
        }
    }
}
