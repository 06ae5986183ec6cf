/// Completion gateway for NeuralChat
///
/// Forwards one user message plus recent history to the hosted model and hands
/// the reply back as a sequence of word fragments, so the transcript can draw
/// it incrementally.
///
/// # Architecture
///
/// - `gateway` - `CompletionGateway`, the `CompletionBackend` seam and the error type
/// - `gemini` - Gemini `generateContent` wire types and the reqwest backend
/// - `stream` - word-by-word stream emulation over a complete reply
///
/// # Usage
///
/// ```rust,no_run
/// use futures::StreamExt;
/// use neuralchat::ai::CompletionGateway;
/// use neuralchat::config::ChatConfig;
///
/// # async fn example() -> anyhow::Result<()> {
/// let gateway = CompletionGateway::from_config(&ChatConfig::from_env())?;
/// let mut fragments = gateway.complete("Hello!", &[]).await?;
/// while let Some(fragment) = fragments.next().await {
///     print!("{fragment}");
/// }
/// # Ok(())
/// # }
/// ```
mod gateway;
pub mod gemini;
pub mod stream;

// Re-export main types
pub use gateway::{ChatError, ChatResult, CompletionBackend, CompletionGateway};
pub use gemini::{FALLBACK_REPLY, GeminiBackend, GenerateContentRequest};
pub use stream::{FragmentStream, emulate_stream, word_fragments};
