use crate::timer;
use futures::StreamExt;
use futures::stream;
use std::time::Duration;

/// Finite, pull-based sequence of reply fragments. Ends when the reply does.
#[cfg(not(target_arch = "wasm32"))]
pub type FragmentStream = stream::BoxStream<'static, String>;

/// Browser timers are not `Send`, so the wasm stream is local to its thread.
#[cfg(target_arch = "wasm32")]
pub type FragmentStream = stream::LocalBoxStream<'static, String>;

/// Split a reply on single spaces, keeping the separating space on every word
/// but the last. Line breaks stay inside their word, so concatenating the
/// fragments reproduces `text` exactly.
pub fn word_fragments(text: &str) -> Vec<String> {
    if text.is_empty() {
        return Vec::new();
    }
    let words: Vec<&str> = text.split(' ').collect();
    let last = words.len() - 1;
    words
        .into_iter()
        .enumerate()
        .map(|(i, word)| {
            if i < last {
                format!("{word} ")
            } else {
                word.to_string()
            }
        })
        .collect()
}

/// Replay a complete reply one word at a time, waiting `delay` before each.
pub fn emulate_stream(text: &str, delay: Duration) -> FragmentStream {
    let fragments = stream::iter(word_fragments(text)).then(move |fragment| async move {
        timer::sleep(delay).await;
        fragment
    });

    #[cfg(not(target_arch = "wasm32"))]
    {
        fragments.boxed()
    }
    #[cfg(target_arch = "wasm32")]
    {
        fragments.boxed_local()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_splits_into_words_with_trailing_spaces() {
        assert_eq!(word_fragments("hello world test"), vec!["hello ", "world ", "test"]);
    }

    #[test]
    fn test_fragments_reassemble_the_reply() {
        let text = "line one\n\n```rust\nfn main() {}\n```  done";
        assert_eq!(word_fragments(text).concat(), text);
    }

    #[test]
    fn test_empty_reply_has_no_fragments() {
        assert!(word_fragments("").is_empty());
        assert_eq!(word_fragments("solo"), vec!["solo"]);
    }

    #[tokio::test]
    async fn test_stream_emits_fragments_in_order() {
        let collected: Vec<String> = emulate_stream("a b c", Duration::ZERO).collect().await;
        assert_eq!(collected, vec!["a ", "b ", "c"]);
    }

    #[tokio::test]
    async fn test_stream_waits_between_words() {
        let started = std::time::Instant::now();
        let collected: Vec<String> =
            emulate_stream("a b", Duration::from_millis(5)).collect().await;
        assert_eq!(collected.len(), 2);
        assert!(started.elapsed() >= Duration::from_millis(10));
    }
}
