use std::time::Duration;

pub const DEFAULT_MODEL: &str = "gemini-2.0-flash";
pub const DEFAULT_API_BASE: &str = "https://generativelanguage.googleapis.com/v1beta";
pub const DEFAULT_WORD_DELAY_MS: u64 = 30;
pub const DEFAULT_HISTORY_LIMIT: usize = 10;

/// Fallback settings compiled into the binary for targets without a `.env`
/// (mobile bundles, the browser).
pub const BUNDLED_CONFIG: &str = include_str!("../assets/config.env");

/// Runtime settings, read from the environment.
#[derive(Clone, Debug, PartialEq)]
pub struct ChatConfig {
    pub api_key: Option<String>,
    pub model: String,
    pub api_base: String,
    pub word_delay: Duration,
    pub history_limit: usize,
    pub request_timeout: Option<Duration>,
}

impl Default for ChatConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            model: DEFAULT_MODEL.to_string(),
            api_base: DEFAULT_API_BASE.to_string(),
            word_delay: Duration::from_millis(DEFAULT_WORD_DELAY_MS),
            history_limit: DEFAULT_HISTORY_LIMIT,
            request_timeout: None,
        }
    }
}

/// Value of `key` in `KEY=VALUE` text. Blank lines and `#` comments are skipped.
pub fn env_file_value(text: &str, key: &str) -> Option<String> {
    text.lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && !line.starts_with('#'))
        .filter_map(|line| line.split_once('='))
        .find(|(k, _)| k.trim() == key)
        .map(|(_, v)| v.trim().trim_matches('"').to_string())
}

impl ChatConfig {
    /// Process environment (after loading `.env` on native targets), then
    /// [`BUNDLED_CONFIG`] for anything still unset.
    pub fn load() -> Self {
        #[cfg(not(target_arch = "wasm32"))]
        if let Err(err) = dotenvy::dotenv() {
            tracing::debug!(%err, "no .env file loaded");
        }
        Self::from_lookup(|key| {
            std::env::var(key)
                .ok()
                .or_else(|| env_file_value(BUNDLED_CONFIG, key))
        })
    }

    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from any key lookup. Unparseable numbers fall back to defaults.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let defaults = Self::default();
        let non_empty = |key: &str| {
            lookup(key)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };
        let number = |key: &str| {
            non_empty(key).and_then(|raw| match raw.parse::<u64>() {
                Ok(value) => Some(value),
                Err(_) => {
                    tracing::warn!(key, value = %raw, "ignoring non-numeric setting");
                    None
                }
            })
        };

        Self {
            api_key: non_empty("GEMINI_API_KEY"),
            model: non_empty("GEMINI_MODEL").unwrap_or(defaults.model),
            api_base: non_empty("GEMINI_API_BASE")
                .map(|base| base.trim_end_matches('/').to_string())
                .unwrap_or(defaults.api_base),
            word_delay: number("CHAT_WORD_DELAY_MS")
                .map(Duration::from_millis)
                .unwrap_or(defaults.word_delay),
            history_limit: number("CHAT_HISTORY_LIMIT")
                .map(|n| n as usize)
                .unwrap_or(defaults.history_limit),
            request_timeout: number("CHAT_REQUEST_TIMEOUT_SECS")
                .filter(|secs| *secs > 0)
                .map(Duration::from_secs),
        }
    }

    /// `generateContent` URL for the configured model, without the key.
    pub fn endpoint(&self) -> String {
        format!("{}/models/{}:generateContent", self.api_base, self.model)
    }
}
