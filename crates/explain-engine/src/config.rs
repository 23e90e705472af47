//! Explanation service configuration

use std::time::Duration;

use crate::error::ExplainError;

pub const DEFAULT_API_URL: &str = "https://api.openai.com/v1/chat/completions";
pub const DEFAULT_MODEL: &str = "gpt-4o-mini";
pub const DEFAULT_TEMPERATURE: f32 = 0.7;
pub const DEFAULT_MAX_TOKENS: u32 = 2000;

/// Settings for the completion service, fixed at construction
#[derive(Clone)]
pub struct ExplainConfig {
    /// No key means the completion service is not configured
    pub api_key: Option<String>,
    pub api_url: String,
    pub model: String,
    pub temperature: f32,
    pub max_tokens: u32,
    /// `None` leaves timeouts to the transport
    pub request_timeout: Option<Duration>,
    /// Recover from completion failures with the rule table
    pub fallback_enabled: bool,
}

impl Default for ExplainConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            api_url: DEFAULT_API_URL.to_string(),
            model: DEFAULT_MODEL.to_string(),
            temperature: DEFAULT_TEMPERATURE,
            max_tokens: DEFAULT_MAX_TOKENS,
            request_timeout: None,
            fallback_enabled: true,
        }
    }
}

// The key stays out of logs
impl std::fmt::Debug for ExplainConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ExplainConfig")
            .field("api_key", &self.api_key.as_ref().map(|_| "<redacted>"))
            .field("api_url", &self.api_url)
            .field("model", &self.model)
            .field("temperature", &self.temperature)
            .field("max_tokens", &self.max_tokens)
            .field("request_timeout", &self.request_timeout)
            .field("fallback_enabled", &self.fallback_enabled)
            .finish()
    }
}

impl ExplainConfig {
    /// Load configuration from environment variables
    ///
    /// Expected variables (all optional):
    /// - OPENAI_API_KEY: enables the completion service when non-blank
    /// - OPENAI_API_URL: chat-completions endpoint
    /// - OPENAI_MODEL: model name
    /// - OPENAI_TIMEOUT_MS: request timeout in milliseconds
    /// - AI_FALLBACK_ENABLED: "false"/"0"/"no"/"off" disables the fallback
    pub fn from_env() -> Result<Self, ExplainError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Same as [`from_env`](Self::from_env) with an explicit variable source
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ExplainError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| {
            lookup(key)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };
        let defaults = Self::default();

        let request_timeout = match get("OPENAI_TIMEOUT_MS") {
            Some(ms) => Some(Duration::from_millis(ms.parse().map_err(|_| {
                ExplainError::Config(format!(
                    "OPENAI_TIMEOUT_MS must be milliseconds, got '{}'",
                    ms
                ))
            })?)),
            None => None,
        };

        let fallback_enabled = match get("AI_FALLBACK_ENABLED") {
            Some(flag) => parse_flag(&flag).ok_or_else(|| {
                ExplainError::Config(format!(
                    "AI_FALLBACK_ENABLED must be a boolean, got '{}'",
                    flag
                ))
            })?,
            None => defaults.fallback_enabled,
        };

        Ok(Self {
            api_key: get("OPENAI_API_KEY"),
            api_url: get("OPENAI_API_URL").unwrap_or(defaults.api_url),
            model: get("OPENAI_MODEL").unwrap_or(defaults.model),
            request_timeout,
            fallback_enabled,
            ..defaults
        })
    }

    pub fn is_ai_configured(&self) -> bool {
        self.api_key.as_deref().is_some_and(|k| !k.trim().is_empty())
    }
}

fn parse_flag(value: &str) -> Option<bool> {
    match value.to_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}
