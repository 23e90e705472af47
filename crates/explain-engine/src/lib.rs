//! Explanation normaliser
//!
//! Turns a single accessibility issue into an [`ExplanationRecord`], using a
//! chat-completion service when one is configured and a deterministic rule
//! table otherwise.

pub mod completion;
pub mod config;
pub mod defaults;
pub mod error;
pub mod fallback;
pub mod html;
pub mod prompt;
pub mod reply;
pub mod request;

use std::sync::Arc;

use shared_types::{ExplanationRecord, Issue};
use tracing::{debug, info, warn};

pub use completion::{CompletionService, OpenAiClient};
pub use config::ExplainConfig;
pub use error::ExplainError;
pub use fallback::FallbackRule;
pub use reply::{AiReply, NewFormatReply};
pub use request::ExplainRequest;

pub struct Explainer {
    config: ExplainConfig,
    service: Option<Arc<dyn CompletionService>>,
}

impl Explainer {
    /// Build from configuration, creating an OpenAI client when a key is set
    pub fn new(config: ExplainConfig) -> Result<Self, ExplainError> {
        let service: Option<Arc<dyn CompletionService>> = match config.api_key.as_deref() {
            Some(key) if config.is_ai_configured() => {
                Some(Arc::new(OpenAiClient::new(&config, key)?))
            }
            _ => None,
        };
        Ok(Self { config, service })
    }

    /// Build around an existing completion service
    pub fn with_service(config: ExplainConfig, service: Arc<dyn CompletionService>) -> Self {
        Self {
            config,
            service: Some(service),
        }
    }

    pub fn is_ai_enabled(&self) -> bool {
        self.service.is_some()
    }

    pub fn config(&self) -> &ExplainConfig {
        &self.config
    }

    pub async fn explain(&self, issue: &Issue) -> Result<ExplanationRecord, ExplainError> {
        let Some(service) = &self.service else {
            debug!(
                code = %issue.code,
                rule = ?FallbackRule::classify(issue),
                "No completion service, using rule table"
            );
            return Ok(fallback::explain(issue));
        };

        let user_prompt = prompt::build_prompt(issue);
        match service.complete(prompt::SYSTEM_PROMPT, &user_prompt).await {
            Ok(content) => {
                let reply = AiReply::classify(&content);
                info!(code = %issue.code, format = reply.kind(), "Completion received");
                Ok(reply.normalize(issue))
            }
            Err(e) if self.config.fallback_enabled => {
                warn!(code = %issue.code, error = %e, "Completion failed, using rule table");
                Ok(fallback::explain(issue))
            }
            Err(e) => Err(e),
        }
    }
}
