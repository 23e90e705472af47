use serde::Deserialize;
use shared_types::{Issue, IssueType};

use crate::error::ExplainError;

/// Body of an explain-issue call
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ExplainRequest {
    #[serde(default)]
    pub code: Option<String>,
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub selector: Option<String>,
    #[serde(default)]
    pub context: Option<String>,
    #[serde(default, rename = "type")]
    pub issue_type: Option<String>,
}

impl ExplainRequest {
    /// Check required fields and build the issue to explain.
    ///
    /// `type` defaults to error and `context` to empty.
    pub fn into_issue(self) -> Result<Issue, ExplainError> {
        let required = |value: Option<String>| value.filter(|v| !v.trim().is_empty());

        let (Some(code), Some(message), Some(selector)) = (
            required(self.code),
            required(self.message),
            required(self.selector),
        ) else {
            return Err(ExplainError::Validation(
                "Missing required fields: code, message, and selector are required".into(),
            ));
        };

        let issue_type = match self.issue_type.as_deref().map(str::trim) {
            None | Some("") => IssueType::Error,
            Some(raw) => raw
                .parse()
                .map_err(|e| ExplainError::Validation(format!("Invalid issue type: {}", e)))?,
        };

        Ok(Issue::new(
            code,
            message,
            issue_type,
            selector,
            self.context.unwrap_or_default(),
        ))
    }
}
