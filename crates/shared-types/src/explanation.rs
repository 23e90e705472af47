//! Normalised explanation of a single issue

use serde::{Deserialize, Serialize};

use crate::types::{Priority, Severity};

/// A before/after code sample
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CodeFix {
    pub description: String,
    pub before_code: String,
    pub after_code: String,
    pub explanation: String,
}

/// An actionable remediation hint
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Suggestion {
    pub title: String,
    pub description: String,
    pub priority: Priority,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub example: Option<String>,
}

impl Suggestion {
    pub fn new(
        title: impl Into<String>,
        description: impl Into<String>,
        priority: Priority,
    ) -> Self {
        Self {
            title: title.into(),
            description: description.into(),
            priority,
            example: None,
        }
    }

    pub fn with_example(mut self, example: impl Into<String>) -> Self {
        self.example = Some(example.into());
        self
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IssueDetails {
    pub impact: String,
    pub wcag_guideline: String,
    pub affected_users: Vec<String>,
    pub severity: Severity,
}

/// Explanation returned by `POST /explain-issue`.
///
/// Built either from an LLM reply or from the rule table; never persisted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExplanationRecord {
    pub explanation: String,
    /// Corrected markup, guidance text, or "No action required"
    pub fix: String,
    pub details: IssueDetails,
    pub suggestions: Vec<Suggestion>,
    pub code_fixes: Vec<CodeFix>,
}

impl ExplanationRecord {
    /// True when every text field, list and list entry is non-empty
    pub fn is_fully_populated(&self) -> bool {
        let details = &self.details;
        !self.explanation.is_empty()
            && !self.fix.is_empty()
            && !details.impact.is_empty()
            && !details.wcag_guideline.is_empty()
            && !details.affected_users.is_empty()
            && details.affected_users.iter().all(|u| !u.is_empty())
            && !self.suggestions.is_empty()
            && self
                .suggestions
                .iter()
                .all(|s| !s.title.is_empty() && !s.description.is_empty())
            && !self.code_fixes.is_empty()
            && self.code_fixes.iter().all(|f| {
                !f.description.is_empty()
                    && !f.before_code.is_empty()
                    && !f.after_code.is_empty()
                    && !f.explanation.is_empty()
            })
    }
}
