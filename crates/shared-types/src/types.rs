use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Error returned when a wire string does not name a known variant
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown {kind} '{value}'")]
pub struct ParseEnumError {
    pub kind: &'static str,
    pub value: String,
}

/// Issue class as reported by pa11y
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum IssueType {
    Error,
    Warning,
    Notice,
}

impl IssueType {
    pub fn as_str(&self) -> &'static str {
        match self {
            IssueType::Error => "error",
            IssueType::Warning => "warning",
            IssueType::Notice => "notice",
        }
    }
}

impl fmt::Display for IssueType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for IssueType {
    type Err = ParseEnumError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "error" => Ok(IssueType::Error),
            "warning" => Ok(IssueType::Warning),
            "notice" => Ok(IssueType::Notice),
            other => Err(ParseEnumError {
                kind: "issue type",
                value: other.to_string(),
            }),
        }
    }
}

/// One accessibility issue detected on a page.
///
/// Produced by the scanner and never modified afterwards. Issues have no
/// identity of their own beyond their position in a report.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Issue {
    /// Rule code, e.g. `WCAG2AA.Principle1.Guideline1_1.1_1_1.H30.2`
    pub code: String,
    pub message: String,
    #[serde(rename = "type")]
    pub issue_type: IssueType,
    /// CSS selector of the offending element
    pub selector: String,
    /// Raw HTML snippet of the offending element (may be empty)
    #[serde(default)]
    pub context: String,
    /// Runner-specific data passed through untouched
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub runner_extras: Option<serde_json::Value>,
}

impl Issue {
    pub fn new(
        code: impl Into<String>,
        message: impl Into<String>,
        issue_type: IssueType,
        selector: impl Into<String>,
        context: impl Into<String>,
    ) -> Self {
        Self {
            code: code.into(),
            message: message.into(),
            issue_type,
            selector: selector.into(),
            context: context.into(),
            runner_extras: None,
        }
    }
}

/// Severity assigned to an explained issue
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Critical,
    High,
    Medium,
    Low,
}

impl Severity {
    /// Default severity for an issue class: error→high, warning→medium, notice→low
    pub fn from_issue_type(issue_type: IssueType) -> Self {
        match issue_type {
            IssueType::Error => Severity::High,
            IssueType::Warning => Severity::Medium,
            IssueType::Notice => Severity::Low,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Severity::Critical => "critical",
            Severity::High => "high",
            Severity::Medium => "medium",
            Severity::Low => "low",
        }
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Severity {
    type Err = ParseEnumError;

    /// Exact, case-sensitive match on the wire names
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "critical" => Ok(Severity::Critical),
            "high" => Ok(Severity::High),
            "medium" => Ok(Severity::Medium),
            "low" => Ok(Severity::Low),
            other => Err(ParseEnumError {
                kind: "severity",
                value: other.to_string(),
            }),
        }
    }
}

/// Priority of a suggestion
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Priority {
    High,
    Medium,
    Low,
}

impl FromStr for Priority {
    type Err = ParseEnumError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "high" => Ok(Priority::High),
            "medium" => Ok(Priority::Medium),
            "low" => Ok(Priority::Low),
            other => Err(ParseEnumError {
                kind: "priority",
                value: other.to_string(),
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_issue_uses_pa11y_field_names() {
        let issue: Issue = serde_json::from_value(json!({
            "code": "WCAG2AA.Principle1.Guideline1_1.1_1_1.H30.2",
            "message": "Img element is the only content of the link",
            "type": "error",
            "selector": "#main > a",
            "context": "<a href=\"/\"><img src=\"logo.png\"></a>",
            "runnerExtras": {}
        }))
        .unwrap();

        assert_eq!(issue.issue_type, IssueType::Error);
        assert_eq!(issue.runner_extras, Some(json!({})));

        let back = serde_json::to_value(&issue).unwrap();
        assert_eq!(back["type"], "error");
        assert!(back.get("issue_type").is_none());
    }

    #[test]
    fn test_issue_context_defaults_to_empty() {
        let issue: Issue = serde_json::from_value(json!({
            "code": "X",
            "message": "m",
            "type": "notice",
            "selector": "body"
        }))
        .unwrap();
        assert!(issue.context.is_empty());
        assert!(serde_json::to_value(&issue)
            .unwrap()
            .get("runnerExtras")
            .is_none());
    }

    #[test]
    fn test_severity_from_issue_type() {
        assert_eq!(Severity::from_issue_type(IssueType::Error), Severity::High);
        assert_eq!(Severity::from_issue_type(IssueType::Warning), Severity::Medium);
        assert_eq!(Severity::from_issue_type(IssueType::Notice), Severity::Low);
    }

    #[test]
    fn test_severity_parse_is_exact() {
        assert_eq!("critical".parse::<Severity>(), Ok(Severity::Critical));
        assert!("High".parse::<Severity>().is_err());
        assert!("severe".parse::<Severity>().is_err());
    }

    #[test]
    fn test_issue_type_parse_is_lenient() {
        assert_eq!(" Warning ".parse::<IssueType>(), Ok(IssueType::Warning));
        let err = "fatal".parse::<IssueType>().unwrap_err();
        assert_eq!(err.to_string(), "unknown issue type 'fatal'");
    }
}
