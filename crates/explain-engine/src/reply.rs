//! Classification and normalisation of completion replies
//!
//! Models answer in one of two JSON shapes, or occasionally in prose. Every
//! shape is folded into an [`ExplanationRecord`] with the same field
//! guarantees, filling gaps from [`crate::defaults`].

use lazy_static::lazy_static;
use regex::Regex;
use serde_json::{Map, Value};
use shared_types::{
    CodeFix, ExplanationRecord, Issue, IssueDetails, IssueType, Priority, Severity, Suggestion,
};

use crate::defaults;

const NO_ACTION: &str = "No action required";
const UNABLE_TO_EXPLAIN: &str = "Unable to generate explanation.";
const UNABLE_TO_FIX: &str = "Unable to generate fix.";

lazy_static! {
    static ref QUOTED_EXPLANATION: Regex =
        Regex::new(r#"(?i)"explanation"\s*:\s*"([^"]+)""#).unwrap();
    static ref LOOSE_EXPLANATION: Regex =
        Regex::new(r#"(?i)explanation["']?\s*[:=]\s*["']?([^"'\n]+)"#).unwrap();
    static ref QUOTED_FIX: Regex = Regex::new(r#"(?i)"fix"\s*:\s*"([^"]+)""#).unwrap();
    static ref LOOSE_FIX: Regex = Regex::new(r#"(?i)fix["']?\s*[:=]\s*["']?([^"'\n]+)"#).unwrap();
    static ref HTML_TAG: Regex = Regex::new(r"<[^>]+>").unwrap();
}

/// Structured verdict reply
#[derive(Debug, Clone, Default, PartialEq)]
pub struct NewFormatReply {
    pub title: String,
    pub verdict: String,
    pub wcag_criterion: Option<String>,
    pub wcag_name: Option<String>,
    pub explanation: Option<String>,
    pub is_problem: bool,
    pub problem_reasoning: Option<String>,
    pub solution_required: bool,
    pub solution_code: Option<String>,
    pub developer_note: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum AiReply {
    NewFormat(NewFormatReply),
    OldFormat(Map<String, Value>),
    UnparsableText(String),
}

impl AiReply {
    pub fn classify(content: &str) -> Self {
        let value: Value = match serde_json::from_str(content) {
            Ok(value) => value,
            Err(_) => return AiReply::UnparsableText(content.to_string()),
        };

        let map = match value {
            Value::Object(map) => map,
            _ => Map::new(),
        };

        match NewFormatReply::detect(&map) {
            Some(reply) => AiReply::NewFormat(reply),
            None => AiReply::OldFormat(map),
        }
    }

    pub fn kind(&self) -> &'static str {
        match self {
            AiReply::NewFormat(_) => "new_format",
            AiReply::OldFormat(_) => "old_format",
            AiReply::UnparsableText(_) => "text",
        }
    }

    pub fn normalize(&self, issue: &Issue) -> ExplanationRecord {
        match self {
            AiReply::NewFormat(reply) => reply.normalize(issue),
            AiReply::OldFormat(map) => normalize_old_format(map, issue),
            AiReply::UnparsableText(text) => normalize_text(text, issue),
        }
    }
}

fn text<'a>(map: &'a Map<String, Value>, key: &str) -> Option<&'a str> {
    map.get(key)
        .and_then(Value::as_str)
        .filter(|s| !s.is_empty())
}

fn owned_text(map: &Map<String, Value>, key: &str) -> Option<String> {
    text(map, key).map(str::to_string)
}

impl NewFormatReply {
    /// Recognise a reply carrying `title`, `verdict` and a `wcag` object
    fn detect(map: &Map<String, Value>) -> Option<Self> {
        let title = text(map, "title")?;
        let verdict = text(map, "verdict")?;
        let wcag = map.get("wcag")?.as_object()?;
        let solution = map.get("solution").and_then(Value::as_object);

        Some(Self {
            title: title.to_string(),
            verdict: verdict.to_string(),
            wcag_criterion: owned_text(wcag, "criterion"),
            wcag_name: owned_text(wcag, "name"),
            explanation: owned_text(map, "explanation"),
            is_problem: map.get("isProblem") == Some(&Value::Bool(true)),
            problem_reasoning: owned_text(map, "problemReasoning"),
            solution_required: solution
                .and_then(|s| s.get("required"))
                .and_then(Value::as_bool)
                .unwrap_or(false),
            solution_code: solution.and_then(|s| owned_text(s, "code")),
            developer_note: owned_text(map, "developerNote"),
        })
    }

    pub fn severity(&self, issue_type: IssueType) -> Severity {
        match self.verdict.to_lowercase().as_str() {
            "fail" if issue_type == IssueType::Error => Severity::High,
            "pass" => Severity::Low,
            _ => Severity::Medium,
        }
    }

    /// Corrected markup when the model says a change is needed
    pub fn required_fix(&self) -> Option<&str> {
        if !self.solution_required {
            return None;
        }
        self.solution_code
            .as_deref()
            .filter(|code| *code != NO_ACTION)
    }

    pub fn normalize(&self, issue: &Issue) -> ExplanationRecord {
        let severity = self.severity(issue.issue_type);
        let fix = self.required_fix();

        let body = self.explanation.clone().unwrap_or_else(|| {
            format!(
                "This issue ({}) needs attention: {}",
                issue.code, issue.message
            )
        });

        let mut explanation = format!("{}\n\n{}", self.title, body);
        if let Some(reasoning) = &self.problem_reasoning {
            explanation.push_str(&format!("\n\nIs this a problem? {}", reasoning));
        }
        if let Some(note) = &self.developer_note {
            explanation.push_str(&format!("\n\nDeveloper note: {}", note));
        }

        let criterion = self
            .wcag_criterion
            .as_deref()
            .unwrap_or(issue.code.as_str());
        let wcag_guideline = if criterion.is_empty() {
            defaults::wcag_guideline(issue)
        } else {
            format!(
                "WCAG 2.1 – {} {}",
                criterion,
                self.wcag_name.as_deref().unwrap_or("")
            )
            .trim()
            .to_string()
        };

        let impact = if self.is_problem {
            format!(
                "This {} affects users with disabilities: {}. {}",
                issue.issue_type, issue.message, body
            )
        } else {
            format!(
                "This is not a problem. {}",
                self.problem_reasoning
                    .as_deref()
                    .unwrap_or("The element is properly configured for accessibility.")
            )
        };

        let mut suggestions = vec![match &self.developer_note {
            Some(note) => Suggestion::new(
                "Best Practice",
                note.clone(),
                if severity == Severity::High {
                    Priority::High
                } else {
                    Priority::Medium
                },
            ),
            None => Suggestion::new(
                "Review Implementation",
                "Review the element and ensure it follows WCAG guidelines.",
                Priority::Medium,
            ),
        }];
        if let Some(code) = fix {
            suggestions.push(
                Suggestion::new(
                    "Recommended Fix",
                    "Apply the following fix to resolve this accessibility issue.",
                    Priority::High,
                )
                .with_example(code),
            );
        }

        let code_fix = match fix {
            Some(code) => CodeFix {
                description: "Recommended fix".into(),
                before_code: defaults::non_empty_or(&issue.context, "Original code"),
                after_code: code.to_string(),
                explanation: self
                    .developer_note
                    .clone()
                    .unwrap_or_else(|| "This fix addresses the accessibility issue.".into()),
            },
            None if !issue.context.is_empty() => CodeFix {
                description: "Current implementation (no changes needed)".into(),
                before_code: issue.context.clone(),
                after_code: issue.context.clone(),
                explanation: self
                    .problem_reasoning
                    .clone()
                    .unwrap_or_else(|| "This implementation is already accessible.".into()),
            },
            None => defaults::generic_code_fix(issue),
        };

        let fix = match fix {
            Some(code) => code.to_string(),
            None => defaults::non_empty_or(&issue.context, NO_ACTION),
        };

        ExplanationRecord {
            explanation,
            fix,
            details: IssueDetails {
                impact,
                wcag_guideline,
                affected_users: defaults::affected_users(issue),
                severity,
            },
            suggestions,
            code_fixes: vec![code_fix],
        }
    }
}

fn normalize_old_format(map: &Map<String, Value>, issue: &Issue) -> ExplanationRecord {
    let explanation = text(map, "explanation")
        .filter(|e| e.chars().count() > 20 && *e != UNABLE_TO_EXPLAIN)
        .map(str::to_string)
        .unwrap_or_else(|| defaults::explanation(issue));

    // A reply that echoes the context back is treated as no fix
    let ai_fix = text(map, "fix");
    let fix = ai_fix
        .filter(|f| *f != issue.context)
        .map(str::to_string)
        .unwrap_or_else(|| issue.context.clone());

    let details = map.get("details").and_then(Value::as_object);
    let detail_text = |key: &str| details.and_then(|d| owned_text(d, key));

    let affected_users = details
        .and_then(|d| d.get("affectedUsers"))
        .and_then(Value::as_array)
        .map(|users| {
            users
                .iter()
                .filter_map(Value::as_str)
                .filter(|u| !u.is_empty())
                .map(str::to_string)
                .collect::<Vec<_>>()
        })
        .filter(|users| !users.is_empty())
        .unwrap_or_else(|| defaults::affected_users(issue));

    let severity = detail_text("severity")
        .and_then(|s| s.parse::<Severity>().ok())
        .unwrap_or_else(|| defaults::severity(issue));

    let suggestions = map
        .get("suggestions")
        .and_then(Value::as_array)
        .map(|entries| entries.iter().filter_map(parse_suggestion).collect::<Vec<_>>())
        .filter(|s| !s.is_empty())
        .unwrap_or_else(|| defaults::suggestions(issue));

    let code_fixes = map
        .get("codeFixes")
        .and_then(Value::as_array)
        .map(|entries| entries.iter().filter_map(parse_code_fix).collect::<Vec<_>>())
        .filter(|fixes| !fixes.is_empty())
        .unwrap_or_else(|| vec![defaults::code_fix_from(issue, ai_fix)]);

    ExplanationRecord {
        explanation,
        fix,
        details: IssueDetails {
            impact: detail_text("impact").unwrap_or_else(|| defaults::impact(issue)),
            wcag_guideline: detail_text("wcagGuideline")
                .unwrap_or_else(|| defaults::wcag_guideline(issue)),
            affected_users,
            severity,
        },
        suggestions,
        code_fixes,
    }
}

fn parse_suggestion(entry: &Value) -> Option<Suggestion> {
    let entry = entry.as_object()?;
    let priority: Priority = text(entry, "priority")?.parse().ok()?;
    let suggestion = Suggestion::new(text(entry, "title")?, text(entry, "description")?, priority);
    Some(match text(entry, "example") {
        Some(example) => suggestion.with_example(example),
        None => suggestion,
    })
}

fn parse_code_fix(entry: &Value) -> Option<CodeFix> {
    let entry = entry.as_object()?;
    Some(CodeFix {
        description: text(entry, "description")?.to_string(),
        before_code: text(entry, "beforeCode")?.to_string(),
        after_code: text(entry, "afterCode")?.to_string(),
        explanation: owned_text(entry, "explanation")
            .unwrap_or_else(|| "This fix addresses the accessibility issue.".into()),
    })
}

fn first_capture(patterns: &[&Regex], text: &str) -> Option<String> {
    patterns.iter().find_map(|re| {
        re.captures(text)
            .and_then(|c| c.get(1).or_else(|| c.get(0)))
            .map(|m| m.as_str().to_string())
    })
}

fn normalize_text(reply: &str, issue: &Issue) -> ExplanationRecord {
    let explanation = first_capture(&[&QUOTED_EXPLANATION, &LOOSE_EXPLANATION], reply)
        .unwrap_or_else(|| UNABLE_TO_EXPLAIN.to_string());
    let extracted_fix = first_capture(&[&QUOTED_FIX, &LOOSE_FIX, &HTML_TAG], reply);

    let fix = extracted_fix
        .clone()
        .unwrap_or_else(|| defaults::non_empty_or(&issue.context, UNABLE_TO_FIX));

    ExplanationRecord {
        explanation,
        fix: fix.clone(),
        details: IssueDetails {
            impact: "This accessibility issue may prevent users with disabilities from accessing or understanding the content.".into(),
            wcag_guideline: defaults::wcag_guideline(issue),
            affected_users: vec!["Users with disabilities".into()],
            severity: defaults::severity(issue),
        },
        suggestions: defaults::suggestions(issue),
        code_fixes: vec![CodeFix {
            description: "Recommended fix".into(),
            before_code: defaults::non_empty_or(&issue.context, "Original code"),
            after_code: fix,
            explanation: "This fix addresses the accessibility issue.".into(),
        }],
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    const IMG: &str = r#"<img src="logo.png">"#;

    fn img_issue() -> Issue {
        Issue::new(
            "WCAG2AA.Principle1.Guideline1_1.1_1_1.H37",
            "Img element missing an alt attribute.",
            IssueType::Error,
            "html > body > img",
            IMG,
        )
    }

    fn new_format(overrides: Value) -> String {
        let mut base = json!({
            "title": "Missing alt text",
            "verdict": "Fail",
            "wcag": {"criterion": "1.1.1", "name": "Non-text Content"},
            "explanation": "Screen readers cannot describe this image.",
            "isProblem": true,
            "problemReasoning": "The image conveys the brand.",
            "solution": {"required": true, "code": "<img src=\"logo.png\" alt=\"Acme\">"},
            "developerNote": "Describe purpose, not appearance."
        });
        if let (Value::Object(base), Value::Object(extra)) = (&mut base, overrides) {
            base.extend(extra);
        }
        base.to_string()
    }

    #[test]
    fn test_classify_variants() {
        assert_eq!(AiReply::classify(&new_format(json!({}))).kind(), "new_format");
        assert_eq!(AiReply::classify(r#"{"explanation": "x"}"#).kind(), "old_format");
        assert_eq!(AiReply::classify("Sure! Here is the fix").kind(), "text");
        // wcag must be an object
        assert_eq!(
            AiReply::classify(&new_format(json!({"wcag": "1.1.1"}))).kind(),
            "old_format"
        );
        // non-object JSON decodes to an empty old-format reply
        assert_eq!(AiReply::classify("[1, 2]"), AiReply::OldFormat(Map::new()));
    }

    #[test]
    fn test_new_format_fail_with_fix() {
        let record = AiReply::classify(&new_format(json!({}))).normalize(&img_issue());

        assert_eq!(
            record.explanation,
            "Missing alt text\n\nScreen readers cannot describe this image.\n\n\
             Is this a problem? The image conveys the brand.\n\n\
             Developer note: Describe purpose, not appearance."
        );
        assert_eq!(record.fix, "<img src=\"logo.png\" alt=\"Acme\">");
        assert_eq!(record.details.severity, Severity::High);
        assert_eq!(record.details.wcag_guideline, "WCAG 2.1 – 1.1.1 Non-text Content");
        assert_eq!(
            record.details.impact,
            "This error affects users with disabilities: Img element missing an alt attribute.. \
             Screen readers cannot describe this image."
        );

        let titles: Vec<_> = record.suggestions.iter().map(|s| s.title.as_str()).collect();
        assert_eq!(titles, vec!["Best Practice", "Recommended Fix"]);
        assert_eq!(record.suggestions[0].priority, Priority::High);
        assert_eq!(
            record.suggestions[1].example.as_deref(),
            Some("<img src=\"logo.png\" alt=\"Acme\">")
        );

        assert_eq!(record.code_fixes.len(), 1);
        assert_eq!(record.code_fixes[0].before_code, IMG);
        assert_eq!(record.code_fixes[0].explanation, "Describe purpose, not appearance.");
    }

    #[test]
    fn test_new_format_pass_needs_no_change() {
        let reply = new_format(json!({
            "verdict": "Pass",
            "isProblem": false,
            "problemReasoning": "Adjacent link text already names the image.",
            "solution": {"required": false, "code": "No action required"},
            "developerNote": null
        }));
        let record = AiReply::classify(&reply).normalize(&img_issue());

        assert_eq!(record.details.severity, Severity::Low);
        assert_eq!(record.fix, IMG);
        assert_eq!(
            record.details.impact,
            "This is not a problem. Adjacent link text already names the image."
        );
        assert_eq!(record.suggestions.len(), 1);
        assert_eq!(record.suggestions[0].title, "Review Implementation");
        assert_eq!(
            record.code_fixes[0].description,
            "Current implementation (no changes needed)"
        );
        assert_eq!(record.code_fixes[0].after_code, IMG);
        assert!(record.is_fully_populated());
    }

    #[test]
    fn test_new_format_without_context_or_fix() {
        let issue = Issue::new("H25.2", "Check title", IssueType::Notice, "html", "");
        let reply = new_format(json!({
            "verdict": "Warning",
            "wcag": {},
            "solution": {"required": true, "code": "No action required"}
        }));
        let record = AiReply::classify(&reply).normalize(&issue);

        assert_eq!(record.fix, "No action required");
        assert_eq!(record.details.severity, Severity::Medium);
        assert_eq!(record.details.wcag_guideline, "WCAG 2.1 – H25.2");
        assert_eq!(record.code_fixes[0].description, "Recommended fix for H25.2");
        assert!(record.is_fully_populated());
    }

    #[test]
    fn test_fail_verdict_on_warning_is_medium() {
        let classified = AiReply::classify(&new_format(json!({"verdict": "FAIL"})));
        let reply: NewFormatReply = match classified {
            AiReply::NewFormat(reply) => reply,
            other => panic!("unexpected {:?}", other),
        };
        assert_eq!(reply.severity(IssueType::Warning), Severity::Medium);
        assert_eq!(reply.severity(IssueType::Error), Severity::High);
    }

    #[test]
    fn test_old_format_accepts_plausible_fields() {
        let reply = json!({
            "explanation": "The image has no text alternative for assistive technology.",
            "fix": "<img src=\"logo.png\" alt=\"Acme logo\">",
            "details": {
                "impact": "Blind users miss the brand.",
                "wcagGuideline": "WCAG 2.1 Level A - 1.1.1",
                "affectedUsers": ["Blind users"],
                "severity": "critical"
            },
            "suggestions": [
                {"title": "Add alt", "description": "Describe the logo", "priority": "high"},
                {"title": "Broken", "description": "no priority"}
            ],
            "codeFixes": [
                {"description": "Add alt", "beforeCode": IMG, "afterCode": "<img src=\"logo.png\" alt=\"Acme logo\">"}
            ]
        })
        .to_string();
        let record = AiReply::classify(&reply).normalize(&img_issue());

        assert_eq!(record.fix, "<img src=\"logo.png\" alt=\"Acme logo\">");
        assert_eq!(record.details.severity, Severity::Critical);
        assert_eq!(record.details.affected_users, vec!["Blind users"]);
        assert_eq!(record.suggestions.len(), 1);
        assert_eq!(record.code_fixes[0].explanation, "This fix addresses the accessibility issue.");
    }

    #[test]
    fn test_old_format_defaults_implausible_fields() {
        let reply = json!({
            "explanation": "Too short",
            "fix": IMG,
            "details": {"severity": "catastrophic"},
            "suggestions": []
        })
        .to_string();
        let issue = img_issue();
        let record = AiReply::classify(&reply).normalize(&issue);

        assert_eq!(record.explanation, defaults::explanation(&issue));
        // echoed context is rejected, then restored as the default
        assert_eq!(record.fix, IMG);
        assert_eq!(record.details.severity, Severity::High);
        assert_eq!(record.details.impact, defaults::impact(&issue));
        assert_eq!(record.suggestions, defaults::suggestions(&issue));
        assert_eq!(record.code_fixes, vec![defaults::generic_code_fix(&issue)]);
    }

    #[test]
    fn test_old_format_builds_fix_from_ai_fix() {
        let reply = json!({"fix": "<img src=\"logo.png\" alt=\"Acme\">"}).to_string();
        let record = AiReply::classify(&reply).normalize(&img_issue());
        assert_eq!(record.code_fixes[0].before_code, IMG);
        assert_eq!(record.code_fixes[0].after_code, "<img src=\"logo.png\" alt=\"Acme\">");
        assert!(record.code_fixes[0].description.starts_with("Fix for WCAG2AA"));
    }

    #[test]
    fn test_text_reply_extraction() {
        let reply = "explanation: the logo lacks alt text\nTry <img src=\"logo.png\" alt=\"Acme\"> instead";
        let record = AiReply::classify(reply).normalize(&img_issue());

        assert_eq!(record.explanation, "the logo lacks alt text");
        assert_eq!(record.fix, "<img src=\"logo.png\" alt=\"Acme\">");
        assert_eq!(record.details.affected_users, vec!["Users with disabilities"]);
        assert_eq!(record.details.severity, Severity::High);
        assert_eq!(record.code_fixes[0].after_code, record.fix);
    }

    #[test]
    fn test_text_reply_with_nothing_to_extract() {
        let issue = Issue::new("H25.2", "Check title", IssueType::Warning, "html", "");
        let record = AiReply::classify("I cannot help with that.").normalize(&issue);

        assert_eq!(record.explanation, "Unable to generate explanation.");
        assert_eq!(record.fix, "Unable to generate fix.");
        assert_eq!(record.details.severity, Severity::Medium);
        assert!(record.is_fully_populated());
    }
}
