//! Default derivations used whenever a reply leaves a field out

use shared_types::{CodeFix, Issue, Priority, Severity, Suggestion};

use crate::html;

/// Lower-cased code and message for keyword dispatch
pub(crate) struct Keywords {
    code: String,
    message: String,
}

impl Keywords {
    pub(crate) fn of(issue: &Issue) -> Self {
        Self {
            code: issue.code.to_lowercase(),
            message: issue.message.to_lowercase(),
        }
    }

    pub(crate) fn code_has(&self, needle: &str) -> bool {
        self.code.contains(needle)
    }

    pub(crate) fn message_has(&self, needle: &str) -> bool {
        self.message.contains(needle)
    }

    pub(crate) fn either_has(&self, needle: &str) -> bool {
        self.code_has(needle) || self.message_has(needle)
    }

    fn is_image(&self) -> bool {
        self.code_has("h30") || self.message_has("alt") || self.message_has("image")
    }

    fn is_contrast(&self) -> bool {
        self.code_has("g18") || self.message_has("contrast")
    }

    fn is_form(&self) -> bool {
        self.code_has("label") || self.message_has("form") || self.message_has("input")
    }
}

pub fn affected_users(issue: &Issue) -> Vec<String> {
    let kw = Keywords::of(issue);
    let users: &[&str] = if kw.is_image() {
        &["Screen reader users", "Users with slow connections"]
    } else if kw.is_contrast() {
        &["Users with low vision", "Users with color blindness"]
    } else if kw.is_form() {
        &["Screen reader users", "Users with cognitive disabilities"]
    } else if kw.either_has("heading") {
        &["Screen reader users", "Keyboard-only users"]
    } else {
        &["Users with disabilities"]
    };
    users.iter().map(|u| u.to_string()).collect()
}

/// One issue-specific suggestion followed by the assistive technology check
pub fn suggestions(issue: &Issue) -> Vec<Suggestion> {
    let kw = Keywords::of(issue);
    let snippet = html::excerpt(&issue.context, 50);

    let specific = if kw.is_image() {
        let suggestion = Suggestion::new(
            "Add descriptive alt text",
            format!(
                "For the image element \"{}...\", provide meaningful alternative text that describes the image content and purpose.",
                snippet
            ),
            Priority::High,
        );
        if issue.context.contains("<img") {
            suggestion.with_example(html::with_placeholder_alt(&issue.context))
        } else {
            suggestion
        }
    } else if kw.is_contrast() {
        Suggestion::new(
            "Increase color contrast ratio",
            format!(
                "The element \"{}...\" needs better contrast. Ensure text has at least 4.5:1 contrast ratio for normal text.",
                snippet
            ),
            Priority::High,
        )
    } else if kw.is_form() {
        Suggestion::new(
            "Associate label with input",
            format!(
                "The form element \"{}...\" needs an associated label for accessibility.",
                snippet
            ),
            Priority::High,
        )
    } else {
        Suggestion::new(
            format!("Fix {} issue", issue.code),
            format!(
                "Address the {} issue: {}. Review the specific element and apply the appropriate fix.",
                issue.code, issue.message
            ),
            Priority::High,
        )
    };

    vec![
        specific,
        Suggestion::new(
            "Test with Assistive Technologies",
            format!(
                "After fixing this {} issue, test with screen readers and keyboard navigation to ensure it works correctly.",
                issue.code
            ),
            Priority::Medium,
        ),
    ]
}

pub fn generic_code_fix(issue: &Issue) -> CodeFix {
    CodeFix {
        description: format!("Recommended fix for {}", issue.code),
        before_code: non_empty_or(&issue.context, "Original code"),
        after_code: non_empty_or(&issue.context, "Fixed code"),
        explanation: format!(
            "Please review the {} guideline and apply the appropriate fix.",
            issue.code
        ),
    }
}

/// Code fix built from a bare AI `fix` string, or the generic one
pub fn code_fix_from(issue: &Issue, ai_fix: Option<&str>) -> CodeFix {
    match ai_fix {
        Some(fix) if !fix.is_empty() && !issue.context.is_empty() && fix != issue.context => {
            CodeFix {
                description: format!("Fix for {}: {}", issue.code, issue.message),
                before_code: issue.context.clone(),
                after_code: fix.to_string(),
                explanation: format!(
                    "This fix addresses the {} issue by modifying the element to meet accessibility requirements.",
                    issue.code
                ),
            }
        }
        _ => generic_code_fix(issue),
    }
}

pub fn severity(issue: &Issue) -> Severity {
    Severity::from_issue_type(issue.issue_type)
}

pub fn explanation(issue: &Issue) -> String {
    format!(
        "This {} ({}) needs attention: {}",
        issue.issue_type, issue.code, issue.message
    )
}

pub fn impact(issue: &Issue) -> String {
    format!(
        "This {} affects users with disabilities: {}",
        issue.issue_type, issue.message
    )
}

pub fn wcag_guideline(issue: &Issue) -> String {
    non_empty_or(&issue.code, "WCAG 2.1")
}

pub(crate) fn non_empty_or(value: &str, default: &str) -> String {
    if value.is_empty() {
        default.to_string()
    } else {
        value.to_string()
    }
}
