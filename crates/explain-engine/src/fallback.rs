//! Rule-based explanations used when no completion service answers
//!
//! Dispatch looks at the lower-cased issue code and message; the first
//! matching rule wins. Every rule produces a fully populated record.

use shared_types::{CodeFix, ExplanationRecord, Issue, IssueDetails, Priority, Severity, Suggestion};

use crate::defaults::{self, Keywords};
use crate::html;

const DEFAULT_ALT: &str = "Description of image";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FallbackRule {
    MissingAltText,
    Contrast,
    MissingLabel,
    HeadingOrder,
    Generic,
}

impl FallbackRule {
    pub fn classify(issue: &Issue) -> Self {
        let kw = Keywords::of(issue);
        if kw.code_has("h30") || kw.message_has("alt") || kw.message_has("alternative") {
            FallbackRule::MissingAltText
        } else if kw.code_has("g18") || kw.message_has("contrast") {
            FallbackRule::Contrast
        } else if kw.either_has("label") {
            FallbackRule::MissingLabel
        } else if kw.either_has("heading") {
            FallbackRule::HeadingOrder
        } else {
            FallbackRule::Generic
        }
    }
}

pub fn explain(issue: &Issue) -> ExplanationRecord {
    let context = issue.context.as_str();
    let details = |impact: &str, wcag: &str, severity: Severity| IssueDetails {
        impact: impact.to_string(),
        wcag_guideline: wcag.to_string(),
        affected_users: defaults::affected_users(issue),
        severity,
    };

    match FallbackRule::classify(issue) {
        FallbackRule::MissingAltText => {
            let fixed = fix_missing_alt(context);
            ExplanationRecord {
                explanation: "This image does not have alternative text, so screen reader users cannot understand what the image represents.".into(),
                fix: fixed.clone(),
                details: details(
                    "Screen reader users will not know what information the image conveys, making the content inaccessible to them.",
                    "WCAG 2.1 Level A - 1.1.1 Non-text Content",
                    Severity::High,
                ),
                suggestions: vec![
                    Suggestion::new(
                        "Add descriptive alt text",
                        "Provide meaningful alternative text that describes the image content and purpose. For decorative images, use an empty alt attribute.",
                        Priority::High,
                    )
                    .with_example(r#"alt="A red bicycle parked outside a building""#),
                    Suggestion::new(
                        "Use empty alt for decorative images",
                        r#"If the image is purely decorative and doesn't convey information, use alt="" to hide it from screen readers."#,
                        Priority::Medium,
                    ),
                ],
                code_fixes: vec![CodeFix {
                    description: "Add alt attribute with descriptive text".into(),
                    before_code: defaults::non_empty_or(context, r#"<img src="image.jpg">"#),
                    after_code: fixed,
                    explanation: "The alt attribute provides text alternatives that screen readers can announce to users.".into(),
                }],
            }
        }
        FallbackRule::Contrast => ExplanationRecord {
            explanation: "The text color contrast ratio is insufficient, making it difficult for users with low vision to read the content.".into(),
            fix: "Adjust text and background colors to meet WCAG contrast requirements (4.5:1 for normal text, 3:1 for large text).".into(),
            details: details(
                "Users with low vision, color blindness, or those using devices in bright sunlight may struggle to read the text.",
                "WCAG 2.1 Level AA - 1.4.3 Contrast (Minimum)",
                Severity::High,
            ),
            suggestions: vec![
                Suggestion::new(
                    "Increase color contrast ratio",
                    "Ensure text has a contrast ratio of at least 4.5:1 for normal text and 3:1 for large text (18pt or 14pt bold) against the background.",
                    Priority::High,
                ),
                Suggestion::new(
                    "Use contrast checking tools",
                    "Use tools like WebAIM Contrast Checker to verify your color combinations meet WCAG requirements.",
                    Priority::Medium,
                ),
            ],
            code_fixes: vec![CodeFix {
                description: "Update CSS to improve contrast".into(),
                before_code: defaults::non_empty_or(
                    context,
                    r#"<p style="color: #ccc;">Low contrast text</p>"#,
                ),
                after_code: defaults::non_empty_or(
                    &html::replace_hex_colors(context, "#000000"),
                    r#"<p style="color: #000;">High contrast text</p>"#,
                ),
                explanation: "Use darker text colors on light backgrounds or lighter text on dark backgrounds to achieve sufficient contrast.".into(),
            }],
        },
        FallbackRule::MissingLabel => {
            let fixed = fix_missing_label(context);
            ExplanationRecord {
                explanation: "This form element is missing a label, so screen reader users cannot understand what input is expected.".into(),
                fix: fixed.clone(),
                details: details(
                    "Screen reader users cannot identify what information should be entered in the form field, making forms unusable.",
                    "WCAG 2.1 Level A - 3.3.2 Labels or Instructions",
                    Severity::High,
                ),
                suggestions: vec![
                    Suggestion::new(
                        "Associate labels with inputs",
                        r#"Use the <label> element with the "for" attribute matching the input's "id", or wrap the input inside the label."#,
                        Priority::High,
                    ),
                    Suggestion::new(
                        "Use aria-label as fallback",
                        "If visual design doesn't allow a visible label, use aria-label or aria-labelledby to provide an accessible name.",
                        Priority::Medium,
                    ),
                ],
                code_fixes: vec![CodeFix {
                    description: "Add associated label element".into(),
                    before_code: defaults::non_empty_or(context, r#"<input type="text">"#),
                    after_code: fixed,
                    explanation: "Labels provide visible text and programmatic association that screen readers can announce.".into(),
                }],
            }
        }
        FallbackRule::HeadingOrder => ExplanationRecord {
            explanation: "The heading structure is incorrect, which makes it difficult for screen reader users to navigate the page content.".into(),
            fix: "Ensure headings follow a logical hierarchy (h1, h2, h3, etc.) without skipping levels.".into(),
            details: details(
                "Screen reader users rely on headings to navigate pages. Incorrect structure makes content navigation confusing and inefficient.",
                "WCAG 2.1 Level A - 1.3.1 Info and Relationships",
                Severity::Medium,
            ),
            suggestions: vec![
                Suggestion::new(
                    "Maintain logical heading order",
                    "Start with h1, then h2, then h3, etc. Do not skip heading levels (e.g., h1 to h3). Each page should have only one h1.",
                    Priority::High,
                ),
                Suggestion::new(
                    "Use headings for structure, not styling",
                    "Choose heading levels based on content hierarchy, not visual appearance. Use CSS for styling instead.",
                    Priority::Medium,
                ),
            ],
            code_fixes: vec![CodeFix {
                description: "Correct heading hierarchy".into(),
                before_code: defaults::non_empty_or(context, "<h1>Title</h1><h3>Subtitle</h3>"),
                after_code: defaults::non_empty_or(
                    &html::promote_h3_to_h2(context),
                    "<h1>Title</h1><h2>Subtitle</h2>",
                ),
                explanation: "Heading levels should follow a logical sequence without skipping levels.".into(),
            }],
        },
        FallbackRule::Generic => ExplanationRecord {
            explanation: format!(
                "This accessibility issue ({}) may affect users with disabilities. {}",
                issue.code, issue.message
            ),
            fix: defaults::non_empty_or(
                context,
                "Review the HTML structure and ensure it follows accessibility best practices.",
            ),
            details: details(
                "This issue may prevent users with disabilities from accessing or understanding the content.",
                &defaults::wcag_guideline(issue),
                defaults::severity(issue),
            ),
            suggestions: vec![
                Suggestion::new(
                    "Review WCAG guidelines",
                    format!("Review the {} guideline to understand the requirement.", issue.code),
                    Priority::High,
                ),
                Suggestion::new(
                    "Test with assistive technologies",
                    "Test your implementation with screen readers and other assistive technologies.",
                    Priority::Medium,
                ),
            ],
            code_fixes: vec![CodeFix {
                description: "Review and fix the issue".into(),
                before_code: defaults::non_empty_or(context, "Original code"),
                after_code: defaults::non_empty_or(context, "Fixed code"),
                explanation: "Please review the accessibility guidelines for this specific issue.".into(),
            }],
        },
    }
}

/// Synthesise an `<img>` with a guessed alt text
pub fn fix_missing_alt(html: &str) -> String {
    if html.is_empty() {
        return format!(r#"<img src="..." alt="{}">"#, DEFAULT_ALT);
    }

    let src = html::src(html).unwrap_or("...");
    let class = html::class(html);

    let from_class = class.map(str::to_lowercase).and_then(|c| {
        if c.contains("logo") {
            Some("Company logo")
        } else if c.contains("icon") {
            Some("Icon")
        } else if c.contains("photo") {
            Some("Photo")
        } else if c.contains("image") {
            Some("Image")
        } else {
            None
        }
    });

    let alt = from_class.unwrap_or_else(|| {
        let s = src.to_lowercase();
        if s.contains("logo") {
            "Company logo"
        } else if s.contains("icon") {
            "Icon"
        } else if s.contains("photo") || s.contains("image") {
            "Image"
        } else {
            DEFAULT_ALT
        }
    });

    let class_attr = class
        .map(|c| format!(r#" class="{}""#, c))
        .unwrap_or_default();

    format!(r#"<img src="{}" alt="{}"{}>"#, src, alt, class_attr)
}

/// Synthesise a `<label>` + `<input>` pair from the input's attributes
pub fn fix_missing_label(html: &str) -> String {
    if html.is_empty() {
        return "<label for=\"input-id\">Input Label</label>\n<input id=\"input-id\" type=\"text\">"
            .into();
    }

    let input_type = html::input_type(html).unwrap_or("text");
    let id = html::id(html);
    let input_id = id.or_else(|| html::name(html)).unwrap_or("input-id");
    let label = id
        .map(|id| id.replace(['-', '_'], " "))
        .map(|text| capitalize(&text))
        .unwrap_or_else(|| "Input Label".into());

    format!(
        "<label for=\"{}\">{}</label>\n<input id=\"{}\" type=\"{}\">",
        input_id, label, input_id, input_type
    )
}

fn capitalize(text: &str) -> String {
    let mut chars = text.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use proptest::prelude::*;
    use shared_types::IssueType;

    fn issue(code: &str, message: &str, issue_type: IssueType, context: &str) -> Issue {
        Issue::new(code, message, issue_type, "html > body", context)
    }

    #[test]
    fn test_rule_dispatch_order() {
        let cases = [
            (
                "WCAG2AA.Principle1.Guideline1_1.1_1_1.H30.2",
                "Img element is the only content of the link",
                FallbackRule::MissingAltText,
            ),
            (
                "H37",
                "Img element missing an alt attribute",
                FallbackRule::MissingAltText,
            ),
            (
                "WCAG2AA.Principle1.Guideline1_4.1_4_3.G18.Fail",
                "This element has insufficient contrast",
                FallbackRule::Contrast,
            ),
            (
                "WCAG2AA.Principle1.Guideline1_3.1_3_1.F68",
                "This form field should be labelled",
                FallbackRule::MissingLabel,
            ),
            (
                "WCAG2AA.Principle1.Guideline1_3.1_3_1_A.G141",
                "The heading structure is not logically nested",
                FallbackRule::HeadingOrder,
            ),
            (
                "WCAG2AA.Principle2.Guideline2_4.2_4_2.H25.2",
                "Check that the title element describes the document",
                FallbackRule::Generic,
            ),
        ];
        for (code, message, expected) in cases {
            assert_eq!(
                FallbackRule::classify(&issue(code, message, IssueType::Error, "")),
                expected,
                "{}",
                code
            );
        }
    }

    #[test]
    fn test_alt_rule_synthesises_image() {
        let record = explain(&issue(
            "H30",
            "Img element missing",
            IssueType::Error,
            r#"<img src="/assets/logo.png">"#,
        ));
        assert_eq!(record.fix, r#"<img src="/assets/logo.png" alt="Company logo">"#);
        assert_eq!(record.details.severity, Severity::High);
        assert!(record.details.wcag_guideline.contains("1.1.1"));
        assert_eq!(record.code_fixes[0].before_code, r#"<img src="/assets/logo.png">"#);
        assert_eq!(
            record.details.affected_users,
            vec!["Screen reader users", "Users with slow connections"]
        );
    }

    #[test]
    fn test_fix_missing_alt_guesses() {
        assert_eq!(fix_missing_alt(""), r#"<img src="..." alt="Description of image">"#);
        assert_eq!(
            fix_missing_alt(r#"<img class="hero-photo" src="banner.jpg">"#),
            r#"<img src="banner.jpg" alt="Photo" class="hero-photo">"#
        );
        assert_eq!(
            fix_missing_alt(r#"<img src="/icons/search-icon.svg">"#),
            r#"<img src="/icons/search-icon.svg" alt="Icon">"#
        );
        assert_eq!(
            fix_missing_alt(r#"<img src="/uploads/photo-42.jpg">"#),
            r#"<img src="/uploads/photo-42.jpg" alt="Image">"#
        );
        assert_eq!(
            fix_missing_alt(r#"<img src="/a/b.png">"#),
            r#"<img src="/a/b.png" alt="Description of image">"#
        );
    }

    #[test]
    fn test_fix_missing_label() {
        assert_eq!(
            fix_missing_label(""),
            "<label for=\"input-id\">Input Label</label>\n<input id=\"input-id\" type=\"text\">"
        );
        assert_eq!(
            fix_missing_label(r#"<input type="email" id="user-email">"#),
            "<label for=\"user-email\">User email</label>\n<input id=\"user-email\" type=\"email\">"
        );
        // name stands in for the id but does not produce label text
        assert_eq!(
            fix_missing_label(r#"<input name="q">"#),
            "<label for=\"q\">Input Label</label>\n<input id=\"q\" type=\"text\">"
        );
    }

    #[test]
    fn test_contrast_rule_rewrites_colors() {
        let record = explain(&issue(
            "G18",
            "insufficient contrast",
            IssueType::Warning,
            r#"<span style="color:#777">Read me</span>"#,
        ));
        assert_eq!(
            record.code_fixes[0].after_code,
            r#"<span style="color:#000000">Read me</span>"#
        );
        assert!(record.details.wcag_guideline.contains("1.4.3"));
        assert_eq!(record.details.severity, Severity::High);
    }

    #[test]
    fn test_heading_rule() {
        let record = explain(&issue(
            "G141",
            "Heading levels skipped",
            IssueType::Error,
            "<h1>A</h1><h3>B</h3>",
        ));
        assert_eq!(record.code_fixes[0].after_code, "<h1>A</h1><h2>B</h2>");
        assert_eq!(record.details.severity, Severity::Medium);
    }

    #[test]
    fn test_generic_rule_without_context() {
        let record = explain(&issue("H25.2", "Check the title", IssueType::Notice, ""));
        assert_eq!(record.details.severity, Severity::Low);
        assert_eq!(record.details.wcag_guideline, "H25.2");
        assert!(record.is_fully_populated());
    }

    fn issue_type() -> impl Strategy<Value = IssueType> {
        prop_oneof![
            Just(IssueType::Error),
            Just(IssueType::Warning),
            Just(IssueType::Notice),
        ]
    }

    proptest! {
        #[test]
        fn prop_fallback_is_fully_populated(
            code in "[A-Za-z0-9_.]{1,40}",
            message in "[ -~]{1,80}",
            context in "[ -~]{0,80}",
            issue_type in issue_type(),
        ) {
            let record = explain(&issue(&code, &message, issue_type, &context));
            prop_assert!(record.is_fully_populated());
        }

        #[test]
        fn prop_generic_severity_follows_type(
            code in "[0-9]{1,8}",
            issue_type in issue_type(),
        ) {
            let i = issue(&code, "plain finding", issue_type, "");
            prop_assert_eq!(FallbackRule::classify(&i), FallbackRule::Generic);
            prop_assert_eq!(explain(&i).details.severity, Severity::from_issue_type(issue_type));
        }
    }
}
