//! Prompt construction for the completion service

use shared_types::Issue;

use crate::html;

pub const SYSTEM_PROMPT: &str = "You are an expert WCAG 2.1 / 2.2 accessibility auditor.\n\n\
You analyze accessibility issues detected by automated tools (Pa11y, axe, Lighthouse).\n\
You clearly classify findings as Pass, Warning, or Fail.\n\
You explain issues in simple language for frontend developers.\n\
You always prefer semantic HTML and avoid unnecessary ARIA.\n\
You provide minimal, standards-compliant fixes only when required.";

const RESPONSE_SCHEMA: &str = r#"{
  "title": "Short, clear issue title",
  "verdict": "Pass | Warning | Fail",
  "wcag": {
    "criterion": "Include success criterion number (e.g., '1.1.1')",
    "name": "Include success criterion name (e.g., 'Non-text Content')"
  },
  "explanation": "Explain in simple terms why this happens (1-2 sentences)",
  "isProblem": true | false,
  "problemReasoning": "One-line reasoning if isProblem is true, otherwise explain why it's not a problem",
  "solution": {
    "required": true | false,
    "code": "If required is true, show the corrected HTML code. If false, say 'No action required'"
  },
  "developerNote": "One short tip or best practice"
}"#;

const INSTRUCTIONS: &str = r#"IMPORTANT:
- Analyze the SPECIFIC HTML code provided above
- Reference actual attributes, content, and context
- If the image/element is decorative and already has accessible text nearby, verdict should be "Pass" and isProblem should be false
- Prefer semantic HTML over ARIA when possible
- Only provide fixes when actually needed
- Ensure all JSON is valid and properly escaped"#;

/// Observations about the snippet that help the model judge it
pub fn context_hints(snippet: &str) -> Vec<&'static str> {
    let mut hints = Vec::new();
    if html::is_inside_link(snippet) {
        hints.push("The element is inside a clickable link (<a>)");
    }
    if html::is_button(snippet) {
        hints.push("The element is inside or is a button");
    }
    if html::has_visible_text(snippet) {
        hints.push("The link also contains visible text");
    }
    if html::has_empty_alt(snippet) {
        hints.push("The image uses an empty alt attribute");
    }
    hints
}

pub fn build_prompt(issue: &Issue) -> String {
    let snippet = if issue.context.is_empty() {
        "N/A"
    } else {
        issue.context.as_str()
    };

    let hints = context_hints(snippet);
    let context = if hints.is_empty() {
        "- No additional context provided".to_string()
    } else {
        hints
            .iter()
            .map(|h| format!("- {}", h))
            .collect::<Vec<_>>()
            .join("\n")
    };

    format!(
        "Analyze the following accessibility issue and generate a solution for the end user.\n\n\
         Issue message:\n\"{message}\"\n\n\
         HTML snippet:\n```html\n{snippet}\n```\n\n\
         Context:\n{context}\n\n\
         Provide the response in the following structured format ONLY as valid JSON:\n\n\
         {schema}\n\n\
         {instructions}",
        message = issue.message,
        snippet = snippet,
        context = context,
        schema = RESPONSE_SCHEMA,
        instructions = INSTRUCTIONS,
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use shared_types::IssueType;

    #[test]
    fn test_prompt_embeds_issue() {
        let issue = Issue::new(
            "H30",
            "Img element is the only content of the link",
            IssueType::Error,
            "a > img",
            r#"<a href="/"><img src="logo.png" alt=""></a>"#,
        );
        let prompt = build_prompt(&issue);

        assert!(prompt.contains("Issue message:\n\"Img element is the only content of the link\""));
        assert!(prompt.contains("```html\n<a href=\"/\"><img src=\"logo.png\" alt=\"\"></a>\n```"));
        assert!(prompt.contains("- The element is inside a clickable link (<a>)"));
        assert!(prompt.contains("- The image uses an empty alt attribute"));
        assert!(!prompt.contains("visible text"));
        assert!(prompt.contains("\"verdict\": \"Pass | Warning | Fail\""));
        assert!(prompt.ends_with("- Ensure all JSON is valid and properly escaped"));
    }

    #[test]
    fn test_prompt_without_context() {
        let issue = Issue::new("H25.2", "Check the title", IssueType::Notice, "html", "");
        let prompt = build_prompt(&issue);
        assert!(prompt.contains("```html\nN/A\n```"));
        assert!(prompt.contains("Context:\n- No additional context provided"));
    }

    #[test]
    fn test_hints_for_button_with_text() {
        let hints = context_hints("<button><span>Save</span></button>");
        assert_eq!(
            hints,
            vec![
                "The element is inside or is a button",
                "The link also contains visible text"
            ]
        );
    }

    #[test]
    fn test_system_prompt_lines() {
        assert!(SYSTEM_PROMPT.starts_with(
            "You are an expert WCAG 2.1 / 2.2 accessibility auditor.\n\nYou analyze"
        ));
        assert_eq!(SYSTEM_PROMPT.lines().count(), 7);
    }
}
