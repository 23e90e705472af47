//! Lightweight pattern checks over HTML snippets
//!
//! Snippets come straight from the scanner and are often truncated, so
//! everything here is regex based rather than a real parse.

use lazy_static::lazy_static;
use regex::Regex;

lazy_static! {
    static ref SRC: Regex = Regex::new(r#"(?i)src=["']([^"']+)["']"#).unwrap();
    static ref CLASS: Regex = Regex::new(r#"(?i)class=["']([^"']+)["']"#).unwrap();
    static ref INPUT_TYPE: Regex = Regex::new(r#"(?i)type=["']([^"']+)["']"#).unwrap();
    static ref ID: Regex = Regex::new(r#"(?i)id=["']([^"']+)["']"#).unwrap();
    static ref NAME: Regex = Regex::new(r#"(?i)name=["']([^"']+)["']"#).unwrap();
    static ref VISIBLE_TEXT: Regex = Regex::new(r">([^<]+)<").unwrap();
    static ref EMPTY_ALT: Regex = Regex::new(r#"alt\s*=\s*["']\s*["']"#).unwrap();
    static ref ALT_ATTR: Regex = Regex::new(r#"(?i)alt=["'][^"']*["']?"#).unwrap();
    static ref HEX_COLOR: Regex = Regex::new(r"#[0-9a-fA-F]{3,6}").unwrap();
}

fn capture<'a>(re: &Regex, html: &'a str) -> Option<&'a str> {
    re.captures(html)
        .and_then(|c| c.get(1))
        .map(|m| m.as_str())
}

pub fn src(html: &str) -> Option<&str> {
    capture(&SRC, html)
}

pub fn class(html: &str) -> Option<&str> {
    capture(&CLASS, html)
}

pub fn input_type(html: &str) -> Option<&str> {
    capture(&INPUT_TYPE, html)
}

pub fn id(html: &str) -> Option<&str> {
    capture(&ID, html)
}

pub fn name(html: &str) -> Option<&str> {
    capture(&NAME, html)
}

pub fn is_inside_link(html: &str) -> bool {
    html.contains("<a") || html.contains("</a>")
}

pub fn is_button(html: &str) -> bool {
    html.contains("<button") || html.contains("</button>")
}

/// True when the first text run in the snippet is not just whitespace
pub fn has_visible_text(html: &str) -> bool {
    capture(&VISIBLE_TEXT, html).is_some_and(|text| !text.trim().is_empty())
}

pub fn has_empty_alt(html: &str) -> bool {
    html.contains(r#"alt="""#) || EMPTY_ALT.is_match(html)
}

/// Replace the first alt attribute with a descriptive placeholder
pub fn with_placeholder_alt(html: &str) -> String {
    ALT_ATTR
        .replace(html, r#"alt="Descriptive text""#)
        .into_owned()
}

/// Replace every hex colour in the snippet
pub fn replace_hex_colors(html: &str, color: &str) -> String {
    HEX_COLOR.replace_all(html, color).into_owned()
}

/// Only bare `<h3>` tags are promoted; an `<h3>` carrying attributes keeps its opening tag
pub fn promote_h3_to_h2(html: &str) -> String {
    html.replace("<h3>", "<h2>").replace("</h3>", "</h2>")
}

/// First `limit` characters, respecting char boundaries
pub fn excerpt(html: &str, limit: usize) -> &str {
    match html.char_indices().nth(limit) {
        Some((idx, _)) => &html[..idx],
        None => html,
    }
}
