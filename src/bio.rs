//! Bio rendering: untrusted free text in, safe clickable markup out.
//!
//! Raw biographies may contain explicit `<br>` tags, literal newlines,
//! `[label](url)` link syntax and bare URLs. Everything else is escaped.
//! Generated anchors carry a `data-dispatch` attribute with the literal
//! URL; the presentation layer routes clicks on them through the link
//! dispatcher.

use once_cell::sync::Lazy;
use regex::Regex;
use std::collections::HashSet;

/// Estimated characters per wrapped display line, tuned to the card width.
pub const CHARS_PER_LINE: usize = 20;

/// Placeholder protecting recognized break tags through the escaping pass.
/// Contains NUL bytes, so it is not reachable from normal text input.
const BR_SENTINEL: &str = "\u{0}BR\u{0}";

static BREAK_TAG: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?i)<br\s*/?>").unwrap());
static MARKDOWN_LINK: Lazy<Regex> = Lazy::new(|| Regex::new(r"\[([^\]]+)\]\(([^)]+)\)").unwrap());
// NUL is excluded so a bare URL stops at a lifted-anchor placeholder, the
// same way the scan stops at the `<` of an already-inserted anchor.
static BARE_URL: Lazy<Regex> = Lazy::new(|| Regex::new(r"https?://[^\s<\x00]+").unwrap());
static SEGMENT_BREAK: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?i)\n|<br\s*/?>").unwrap());
static MARKUP_TAG: Lazy<Regex> = Lazy::new(|| Regex::new(r"<[^>]+>").unwrap());

/// Escapes the five structurally significant markup characters.
///
/// Callers escape exactly once per raw source string; re-escaping produces
/// visibly double-encoded text rather than anything unsafe.
pub fn escape(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for ch in text.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            other => out.push(other),
        }
    }
    out
}

fn anchor(url: &str, label: &str) -> String {
    format!(
        "<a href=\"{url}\" class=\"bio-link\" target=\"_blank\" \
         rel=\"noopener noreferrer\" data-dispatch=\"{url}\">{label}</a>"
    )
}

/// Renders a raw biography into safe markup.
///
/// Order matters: break tags are protected behind a sentinel, the rest is
/// escaped, then breaks are restored, newlines converted, `[label](url)`
/// syntax linkified, and finally bare URLs autolinked. A bare URL that
/// already appears as an `href` target from the link-syntax pass is left
/// as plain text rather than wrapped a second time.
pub fn render(raw: &str) -> String {
    if raw.is_empty() {
        return String::new();
    }
    let protected = BREAK_TAG.replace_all(raw, BR_SENTINEL);
    let escaped = escape(&protected);
    let mut text = escaped.replace(BR_SENTINEL, "<br>").replace('\n', "<br>");

    // Lift explicit links out as placeholders so the bare-URL scan below
    // never sees the inside of a generated anchor.
    let mut anchors: Vec<String> = Vec::new();
    let mut hrefs: HashSet<String> = HashSet::new();
    text = MARKDOWN_LINK
        .replace_all(&text, |caps: &regex::Captures<'_>| {
            let label = &caps[1];
            let url = &caps[2];
            hrefs.insert(url.to_string());
            let slot = format!("\u{0}A{}\u{0}", anchors.len());
            anchors.push(anchor(url, label));
            slot
        })
        .into_owned();

    text = BARE_URL
        .replace_all(&text, |caps: &regex::Captures<'_>| {
            let url = caps.get(0).map_or("", |m| m.as_str());
            if hrefs.contains(url) {
                url.to_string()
            } else {
                anchor(url, url)
            }
        })
        .into_owned();

    for (index, markup) in anchors.iter().enumerate() {
        text = text.replace(&format!("\u{0}A{index}\u{0}"), markup);
    }
    text
}

/// Estimates whether the rendered bio would exceed `max_lines` display
/// lines. Width heuristic, not layout measurement; short-circuits as soon
/// as the running total passes the threshold.
pub fn estimate_overflow(raw: &str, max_lines: usize) -> bool {
    if raw.is_empty() {
        return false;
    }
    let mut total = 0usize;
    for segment in SEGMENT_BREAK.split(raw) {
        let plain = MARKDOWN_LINK.replace_all(segment, "$1");
        let plain = MARKUP_TAG.replace_all(&plain, "");
        let chars = plain.chars().count();
        total += chars.div_ceil(CHARS_PER_LINE).max(1);
        if total > max_lines {
            return true;
        }
    }
    false
}
