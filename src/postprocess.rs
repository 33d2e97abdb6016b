//! Cleaning and field extraction for generated markup
//!
//! Pure functions over strings: no I/O, no state. The backend is asked to
//! return an HTML fragment with a single `<h1>` and a hidden
//! `<div id="tags">` container; this module tolerates it doing so
//! imperfectly (wrapping the output in a code fence, omitting the heading,
//! scattering `#hashtags` through the text).

use std::collections::HashSet;
use std::sync::LazyLock;

use regex::Regex;

use crate::models::ParsedContent;

/// Upper bound on labels attached to one post
pub const MAX_TAGS: usize = 20;

static OPENING_FENCE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\A```(?:html|xhtml|xml|markdown|md)?").expect("valid regex")
});

static CLOSING_FENCE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"```\z").expect("valid regex"));

static HEADING: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?is)<h1(?:\s[^>]*)?>(.*?)</h1\s*>").expect("valid regex"));

static TAG_MARKUP: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"<[^<>]+>").expect("valid regex"));

static WHITESPACE_RUN: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\s+").expect("valid regex"));

static TAG_CONTAINER: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?is)<div\b[^>]*\bid\s*=\s*["']tags["'][^>]*>(.*?)</div\s*>"#)
        .expect("valid regex")
});

// Start of input or whitespace before `#`, so `color:#333` is not a hashtag.
static HASHTAG: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(?:\A|\s)#(\w+)").expect("valid regex"));

static HEX_COLOR: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\A(?:[0-9a-fA-F]{3}|[0-9a-fA-F]{6})\z").expect("valid regex")
});

/// Remove a wrapping Markdown code fence and surrounding whitespace.
///
/// Repeats until nothing changes, so nested fences are removed too and
/// applying it twice gives the same result as applying it once.
pub fn strip_code_fence(text: &str) -> &str {
    let mut current = text.trim();
    loop {
        let next = strip_fence_once(current);
        if next.len() == current.len() {
            return current;
        }
        current = next;
    }
}

fn strip_fence_once(text: &str) -> &str {
    let mut rest = text;
    if let Some(m) = OPENING_FENCE.find(rest) {
        rest = &rest[m.end()..];
    }
    if let Some(m) = CLOSING_FENCE.find(rest) {
        rest = &rest[..m.start()];
    }
    rest.trim()
}

/// Title from the first `<h1>`, or `fallback` when there is none.
///
/// Nested tags are dropped, entities decoded and whitespace collapsed.
/// A heading with no text also yields `fallback`.
pub fn extract_title(body: &str, fallback: &str) -> String {
    let Some(caps) = HEADING.captures(body) else {
        return fallback.to_string();
    };

    let inner = TAG_MARKUP.replace_all(&caps[1], "");
    let decoded = html_escape::decode_html_entities(&inner);
    let title = WHITESPACE_RUN.replace_all(decoded.trim(), " ");

    if title.is_empty() {
        fallback.to_string()
    } else {
        title.into_owned()
    }
}

/// Tags from the hidden container followed by inline hashtags.
///
/// Empty entries and hex color codes are dropped, duplicates collapse to
/// their first occurrence (case-sensitive) and at most [`MAX_TAGS`] are
/// returned.
pub fn extract_tags(body: &str) -> Vec<String> {
    let container = TAG_CONTAINER
        .captures(body)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str())
        .unwrap_or_default();

    let from_container = container
        .split(',')
        .map(|entry| entry.trim().trim_start_matches('#').trim());

    let from_hashtags = HASHTAG
        .captures_iter(body)
        .filter_map(|caps| caps.get(1))
        .map(|m| m.as_str());

    let mut seen = HashSet::new();
    from_container
        .chain(from_hashtags)
        .filter(|tag| !tag.is_empty() && !HEX_COLOR.is_match(tag))
        .filter(|tag| seen.insert(*tag))
        .take(MAX_TAGS)
        .map(str::to_string)
        .collect()
}

/// Run the full cleaning pass over raw backend output.
pub fn process(raw: &str, topic: &str) -> ParsedContent {
    let body = strip_code_fence(raw);
    ParsedContent {
        title: extract_title(body, topic),
        tags: extract_tags(body),
        body: body.to_string(),
    }
}
