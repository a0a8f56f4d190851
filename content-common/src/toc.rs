//! Heading outline of a markdown body, used for the table of contents on
//! detail pages.

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

static ATX_HEADING: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^ {0,3}(#{1,6})(?:[ \t]+(.*?))?(?:[ \t]+#+)?[ \t]*$").expect("valid heading regex")
});
static IMAGE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"!\[([^\]]*)\]\([^)]*\)").expect("valid image regex"));
static LINK: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\[([^\]]*)\]\([^)]*\)").expect("valid link regex"));
static STRONG: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(\*\*|__)(.+?)(\*\*|__)").expect("valid strong regex"));
static EMPHASIS: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\*([^*]+)\*|\b_([^_]+)_\b").expect("valid emphasis regex"));
static HTML_TAG: Lazy<Regex> = Lazy::new(|| Regex::new(r"<[^>]+>").expect("valid tag regex"));

/// A heading and its place in the document.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
pub struct Heading {
    /// 1 for `#`, up to 6 for `######`
    pub level: usize,
    /// Heading text with inline markup removed
    pub text: String,
    /// Unique fragment id for in-page links
    pub anchor: String,
    /// Byte offset of the heading line
    pub position: usize,
    /// Byte offset where the next heading starts, or the body length
    pub end_position: usize,
}

struct Fence {
    marker: char,
    len: usize,
}

fn fence_marker(line: &str) -> Option<Fence> {
    let trimmed = line.trim_start_matches(' ');
    if line.len() - trimmed.len() > 3 {
        return None;
    }
    let marker = trimmed.chars().next().filter(|c| *c == '`' || *c == '~')?;
    let len = trimmed.chars().take_while(|c| *c == marker).count();
    (len >= 3).then_some(Fence { marker, len })
}

/// Remove emphasis, code ticks, links and inline html from heading text.
pub fn strip_inline_markup(text: &str) -> String {
    let text = IMAGE.replace_all(text, "$1");
    let text = LINK.replace_all(&text, "$1");
    let text = STRONG.replace_all(&text, "$2");
    let text = EMPHASIS.replace_all(&text, "$1$2");
    let text = HTML_TAG.replace_all(&text, "");
    text.replace('`', "").trim().to_string()
}

/// GitHub-style fragment id: lowercase, spaces become dashes, punctuation
/// other than `-` and `_` is dropped.
pub fn slugify(text: &str) -> String {
    text.trim()
        .to_lowercase()
        .chars()
        .filter_map(|c| match c {
            ' ' => Some('-'),
            '-' | '_' => Some(c),
            c if c.is_alphanumeric() => Some(c),
            _ => None,
        })
        .collect()
}

/// Extract ATX headings (`#` .. `######`) from a markdown body.
///
/// Lines inside fenced code blocks are skipped. Anchors are unique within
/// the document: repeated headings get `-1`, `-2`, ... suffixes.
pub fn extract_headings(markdown: &str) -> Vec<Heading> {
    let mut headings: Vec<Heading> = Vec::new();
    let mut seen: HashMap<String, usize> = HashMap::new();
    let mut open_fence: Option<Fence> = None;
    let mut offset = 0;

    for line in markdown.split_inclusive('\n') {
        let position = offset;
        offset += line.len();
        let line = line.trim_end_matches(['\n', '\r']);

        if let Some(fence) = &open_fence {
            if let Some(closing) = fence_marker(line) {
                if closing.marker == fence.marker && closing.len >= fence.len {
                    open_fence = None;
                }
            }
            continue;
        }
        if let Some(fence) = fence_marker(line) {
            open_fence = Some(fence);
            continue;
        }

        let Some(caps) = ATX_HEADING.captures(line) else {
            continue;
        };
        let level = caps.get(1).map_or(0, |m| m.as_str().len());
        let text = caps
            .get(2)
            .map(|m| strip_inline_markup(m.as_str()))
            .unwrap_or_default();
        if text.is_empty() {
            continue;
        }

        let base = slugify(&text);
        let anchor = match seen.get_mut(&base) {
            Some(count) => {
                *count += 1;
                format!("{base}-{count}")
            }
            None => {
                seen.insert(base.clone(), 0);
                base
            }
        };

        if let Some(previous) = headings.last_mut() {
            previous.end_position = position;
        }
        headings.push(Heading {
            level,
            text,
            anchor,
            position,
            end_position: markdown.len(),
        });
    }

    headings
}
