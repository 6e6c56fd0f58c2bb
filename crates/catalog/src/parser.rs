//! Parser for generated suggestion text.
//!
//! The text service is asked for lines of the form:
//!
//! ```text
//! Title (Year) - Genre - Summary
//! ```
//!
//! Models routinely wrap that in chatter, numbering or half-finished
//! lines. Anything that does not match the grammar is dropped silently;
//! nothing is repaired.

use crate::types::MovieSuggestion;
use regex::Regex;
use std::sync::LazyLock;

/// `Title (Year) - Genre - Summary`, with an optional list marker in front.
///
/// Separators are a hyphen, en dash or em dash with whitespace on both
/// sides, so hyphenated genres such as `Sci-Fi` stay intact.
static SUGGESTION_LINE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"^(?:(?:\d{1,2}[.)]|[-*•])\s+)?(?P<title>\S.*?)\s*\((?P<year>\d{4})\)\s+[-–—]\s+(?P<genre>\S.*?)\s+[-–—]\s+(?P<summary>\S.*)$",
    )
    .expect("suggestion grammar is a valid regex")
});

/// Parse one line. Returns `None` for anything outside the grammar.
pub fn parse_suggestion_line(line: &str) -> Option<MovieSuggestion> {
    let line = line.trim();
    if line.is_empty() {
        return None;
    }

    let caps = SUGGESTION_LINE.captures(line)?;
    let title = caps.name("title")?.as_str().trim();
    let year = caps.name("year")?.as_str().parse::<u16>().ok()?;
    let genre = caps.name("genre")?.as_str().trim();
    let summary = caps.name("summary")?.as_str().trim();

    if title.is_empty() || genre.is_empty() || summary.is_empty() {
        return None;
    }

    Some(MovieSuggestion {
        title: title.to_string(),
        year,
        genre: genre.to_string(),
        summary: summary.to_string(),
        raw_line: line.to_string(),
    })
}

/// Parse a whole response, keeping well-formed lines in response order.
pub fn parse_suggestions(text: &str) -> Vec<MovieSuggestion> {
    let suggestions: Vec<MovieSuggestion> =
        text.lines().filter_map(parse_suggestion_line).collect();
    tracing::debug!(
        "Parsed {} well-formed suggestion lines out of {}",
        suggestions.len(),
        text.lines().count()
    );
    suggestions
}
