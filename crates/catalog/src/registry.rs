//! Registry of titles already shown during a session.
//!
//! One registry is created per application session and passed explicitly
//! to whoever needs it; there is no global instance.

use crate::types::normalize_title;
use std::collections::HashSet;

/// Set of previously surfaced titles, compared case-normalized.
///
/// Grows monotonically until `clear` wipes it wholesale.
#[derive(Debug, Default, Clone)]
pub struct SeenTitlesRegistry {
    /// Normalized titles for O(1) membership checks
    normalized: HashSet<String>,
    /// Titles as first surfaced, in insertion order (for prompts/display)
    titles: Vec<String>,
}

impl SeenTitlesRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether a title (in any casing/spacing) has been seen.
    pub fn contains(&self, title: &str) -> bool {
        self.normalized.contains(&normalize_title(title))
    }

    /// Record a title. Returns `true` if it was not already present.
    pub fn insert(&mut self, title: &str) -> bool {
        let inserted = self.normalized.insert(normalize_title(title));
        if inserted {
            self.titles.push(title.trim().to_string());
        }
        inserted
    }

    /// Forget every title.
    pub fn clear(&mut self) {
        self.normalized.clear();
        self.titles.clear();
    }

    /// Titles in the order they were first seen.
    pub fn titles(&self) -> &[String] {
        &self.titles
    }

    pub fn len(&self) -> usize {
        self.normalized.len()
    }

    pub fn is_empty(&self) -> bool {
        self.normalized.is_empty()
    }
}
