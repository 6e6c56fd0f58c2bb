//! Curated fallback catalog.
//!
//! Used only when live generation under-delivers. The list is ordered and
//! immutable; top-ups always walk it from the start.

use crate::error::{CatalogError, Result};
use crate::types::{MovieSuggestion, RESULT_SIZE};
use std::collections::HashSet;

/// Fixed, ordered list of curated suggestions.
#[derive(Debug, Clone)]
pub struct FallbackCatalog {
    entries: Vec<MovieSuggestion>,
}

impl FallbackCatalog {
    /// Build a catalog from arbitrary entries.
    ///
    /// Fails if there are fewer than `RESULT_SIZE` entries or if two
    /// entries share a normalized title; either would make it impossible
    /// to always return a full, distinct result.
    pub fn new(entries: Vec<MovieSuggestion>) -> Result<Self> {
        if entries.len() < RESULT_SIZE {
            return Err(CatalogError::TooFewEntries {
                needed: RESULT_SIZE,
                found: entries.len(),
            });
        }

        let mut seen = HashSet::new();
        for entry in &entries {
            if !seen.insert(entry.normalized_title()) {
                return Err(CatalogError::DuplicateTitle(entry.title.clone()));
            }
        }

        Ok(Self { entries })
    }

    /// The built-in curated list.
    pub fn curated() -> Self {
        let entries = vec![
            MovieSuggestion::new(
                "The Secret Life of Walter Mitty",
                2013,
                "Adventure",
                "A daydreaming photo editor sets off on a real journey across the world.",
            ),
            MovieSuggestion::new(
                "Paddington 2",
                2017,
                "Family",
                "A polite bear tries to clear his name after being framed for theft.",
            ),
            MovieSuggestion::new(
                "Amélie",
                2001,
                "Romance",
                "A shy Parisian waitress quietly rearranges the lives of those around her.",
            ),
            MovieSuggestion::new(
                "The Intouchables",
                2011,
                "Comedy",
                "A wealthy quadriplegic and his carer form an unlikely friendship.",
            ),
            MovieSuggestion::new(
                "Inside Out",
                2015,
                "Animation",
                "The emotions inside a young girl's head navigate a difficult move.",
            ),
            MovieSuggestion::new(
                "About Time",
                2013,
                "Romance",
                "A young man who can travel in time learns what really matters.",
            ),
            MovieSuggestion::new(
                "The Grand Budapest Hotel",
                2014,
                "Comedy",
                "A legendary concierge and his lobby boy are caught up in a stolen painting affair.",
            ),
            MovieSuggestion::new(
                "Good Will Hunting",
                1997,
                "Drama",
                "A gifted janitor confronts his past with the help of a therapist.",
            ),
            MovieSuggestion::new(
                "Spirited Away",
                2001,
                "Fantasy",
                "A girl must work in a spirit bathhouse to free her parents.",
            ),
            MovieSuggestion::new(
                "The Shawshank Redemption",
                1994,
                "Drama",
                "Two imprisoned men bond over years, finding solace and redemption.",
            ),
        ];

        Self { entries }
    }

    pub fn entries(&self) -> &[MovieSuggestion] {
        &self.entries
    }

    pub fn iter(&self) -> impl Iterator<Item = &MovieSuggestion> {
        self.entries.iter()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl Default for FallbackCatalog {
    fn default() -> Self {
        Self::curated()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_curated_catalog_is_valid() {
        let curated = FallbackCatalog::curated();
        let rebuilt = FallbackCatalog::new(curated.entries().to_vec());
        assert!(rebuilt.is_ok());
        assert!(curated.len() >= RESULT_SIZE);
    }

    #[test]
    fn test_rejects_short_catalog() {
        let entries = vec![
            MovieSuggestion::new("A", 2000, "Drama", "a"),
            MovieSuggestion::new("B", 2000, "Drama", "b"),
        ];
        assert_eq!(
            FallbackCatalog::new(entries).unwrap_err(),
            CatalogError::TooFewEntries {
                needed: 3,
                found: 2
            }
        );
    }

    #[test]
    fn test_rejects_duplicate_normalized_titles() {
        let entries = vec![
            MovieSuggestion::new("Up", 2009, "Animation", "a"),
            MovieSuggestion::new("Heat", 1995, "Crime", "b"),
            MovieSuggestion::new("  UP ", 2009, "Animation", "c"),
        ];
        assert!(matches!(
            FallbackCatalog::new(entries),
            Err(CatalogError::DuplicateTitle(_))
        ));
    }
}
