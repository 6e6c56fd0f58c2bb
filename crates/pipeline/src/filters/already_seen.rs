//! Filter to remove titles already shown this session.

use crate::traits::Filter;
use catalog::{MovieSuggestion, SeenTitlesRegistry};

/// Removes suggestions whose normalized title is in the registry.
///
/// ## Algorithm
/// Uses the registry's normalized HashSet for O(1) lookups, so
/// "the grand  budapest HOTEL" matches "The Grand Budapest Hotel".
pub struct AlreadySeenFilter;

impl Filter for AlreadySeenFilter {
    fn name(&self) -> &str {
        "AlreadySeenFilter"
    }

    fn apply(
        &self,
        suggestions: Vec<MovieSuggestion>,
        seen: &SeenTitlesRegistry,
    ) -> Vec<MovieSuggestion> {
        suggestions
            .into_iter()
            .filter(|suggestion| !seen.contains(&suggestion.title))
            .collect()
    }
}
