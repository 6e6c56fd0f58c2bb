//! Filter to drop repeats inside a single model response.

use crate::traits::Filter;
use catalog::{MovieSuggestion, SeenTitlesRegistry};
use std::collections::HashSet;

/// Keeps the first occurrence of each normalized title.
pub struct DistinctTitleFilter;

impl Filter for DistinctTitleFilter {
    fn name(&self) -> &str {
        "DistinctTitleFilter"
    }

    fn apply(
        &self,
        suggestions: Vec<MovieSuggestion>,
        _seen: &SeenTitlesRegistry,
    ) -> Vec<MovieSuggestion> {
        let mut titles = HashSet::new();
        suggestions
            .into_iter()
            .filter(|suggestion| titles.insert(suggestion.normalized_title()))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_first_occurrence_wins() {
        let suggestions = vec![
            MovieSuggestion::new("Heat", 1995, "Crime", "First."),
            MovieSuggestion::new("Up", 2009, "Animation", "Balloons."),
            MovieSuggestion::new("HEAT", 1995, "Thriller", "Second."),
        ];

        let filtered = DistinctTitleFilter.apply(suggestions, &SeenTitlesRegistry::new());
        assert_eq!(filtered.len(), 2);
        assert_eq!(filtered[0].summary, "First.");
        assert_eq!(filtered[1].title, "Up");
    }
}
