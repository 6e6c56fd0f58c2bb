//! Core traits for the suggestion filtering pipeline.

use catalog::{MovieSuggestion, SeenTitlesRegistry};

/// Core trait for filtering parsed suggestions.
///
/// Filters never fail: a suggestion is either kept or silently dropped,
/// since malformed or repeated model output is expected.
pub trait Filter: Send + Sync {
    /// Returns the name of this filter (for logging/debugging)
    fn name(&self) -> &str;

    /// Apply this filter to a set of suggestions.
    ///
    /// # Arguments
    /// * `suggestions` - The suggestions to filter, in response order (takes ownership)
    /// * `seen` - Titles already shown this session
    ///
    /// # Returns
    /// The surviving suggestions, order preserved
    fn apply(
        &self,
        suggestions: Vec<MovieSuggestion>,
        seen: &SeenTitlesRegistry,
    ) -> Vec<MovieSuggestion>;
}
