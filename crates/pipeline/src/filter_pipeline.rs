//! The FilterPipeline chains suggestion filters using the builder pattern.

use crate::filters::{AlreadySeenFilter, DistinctTitleFilter, PlausibleYearFilter};
use crate::traits::Filter;
use catalog::{MovieSuggestion, SeenTitlesRegistry};

/// Chains multiple filters together into a processing pipeline.
///
/// ## Usage
/// ```ignore
/// let pipeline = FilterPipeline::new()
///     .add_filter(PlausibleYearFilter::new())
///     .add_filter(AlreadySeenFilter)
///     .add_filter(DistinctTitleFilter);
///
/// let kept = pipeline.apply(parsed, &registry);
/// ```
pub struct FilterPipeline {
    filters: Vec<Box<dyn Filter>>,
}

impl FilterPipeline {
    /// Create a new empty FilterPipeline.
    pub fn new() -> Self {
        Self {
            filters: Vec::new(),
        }
    }

    /// The filters every live response goes through: implausible years,
    /// titles already shown, then repeats within the response itself.
    pub fn standard() -> Self {
        Self::new()
            .add_filter(PlausibleYearFilter::new())
            .add_filter(AlreadySeenFilter)
            .add_filter(DistinctTitleFilter)
    }

    /// Add a filter to the pipeline (builder pattern).
    pub fn add_filter(mut self, filter: impl Filter + 'static) -> Self {
        self.filters.push(Box::new(filter));
        self
    }

    pub fn len(&self) -> usize {
        self.filters.len()
    }

    pub fn is_empty(&self) -> bool {
        self.filters.is_empty()
    }

    /// Apply all filters in sequence.
    ///
    /// ## Algorithm
    /// 1. Start with the parsed suggestions
    /// 2. For each filter in order:
    ///    a. Log filter name and input count
    ///    b. Apply the filter
    ///    c. Log output count
    /// 3. Return the survivors
    pub fn apply(
        &self,
        suggestions: Vec<MovieSuggestion>,
        seen: &SeenTitlesRegistry,
    ) -> Vec<MovieSuggestion> {
        let mut current = suggestions;
        for filter in &self.filters {
            tracing::debug!(
                "Applying filter: {} (input count: {})",
                filter.name(),
                current.len()
            );
            current = filter.apply(current, seen);
            tracing::debug!(
                "Filter applied: {} (output count: {})",
                filter.name(),
                current.len()
            );
        }
        current
    }
}

impl Default for FilterPipeline {
    fn default() -> Self {
        Self::new()
    }
}
