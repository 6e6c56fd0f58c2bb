//! Filter for release years a model could not mean.
//!
//! Lines with a year before the first film or past next year are
//! treated as malformed output and dropped, never corrected.

use crate::traits::Filter;
use catalog::{MovieSuggestion, SeenTitlesRegistry};
use chrono::Datelike;

/// Year of the earliest surviving motion picture.
pub const EARLIEST_FILM_YEAR: u16 = 1888;

/// Keeps suggestions whose year lies in `[earliest, latest]`.
pub struct PlausibleYearFilter {
    earliest: u16,
    latest: u16,
}

impl PlausibleYearFilter {
    /// Bounds from 1888 through next calendar year (local time).
    pub fn new() -> Self {
        let next_year = chrono::Local::now().year().saturating_add(1);
        let latest = u16::try_from(next_year).unwrap_or(u16::MAX);
        Self::with_bounds(EARLIEST_FILM_YEAR, latest)
    }

    pub fn with_bounds(earliest: u16, latest: u16) -> Self {
        Self { earliest, latest }
    }
}

impl Default for PlausibleYearFilter {
    fn default() -> Self {
        Self::new()
    }
}

impl Filter for PlausibleYearFilter {
    fn name(&self) -> &str {
        "PlausibleYearFilter"
    }

    fn apply(
        &self,
        suggestions: Vec<MovieSuggestion>,
        _seen: &SeenTitlesRegistry,
    ) -> Vec<MovieSuggestion> {
        suggestions
            .into_iter()
            .filter(|suggestion| (self.earliest..=self.latest).contains(&suggestion.year))
            .collect()
    }
}
