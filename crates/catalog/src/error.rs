//! Error types for the catalog crate.
//!
//! Parsing model output never produces an error (bad lines are simply
//! dropped), so these only cover building a catalog and reading
//! user-supplied values such as a mood name.

use thiserror::Error;

/// Errors that can occur while building catalog data
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CatalogError {
    /// Not enough entries to ever fill a full result
    #[error("Fallback catalog needs at least {needed} entries but found {found}")]
    TooFewEntries { needed: usize, found: usize },

    /// Two entries normalize to the same title
    #[error("Duplicate title in fallback catalog: {0}")]
    DuplicateTitle(String),

    /// A mood name that is not part of the canonical vocabulary
    #[error("Unknown mood: {0}")]
    UnknownMood(String),
}

/// Convenience type alias for Results in this crate
pub type Result<T> = std::result::Result<T, CatalogError>;
