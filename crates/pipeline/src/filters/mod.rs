//! Filter implementations for the suggestion pipeline.
//!
//! This module contains all the concrete filter implementations
//! that can be composed into a FilterPipeline.

pub mod already_seen;
pub mod distinct_title;
pub mod plausible_year;

// Re-export for convenience
pub use already_seen::AlreadySeenFilter;
pub use distinct_title::DistinctTitleFilter;
pub use plausible_year::PlausibleYearFilter;
