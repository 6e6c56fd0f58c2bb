//! # Catalog Crate
//!
//! Domain types and fixed data for the mood + weather recommender.
//!
//! ## Main Components
//!
//! - **types**: `Mood`, `MoodResult`, `WeatherContext`, `MovieSuggestion`
//! - **parser**: the `Title (Year) - Genre - Summary` line grammar
//! - **fallback**: the curated `FallbackCatalog`
//! - **registry**: the session-scoped `SeenTitlesRegistry`
//! - **error**: error types for building catalog data
//!
//! ## Example Usage
//!
//! ```ignore
//! use catalog::{parse_suggestions, FallbackCatalog, SeenTitlesRegistry};
//!
//! let mut registry = SeenTitlesRegistry::new();
//! for movie in parse_suggestions(&generated_text) {
//!     if registry.insert(&movie.title) {
//!         println!("{}", movie.raw_line);
//!     }
//! }
//! ```

// Public modules
pub mod error;
pub mod fallback;
pub mod parser;
pub mod registry;
pub mod types;

// Re-export commonly used types for convenience
pub use error::{CatalogError, Result};
pub use fallback::FallbackCatalog;
pub use parser::{parse_suggestion_line, parse_suggestions};
pub use registry::SeenTitlesRegistry;
pub use types::{
    normalize_title, Mood, MoodResult, MoodSource, MovieSuggestion, WeatherContext,
    WeatherSource, RESULT_SIZE,
};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parsed_suggestions_serialize() {
        let movies = parse_suggestions("Up (2009) - Animation - An old man flies.");
        let json = serde_json::to_string(&movies).unwrap();
        assert!(json.contains("\"title\":\"Up\""));
        assert!(json.contains("\"raw_line\""));
    }
}
