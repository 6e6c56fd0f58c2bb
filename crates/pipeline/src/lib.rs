//! Turns mood + weather into exactly three movie suggestions.
//!
//! This crate provides:
//! - Filter trait and implementations for parsed model output
//! - FilterPipeline for composing filters
//! - PromptBuilder for the text generation request
//! - RecommendationEngine, which ties generation, filtering and the
//!   fallback catalog together
//!
//! ## Architecture
//! A recommendation is produced in stages:
//! 1. The prompt names mood, weather and every title already shown
//! 2. The generator's reply is parsed line by line; junk lines vanish
//! 3. Filters drop implausible, already-seen and repeated titles
//! 4. The fallback catalog fills whatever is missing
//!
//! ## Example Usage
//! ```ignore
//! use pipeline::RecommendationEngine;
//! use catalog::{FallbackCatalog, Mood, SeenTitlesRegistry};
//!
//! let engine = RecommendationEngine::new(generator, FallbackCatalog::curated());
//! let mut registry = SeenTitlesRegistry::new();
//!
//! let picks = engine.recommend(Mood::Sad, &weather, &mut registry).await;
//! assert_eq!(picks.len(), 3);
//! ```

pub mod engine;
pub mod filter_pipeline;
pub mod filters;
pub mod prompt;
pub mod traits;

// Re-export main types
pub use engine::RecommendationEngine;
pub use filter_pipeline::FilterPipeline;
pub use prompt::PromptBuilder;
pub use traits::Filter;
