//! Core domain types shared by every stage of the pipeline.
//!
//! - `Mood` / `MoodResult`: the canonical emotional bucket for a run
//! - `WeatherContext`: ambient weather for a run, tagged live or synthetic
//! - `MovieSuggestion`: one well-formed line of model output
//!
//! All of these are created once per pipeline run and never mutated
//! afterwards, so they are plain owned values with `Clone`.

use crate::error::CatalogError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Number of suggestions every recommendation contains.
pub const RESULT_SIZE: usize = 3;

// =============================================================================
// Mood
// =============================================================================

/// Canonical mood vocabulary.
///
/// The inference service speaks a much richer label space (angry, fear,
/// surprise, ...). Only these buckets are reasoned about downstream.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Mood {
    Happy,
    Sad,
    Romantic,
    Neutral,
}

impl Mood {
    /// Mood used whenever inference fails or matches nothing.
    pub const FALLBACK: Mood = Mood::Happy;

    /// Ordered substring rules for mapping a raw label. First match wins.
    const LABEL_RULES: [(&'static str, Mood); 4] = [
        ("happy", Mood::Happy),
        ("sad", Mood::Sad),
        ("romantic", Mood::Romantic),
        ("neutral", Mood::Romantic),
    ];

    /// Map a raw classifier label onto the canonical vocabulary.
    ///
    /// Matching is case-insensitive substring containment against an
    /// ordered rule list, so `"Happy face"` maps to `Happy` and a neutral
    /// face lands in the romantic/neutral bucket. Returns `None` when no
    /// rule applies.
    pub fn from_label(label: &str) -> Option<Mood> {
        let label = label.to_lowercase();
        Self::LABEL_RULES
            .iter()
            .find(|(needle, _)| label.contains(needle))
            .map(|(_, mood)| *mood)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Mood::Happy => "happy",
            Mood::Sad => "sad",
            Mood::Romantic => "romantic",
            Mood::Neutral => "neutral",
        }
    }
}

impl fmt::Display for Mood {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Mood {
    type Err = CatalogError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "happy" => Ok(Mood::Happy),
            "sad" => Ok(Mood::Sad),
            "romantic" => Ok(Mood::Romantic),
            "neutral" => Ok(Mood::Neutral),
            other => Err(CatalogError::UnknownMood(other.to_string())),
        }
    }
}

/// Where a mood value came from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MoodSource {
    Inferred,
    Fallback,
}

/// Result of mood inference for a single pipeline run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct MoodResult {
    pub mood: Mood,
    pub source: MoodSource,
}

impl MoodResult {
    pub fn inferred(mood: Mood) -> Self {
        Self {
            mood,
            source: MoodSource::Inferred,
        }
    }

    /// The fixed `{happy, Fallback}` result.
    pub fn fallback() -> Self {
        Self {
            mood: Mood::FALLBACK,
            source: MoodSource::Fallback,
        }
    }

    pub fn is_fallback(&self) -> bool {
        self.source == MoodSource::Fallback
    }
}

// =============================================================================
// Weather
// =============================================================================

/// Whether weather came from the lookup service or was made up
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum WeatherSource {
    Live,
    Synthetic,
}

/// Ambient weather for a single pipeline run.
///
/// Both variants are valid downstream input; `source` only matters to the
/// presentation layer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeatherContext {
    pub description: String,
    pub city_name: String,
    pub temperature_celsius: f32,
    pub source: WeatherSource,
}

impl WeatherContext {
    pub fn live(
        description: impl Into<String>,
        city_name: impl Into<String>,
        temperature_celsius: f32,
    ) -> Self {
        Self {
            description: description.into(),
            city_name: city_name.into(),
            temperature_celsius,
            source: WeatherSource::Live,
        }
    }

    /// Build a synthetic context from one of the fixed fallback labels.
    pub fn synthetic(label: &str, temperature_celsius: f32) -> Self {
        Self {
            description: label.to_string(),
            city_name: "Unknown".to_string(),
            temperature_celsius,
            source: WeatherSource::Synthetic,
        }
    }

    pub fn is_live(&self) -> bool {
        self.source == WeatherSource::Live
    }

    /// Human readable one-liner, e.g. `light rain in Pune, 24.5°C`.
    pub fn summary(&self) -> String {
        format!(
            "{} in {}, {:.1}°C",
            self.description, self.city_name, self.temperature_celsius
        )
    }
}

// =============================================================================
// Suggestions
// =============================================================================

/// One movie suggestion.
///
/// Only ever produced from a line that matched the
/// `Title (Year) - Genre - Summary` grammar, or from the curated catalog.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MovieSuggestion {
    pub title: String,
    pub year: u16,
    pub genre: String,
    pub summary: String,
    /// The line exactly as it was accepted (trimmed)
    pub raw_line: String,
}

impl MovieSuggestion {
    /// Build a suggestion from its parts, rendering `raw_line` in the
    /// canonical grammar.
    pub fn new(
        title: impl Into<String>,
        year: u16,
        genre: impl Into<String>,
        summary: impl Into<String>,
    ) -> Self {
        let title = title.into();
        let genre = genre.into();
        let summary = summary.into();
        let raw_line = format!("{} ({}) - {} - {}", title, year, genre, summary);
        Self {
            title,
            year,
            genre,
            summary,
            raw_line,
        }
    }

    /// Case- and whitespace-normalized title used for deduplication.
    pub fn normalized_title(&self) -> String {
        normalize_title(&self.title)
    }
}

/// Normalize a title for comparison: trim, collapse runs of whitespace,
/// lower-case.
pub fn normalize_title(title: &str) -> String {
    title
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .to_lowercase()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mood_from_label_first_match_wins() {
        assert_eq!(Mood::from_label("happy"), Some(Mood::Happy));
        assert_eq!(Mood::from_label("SAD"), Some(Mood::Sad));
        assert_eq!(Mood::from_label("neutral"), Some(Mood::Romantic));
        assert_eq!(Mood::from_label("unhappy and sad"), Some(Mood::Happy));
        assert_eq!(Mood::from_label("angry"), None);
    }

    #[test]
    fn test_mood_parse_and_display() {
        assert_eq!("Romantic".parse::<Mood>().unwrap(), Mood::Romantic);
        assert_eq!(Mood::Neutral.to_string(), "neutral");
        assert!(matches!(
            "grumpy".parse::<Mood>(),
            Err(CatalogError::UnknownMood(_))
        ));
    }

    #[test]
    fn test_normalize_title() {
        assert_eq!(normalize_title("  The   Matrix "), "the matrix");
        assert_eq!(normalize_title("AMÉLIE"), "amélie");
    }

    #[test]
    fn test_weather_summary() {
        let weather = WeatherContext::live("light rain", "Pune", 24.46);
        assert!(weather.is_live());
        assert_eq!(weather.summary(), "light rain in Pune, 24.5°C");

        let synthetic = WeatherContext::synthetic("Rainy", 18.0);
        assert!(!synthetic.is_live());
        assert_eq!(synthetic.source, WeatherSource::Synthetic);
    }

    #[test]
    fn test_suggestion_raw_line() {
        let movie = MovieSuggestion::new("Up", 2009, "Animation", "A house flies.");
        assert_eq!(movie.raw_line, "Up (2009) - Animation - A house flies.");
        assert_eq!(movie.normalized_title(), "up");
    }
}
