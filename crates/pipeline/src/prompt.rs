//! Prompt construction for the text generation service.

use catalog::{Mood, WeatherContext, RESULT_SIZE};
use std::fmt::Write;

/// Renders the instruction sent to the text model.
///
/// ## Layout
/// 1. The request line naming mood, weather and the required line format
/// 2. An exclusion list of every title already shown (omitted when empty)
/// 3. A one-line-per-suggestion instruction
/// 4. A random request id so identical inputs never produce identical
///    prompts
#[derive(Debug, Clone)]
pub struct PromptBuilder {
    count: usize,
}

impl PromptBuilder {
    pub fn new() -> Self {
        Self { count: RESULT_SIZE }
    }

    /// Number of suggestions requested.
    pub fn count(&self) -> usize {
        self.count
    }

    pub fn build(
        &self,
        mood: Mood,
        weather: &WeatherContext,
        nonce: u64,
        exclusions: &[String],
    ) -> String {
        let mut prompt = format!(
            "Suggest {} highly-rated movies for someone feeling \"{}\" during \"{}\" weather. \
             Format: Title (Year) - Genre - Short summary.",
            self.count, mood, weather.description
        );

        if !exclusions.is_empty() {
            let _ = write!(
                prompt,
                "\nDo not suggest any of these: {}.",
                exclusions.join("; ")
            );
        }

        prompt.push_str("\nWrite one movie per line and nothing else.");
        let _ = write!(prompt, "\nRequest id: {:016x}", nonce);
        prompt
    }
}

impl Default for PromptBuilder {
    fn default() -> Self {
        Self::new()
    }
}
