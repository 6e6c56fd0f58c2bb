//! Recommendation engine: mood + weather in, exactly three suggestions out.
//!
//! ## Algorithm
//! 1. Build a prompt with mood, weather, a nonce and every seen title
//! 2. Call the text generator once, bounded by the decoding timeout
//! 3. Parse well-formed lines and run them through the filter pipeline
//! 4. Accept up to three, recording each in the registry
//! 5. Top up from the fallback catalog in catalog order, skipping seen titles
//! 6. If the catalog is exhausted, clear the registry and top up again
//!
//! The engine never fails. With the text service down it returns the first
//! three unseen catalog entries.

use crate::filter_pipeline::FilterPipeline;
use crate::prompt::PromptBuilder;
use catalog::{
    parse_suggestions, FallbackCatalog, Mood, MovieSuggestion, SeenTitlesRegistry,
    WeatherContext, RESULT_SIZE,
};
use remote_client::{DecodingParams, TextGenerator};
use std::sync::Arc;
use tracing::{debug, info, instrument, warn};

pub struct RecommendationEngine {
    generator: Arc<dyn TextGenerator>,
    catalog: FallbackCatalog,
    filters: FilterPipeline,
    prompts: PromptBuilder,
    params: DecodingParams,
}

impl RecommendationEngine {
    /// Create an engine with the standard filter pipeline and default
    /// decoding parameters.
    pub fn new(generator: Arc<dyn TextGenerator>, catalog: FallbackCatalog) -> Self {
        Self {
            generator,
            catalog,
            filters: FilterPipeline::standard(),
            prompts: PromptBuilder::new(),
            params: DecodingParams::default(),
        }
    }

    pub fn with_params(mut self, params: DecodingParams) -> Self {
        self.params = params;
        self
    }

    pub fn with_filters(mut self, filters: FilterPipeline) -> Self {
        self.filters = filters;
        self
    }

    pub fn params(&self) -> &DecodingParams {
        &self.params
    }

    pub fn catalog(&self) -> &FallbackCatalog {
        &self.catalog
    }

    /// Produce exactly `RESULT_SIZE` suggestions with distinct titles.
    ///
    /// Live entries come first in response order, then catalog entries in
    /// catalog order. Every returned title is in `registry` afterwards.
    #[instrument(skip_all, fields(mood = %mood, weather = %weather.description))]
    pub async fn recommend(
        &self,
        mood: Mood,
        weather: &WeatherContext,
        registry: &mut SeenTitlesRegistry,
    ) -> Vec<MovieSuggestion> {
        let live = self.generate_live(mood, weather, registry).await;

        let mut picks = Vec::with_capacity(RESULT_SIZE);
        for suggestion in live.into_iter().take(RESULT_SIZE) {
            registry.insert(&suggestion.title);
            picks.push(suggestion);
        }
        let live_count = picks.len();

        self.top_up(&mut picks, registry);

        if picks.len() < RESULT_SIZE {
            warn!(
                "Fallback catalog exhausted at {} of {} suggestions, clearing {} seen titles",
                picks.len(),
                RESULT_SIZE,
                registry.len()
            );
            registry.clear();
            for pick in &picks {
                registry.insert(&pick.title);
            }
            self.top_up(&mut picks, registry);
        }

        info!(
            "Recommended {} movies ({} live, {} fallback)",
            picks.len(),
            live_count,
            picks.len() - live_count
        );
        picks
    }

    /// One generation attempt, returning filtered candidates in response
    /// order. Any failure yields an empty list.
    async fn generate_live(
        &self,
        mood: Mood,
        weather: &WeatherContext,
        registry: &SeenTitlesRegistry,
    ) -> Vec<MovieSuggestion> {
        let nonce: u64 = rand::random();
        let prompt = self
            .prompts
            .build(mood, weather, nonce, registry.titles());

        let generation = self.generator.generate(&prompt, &self.params);
        let raw = match tokio::time::timeout(self.params.timeout, generation).await {
            Ok(Ok(raw)) => raw,
            Ok(Err(err)) => {
                warn!("Text generation failed: {}", err);
                return Vec::new();
            }
            Err(_) => {
                warn!("Text generation timed out after {:?}", self.params.timeout);
                return Vec::new();
            }
        };

        let parsed = parse_suggestions(&raw);
        let kept = self.filters.apply(parsed, registry);
        debug!("Kept {} live suggestions", kept.len());
        kept
    }

    /// Append unseen catalog entries until the result is full.
    fn top_up(&self, picks: &mut Vec<MovieSuggestion>, registry: &mut SeenTitlesRegistry) {
        for entry in self.catalog.iter() {
            if picks.len() >= RESULT_SIZE {
                break;
            }
            if registry.insert(&entry.title) {
                picks.push(entry.clone());
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use remote_client::fake::{FailingText, ScriptedText};
    use std::collections::HashSet;
    use std::time::Duration;

    fn rainy() -> WeatherContext {
        WeatherContext::synthetic("Rainy", 18.0)
    }

    fn titles(suggestions: &[MovieSuggestion]) -> Vec<&str> {
        suggestions.iter().map(|s| s.title.as_str()).collect()
    }

    #[tokio::test]
    async fn test_live_entries_come_first() {
        let text = Arc::new(ScriptedText::new([
            "Here you go:\n1. Up (2009) - Animation - An old man flies his house.\nEnjoy!",
        ]));
        let engine = RecommendationEngine::new(text.clone(), FallbackCatalog::curated());
        let mut registry = SeenTitlesRegistry::new();

        let picks = engine.recommend(Mood::Happy, &rainy(), &mut registry).await;
        assert_eq!(
            titles(&picks),
            vec!["Up", "The Secret Life of Walter Mitty", "Paddington 2"]
        );
        assert_eq!(registry.len(), 3);
        assert_eq!(text.calls(), 1);
    }

    #[tokio::test]
    async fn test_only_three_live_entries_accepted() {
        let text = Arc::new(ScriptedText::new([concat!(
            "Up (2009) - Animation - Balloons.\n",
            "Heat (1995) - Crime - Heist.\n",
            "Arrival (2016) - SciFi - Language.\n",
            "Coco (2017) - Animation - Music.\n",
        )]));
        let engine = RecommendationEngine::new(text, FallbackCatalog::curated());
        let mut registry = SeenTitlesRegistry::new();

        let picks = engine.recommend(Mood::Sad, &rainy(), &mut registry).await;
        assert_eq!(titles(&picks), vec!["Up", "Heat", "Arrival"]);
        assert!(!registry.contains("Coco"));
    }

    #[tokio::test]
    async fn test_prompt_excludes_seen_titles() {
        let text = Arc::new(ScriptedText::new(Vec::<String>::new()));
        let engine = RecommendationEngine::new(text.clone(), FallbackCatalog::curated());
        let mut registry = SeenTitlesRegistry::new();
        registry.insert("Heat");

        engine.recommend(Mood::Romantic, &rainy(), &mut registry).await;

        let prompts = text.prompts();
        assert_eq!(prompts.len(), 1);
        assert!(prompts[0].contains("Do not suggest any of these: Heat."));
    }

    #[tokio::test]
    async fn test_repeated_live_titles_are_replaced() {
        let text = Arc::new(ScriptedText::new([
            "Paddington 2 (2017) - Family - A bear.\nPaddington 2 (2017) - Family - Again.",
        ]));
        let engine = RecommendationEngine::new(text, FallbackCatalog::curated());
        let mut registry = SeenTitlesRegistry::new();

        let picks = engine.recommend(Mood::Happy, &rainy(), &mut registry).await;
        assert_eq!(
            titles(&picks),
            vec!["Paddington 2", "The Secret Life of Walter Mitty", "Amélie"]
        );
    }

    #[tokio::test(start_paused = true)]
    async fn test_slow_generation_times_out_to_catalog() {
        let text = Arc::new(
            ScriptedText::new(["Up (2009) - Animation - Balloons."])
                .with_delay(Duration::from_secs(60)),
        );
        let engine = RecommendationEngine::new(text, FallbackCatalog::curated())
            .with_params(DecodingParams::default().with_timeout(Duration::from_secs(5)));
        let mut registry = SeenTitlesRegistry::new();

        let started = tokio::time::Instant::now();
        let picks = engine.recommend(Mood::Happy, &rainy(), &mut registry).await;

        assert_eq!(started.elapsed(), Duration::from_secs(5));
        assert!(!titles(&picks).contains(&"Up"));
        assert_eq!(picks.len(), RESULT_SIZE);
    }

    #[tokio::test]
    async fn test_results_always_full_and_distinct() {
        let engine = RecommendationEngine::new(Arc::new(FailingText::new()), FallbackCatalog::curated());
        let mut registry = SeenTitlesRegistry::new();

        for _ in 0..12 {
            let picks = engine.recommend(Mood::Happy, &rainy(), &mut registry).await;
            assert_eq!(picks.len(), RESULT_SIZE);
            let distinct: HashSet<_> = picks.iter().map(|s| s.normalized_title()).collect();
            assert_eq!(distinct.len(), RESULT_SIZE);
            for pick in &picks {
                assert!(registry.contains(&pick.title));
            }
        }
    }
}
