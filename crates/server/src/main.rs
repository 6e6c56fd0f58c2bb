//! Demo harness for the pipeline controller.
//!
//! Runs two full pipeline sessions against a scripted camera, a scripted
//! blink sequence and fixed weather/mood/text adapters, printing status
//! transitions as they happen. No network access or camera is needed.

use std::sync::Arc;

use anyhow::{Context, Result};
use tokio_util::sync::CancellationToken;
use tracing::info;
use tracing_subscriber::EnvFilter;

use catalog::{FallbackCatalog, Mood, MoodResult, WeatherContext};
use liveness::fake::{ScriptedDetector, StaticCamera, CLOSED, OPEN};
use liveness::LivenessGate;
use pipeline::RecommendationEngine;
use remote_client::fake::{FixedMood, FixedWeather, ScriptedText};
use server::{GenieConfig, PipelineController, PipelineStatus};

const SCRIPTED_REPLY: &str = "\
1. The Station Agent (2003) - Drama - A quiet man inherits a rural train depot.
2. Lost in Translation (2003) - Drama - Two strangers drift through Tokyo.
Some trailing chatter the parser should ignore.";

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("info,server=debug,pipeline=debug,liveness=debug")),
        )
        .init();

    info!("Starting Weather Genie demo harness");

    let config_path = std::env::args().nth(1).map(std::path::PathBuf::from);
    let config = GenieConfig::load(config_path.as_deref()).context("Failed to load config")?;

    // Two sessions' worth of blinks: open, closed, open with a pause between
    let blink = [OPEN, CLOSED, OPEN, OPEN, OPEN, CLOSED, OPEN];
    let script = [blink, blink].concat();

    let engine = RecommendationEngine::new(
        Arc::new(ScriptedText::new([SCRIPTED_REPLY])),
        FallbackCatalog::curated(),
    )
    .with_params(config.decoding_params());

    let controller = Arc::new(PipelineController::new(
        Arc::new(StaticCamera::new()),
        LivenessGate::new(Arc::new(ScriptedDetector::new(script))).with_config(config.gate_config()),
        Arc::new(FixedWeather::new(WeatherContext::synthetic("Rainy", 18.0))),
        Arc::new(FixedMood::new(MoodResult::inferred(Mood::Sad))),
        engine,
    ));

    let mut status = controller.subscribe();
    let watcher = tokio::spawn(async move {
        while status.changed().await.is_ok() {
            let current = status.borrow_and_update().clone();
            match current {
                PipelineStatus::Unlocking { blinks, required } => {
                    info!("Blink to unlock: {}/{}", blinks, required)
                }
                PipelineStatus::Resolving => info!("Reading the sky and your face..."),
                PipelineStatus::Ready(_) => info!("Recommendations ready"),
                PipelineStatus::Failed(err) => info!("Run failed: {}", err),
                PipelineStatus::Idle => {}
            }
        }
    });

    let cancel = CancellationToken::new();
    for round in 1..=2 {
        let recommendation = controller.run(&cancel).await?;
        info!(
            "Round {}: {} / {} ({})",
            round,
            recommendation.mood.mood,
            recommendation.weather.summary(),
            if recommendation.weather.is_live() { "live" } else { "synthetic" }
        );
        for (i, suggestion) in recommendation.suggestions.iter().enumerate() {
            info!("{}. {}", i + 1, suggestion.raw_line);
        }
    }

    info!("Seen this session: {}", controller.seen_titles().await.join(", "));
    drop(controller);
    watcher.await.context("Status watcher panicked")?;

    Ok(())
}
