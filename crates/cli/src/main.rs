use anyhow::{anyhow, Context, Result};
use catalog::{FallbackCatalog, Mood, MoodResult, MovieSuggestion, SeenTitlesRegistry, WeatherContext};
use clap::{Parser, Subcommand};
use colored::Colorize;
use liveness::{DirectoryCamera, LivenessGate, ReplayDetector};
use pipeline::RecommendationEngine;
use remote_client::{
    Coordinates, HuggingFaceMoodClient, HuggingFaceTextClient, MoodClassifier,
    OpenWeatherResolver, StaticLocator, TextGenerator, WeatherProvider, SYNTHETIC_WEATHER,
};
use server::{
    launch_detached, CheckoutRequest, GenieConfig, LoggingCheckout, PipelineController,
    PipelineError, PipelineStatus, Recommendation,
};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Instant;
use tokio_util::sync::CancellationToken;

/// Weather Genie - mood and weather aware movie suggestions
#[derive(Parser)]
#[command(name = "genie")]
#[command(about = "Blink to unlock, then get three movies for your mood and weather", long_about = None)]
struct Cli {
    /// Path to a TOML config file
    #[arg(short, long, env = "GENIE_CONFIG")]
    config: Option<PathBuf>,

    /// Latitude override for the weather lookup
    #[arg(long, allow_negative_numbers = true, requires = "lon")]
    lat: Option<f64>,

    /// Longitude override for the weather lookup
    #[arg(long, allow_negative_numbers = true, requires = "lat")]
    lon: Option<f64>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the full pipeline: liveness, capture, weather, mood, suggestions
    Run {
        /// Directory of still images served as camera frames
        #[arg(long)]
        frames: PathBuf,

        /// JSON landmark track replayed by the face detector
        #[arg(long)]
        landmarks: PathBuf,
    },

    /// Resolve the current weather
    Weather,

    /// Infer the mood shown in an image
    Mood {
        /// Image file (JPEG or PNG)
        #[arg(long)]
        image: PathBuf,
    },

    /// Ask for suggestions directly, skipping liveness and inference
    Suggest {
        /// Mood: happy, sad, romantic or neutral
        #[arg(long)]
        mood: Mood,

        /// Weather label, e.g. Rainy
        #[arg(long, default_value = "Sunny")]
        weather: String,

        /// Number of consecutive requests sharing one seen-titles registry
        #[arg(long, default_value = "1")]
        rounds: usize,

        /// Skip the text service and use only the fallback catalog
        #[arg(long)]
        offline: bool,
    },

    /// Print the curated fallback catalog
    Catalog,

    /// Print the support checkout configuration
    Support,
}

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();
    let config = GenieConfig::load(cli.config.as_deref()).context("Failed to load config")?;
    let coordinates = match (cli.lat, cli.lon) {
        (Some(latitude), Some(longitude)) => Some(Coordinates {
            latitude,
            longitude,
        }),
        _ => config.coordinates(),
    };

    // Dispatch to appropriate command handler
    match cli.command {
        Commands::Run { frames, landmarks } => {
            handle_run(&config, coordinates, frames, landmarks).await?
        }
        Commands::Weather => handle_weather(&config, coordinates).await,
        Commands::Mood { image } => handle_mood(&config, image).await?,
        Commands::Suggest {
            mood,
            weather,
            rounds,
            offline,
        } => handle_suggest(&config, mood, &weather, rounds, offline).await,
        Commands::Catalog => handle_catalog(),
        Commands::Support => handle_support(&config).await?,
    }

    Ok(())
}

// =============================================================================
// Adapter construction
// =============================================================================

fn weather_resolver(config: &GenieConfig, coordinates: Option<Coordinates>) -> OpenWeatherResolver {
    OpenWeatherResolver::new(
        config.weather_api_key(),
        Arc::new(StaticLocator::new(coordinates)),
    )
    .with_base_url(config.weather.base_url.clone())
}

fn mood_client(config: &GenieConfig) -> HuggingFaceMoodClient {
    HuggingFaceMoodClient::new(config.hf_api_key())
        .with_endpoint(config.mood.endpoint.clone())
        .with_timeout(config.mood_timeout())
}

fn text_client(config: &GenieConfig) -> HuggingFaceTextClient {
    HuggingFaceTextClient::new(config.hf_api_key()).with_endpoint(config.text.endpoint.clone())
}

fn engine(config: &GenieConfig, generator: Arc<dyn TextGenerator>) -> RecommendationEngine {
    RecommendationEngine::new(generator, FallbackCatalog::curated())
        .with_params(config.decoding_params())
}

// =============================================================================
// Command handlers
// =============================================================================

/// Handle the 'run' command
async fn handle_run(
    config: &GenieConfig,
    coordinates: Option<Coordinates>,
    frames: PathBuf,
    landmarks: PathBuf,
) -> Result<()> {
    let detector = ReplayDetector::from_path(&landmarks)
        .with_context(|| format!("Failed to load landmark track {}", landmarks.display()))?;
    let gate = LivenessGate::new(Arc::new(detector)).with_config(config.gate_config());

    let controller = Arc::new(PipelineController::new(
        Arc::new(DirectoryCamera::new(frames)),
        gate,
        Arc::new(weather_resolver(config, coordinates)),
        Arc::new(mood_client(config)),
        engine(config, Arc::new(text_client(config))),
    ));

    // Ctrl-C tears the run down
    let cancel = CancellationToken::new();
    tokio::spawn({
        let cancel = cancel.clone();
        async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                cancel.cancel();
            }
        }
    });

    let mut status = controller.subscribe();
    let printer = tokio::spawn(async move {
        while status.changed().await.is_ok() {
            let current = status.borrow_and_update().clone();
            match current {
                PipelineStatus::Unlocking { blinks, required } => {
                    println!("{} Blink to unlock ({}/{})", "👁".cyan(), blinks, required);
                }
                PipelineStatus::Resolving => {
                    println!("{} Reading the sky and your mood...", "✨".magenta());
                }
                _ => {}
            }
        }
    });

    let start = Instant::now();
    let result = controller.run(&cancel).await;
    drop(controller);
    let _ = printer.await;

    match result {
        Ok(recommendation) => {
            print_recommendation(&recommendation);
            println!("{} Done in {:.2?}", "✓".green(), start.elapsed());
            Ok(())
        }
        Err(err @ PipelineError::Timeout { .. }) => {
            println!("{} {} Run again to retry.", "⏱".yellow(), err);
            Err(err.into())
        }
        Err(err) => Err(anyhow!(err)).context("Pipeline run failed"),
    }
}

/// Handle the 'weather' command
async fn handle_weather(config: &GenieConfig, coordinates: Option<Coordinates>) {
    let weather = weather_resolver(config, coordinates).resolve().await;
    print_weather(&weather);
}

/// Handle the 'mood' command
async fn handle_mood(config: &GenieConfig, image: PathBuf) -> Result<()> {
    let bytes = tokio::fs::read(&image)
        .await
        .with_context(|| format!("Failed to read image {}", image.display()))?;
    let mood = mood_client(config).infer(&bytes).await;
    print_mood(&mood);
    Ok(())
}

/// Handle the 'suggest' command
async fn handle_suggest(
    config: &GenieConfig,
    mood: Mood,
    weather_label: &str,
    rounds: usize,
    offline: bool,
) {
    let temperature = SYNTHETIC_WEATHER
        .iter()
        .find(|(label, _)| label.eq_ignore_ascii_case(weather_label))
        .map(|(_, temperature)| *temperature)
        .unwrap_or(20.0);
    let weather = WeatherContext::synthetic(weather_label, temperature);

    let generator: Arc<dyn TextGenerator> = if offline {
        Arc::new(remote_client::fake::FailingText::new())
    } else {
        Arc::new(text_client(config))
    };
    let engine = engine(config, generator);
    let mut registry = SeenTitlesRegistry::new();

    for round in 1..=rounds.max(1) {
        let start = Instant::now();
        let suggestions = engine.recommend(mood, &weather, &mut registry).await;
        println!(
            "{}",
            format!(
                "Round {} - feeling {} on a {} day ({:.2?}):",
                round,
                mood,
                weather.description,
                start.elapsed()
            )
            .bold()
            .blue()
        );
        print_suggestions(&suggestions);
    }
    println!("{} {} titles shown this session", "•".cyan(), registry.len());
}

/// Handle the 'catalog' command
fn handle_catalog() {
    let catalog = FallbackCatalog::curated();
    println!("{}", format!("Fallback catalog ({} entries):", catalog.len()).bold().blue());
    print_suggestions(catalog.entries());
}

/// Handle the 'support' command
async fn handle_support(config: &GenieConfig) -> Result<()> {
    let key = config
        .checkout_key()
        .ok_or_else(|| anyhow!("Checkout key not configured (set GENIE_CHECKOUT_KEY)"))?;
    let request = CheckoutRequest::support(key);
    println!("{}", serde_json::to_string_pretty(&request)?);
    launch_detached(Arc::new(LoggingCheckout), request)
        .await
        .context("Checkout task panicked")?;
    Ok(())
}

// =============================================================================
// Output helpers
// =============================================================================

fn print_weather(weather: &WeatherContext) {
    let tag = if weather.is_live() {
        "live".green()
    } else {
        "synthetic".yellow()
    };
    println!("{} {} [{}]", "☁".cyan(), weather.summary(), tag);
}

fn print_mood(mood: &MoodResult) {
    let tag = if mood.is_fallback() {
        "fallback".yellow()
    } else {
        "inferred".green()
    };
    println!("{} Mood: {} [{}]", "☺".cyan(), mood.mood.to_string().bold(), tag);
}

fn print_suggestions(suggestions: &[MovieSuggestion]) {
    for (i, suggestion) in suggestions.iter().enumerate() {
        println!(
            "{}. {} ({}) [{}]",
            (i + 1).to_string().green(),
            suggestion.title.bold(),
            suggestion.year,
            suggestion.genre
        );
        println!("   {}", suggestion.summary);
    }
}

fn print_recommendation(recommendation: &Recommendation) {
    print_weather(&recommendation.weather);
    print_mood(&recommendation.mood);
    println!("{}", "Your movies:".bold().blue());
    print_suggestions(&recommendation.suggestions);
}
