//! # Pipeline Controller
//!
//! Sequences one full Weather Genie run:
//! 1. Acquire the camera
//! 2. Run the liveness gate until unlocked, timed out, failed or cancelled
//! 3. Capture exactly one still, then release the camera
//! 4. Resolve weather and infer mood concurrently
//! 5. Ask the recommendation engine for three suggestions
//!
//! Any gate outcome other than `Unlocked` ends the run before capture or
//! any network call. Runs are serialized by the lock around the session's
//! seen-titles registry, so two in-flight runs never interleave registry
//! updates.

use std::sync::Arc;
use std::time::Instant;

use serde::Serialize;
use tokio::sync::{watch, Mutex};
use tokio_util::sync::CancellationToken;
use tracing::{info, instrument, warn};

use catalog::{MoodResult, MovieSuggestion, SeenTitlesRegistry, WeatherContext};
use liveness::{Camera, GateOutcome, LivenessGate};
use pipeline::RecommendationEngine;
use remote_client::{MoodClassifier, WeatherProvider};

use crate::error::PipelineError;

/// Payload of a successful run.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Recommendation {
    pub weather: WeatherContext,
    pub mood: MoodResult,
    pub suggestions: Vec<MovieSuggestion>,
}

/// What the presentation layer should show right now.
#[derive(Debug, Clone, PartialEq)]
pub enum PipelineStatus {
    Idle,
    Unlocking { blinks: u32, required: u32 },
    Resolving,
    Ready(Recommendation),
    Failed(PipelineError),
}

/// Main controller that owns every stage and the session registry
pub struct PipelineController {
    camera: Arc<dyn Camera>,
    gate: LivenessGate,
    weather: Arc<dyn WeatherProvider>,
    mood: Arc<dyn MoodClassifier>,
    engine: RecommendationEngine,
    registry: Mutex<SeenTitlesRegistry>,
    status: watch::Sender<PipelineStatus>,
}

impl PipelineController {
    /// Create a controller with an empty registry.
    ///
    /// # Arguments
    /// * `camera` - Device the liveness check and still capture run on
    /// * `gate` - Configured liveness gate
    /// * `weather` - Weather source (never fails)
    /// * `mood` - Mood classifier (never fails)
    /// * `engine` - Recommendation engine
    pub fn new(
        camera: Arc<dyn Camera>,
        gate: LivenessGate,
        weather: Arc<dyn WeatherProvider>,
        mood: Arc<dyn MoodClassifier>,
        engine: RecommendationEngine,
    ) -> Self {
        let (status, _) = watch::channel(PipelineStatus::Idle);
        Self {
            camera,
            gate,
            weather,
            mood,
            engine,
            registry: Mutex::new(SeenTitlesRegistry::new()),
            status,
        }
    }

    /// Start from an existing registry instead of an empty one.
    pub fn with_registry(mut self, registry: SeenTitlesRegistry) -> Self {
        self.registry = Mutex::new(registry);
        self
    }

    pub fn subscribe(&self) -> watch::Receiver<PipelineStatus> {
        self.status.subscribe()
    }

    pub fn status(&self) -> PipelineStatus {
        self.status.borrow().clone()
    }

    /// Run the pipeline, waiting for any in-flight run to finish first.
    pub async fn run(&self, cancel: &CancellationToken) -> Result<Recommendation, PipelineError> {
        let mut registry = self.registry.lock().await;
        self.run_locked(&mut registry, cancel).await
    }

    /// Run the pipeline unless one is already in flight.
    pub async fn try_run(
        &self,
        cancel: &CancellationToken,
    ) -> Result<Recommendation, PipelineError> {
        let mut registry = self.registry.try_lock().map_err(|_| {
            warn!("Ignoring run request: a run is already in progress");
            PipelineError::Busy
        })?;
        self.run_locked(&mut registry, cancel).await
    }

    /// Forget every title shown so far this session.
    pub async fn reset_registry(&self) {
        let mut registry = self.registry.lock().await;
        info!("Clearing {} seen titles", registry.len());
        registry.clear();
    }

    /// Titles shown so far, in the order they were first shown.
    pub async fn seen_titles(&self) -> Vec<String> {
        self.registry.lock().await.titles().to_vec()
    }

    async fn run_locked(
        &self,
        registry: &mut SeenTitlesRegistry,
        cancel: &CancellationToken,
    ) -> Result<Recommendation, PipelineError> {
        let result = self.execute(registry, cancel).await;
        match &result {
            Ok(recommendation) => self.publish(PipelineStatus::Ready(recommendation.clone())),
            Err(err) => self.publish(PipelineStatus::Failed(err.clone())),
        }
        result
    }

    #[instrument(skip_all)]
    async fn execute(
        &self,
        registry: &mut SeenTitlesRegistry,
        cancel: &CancellationToken,
    ) -> Result<Recommendation, PipelineError> {
        let start_time = Instant::now();
        let required = self.gate.config().required_blinks;
        self.publish(PipelineStatus::Unlocking {
            blinks: 0,
            required,
        });

        // Acquire camera
        let acquired = tokio::select! {
            biased;
            _ = cancel.cancelled() => return Err(PipelineError::Cancelled),
            acquired = self.camera.acquire() => acquired,
        };
        let mut handle = acquired.map_err(|err| {
            warn!("Camera acquisition failed: {}", err);
            PipelineError::Device(err)
        })?;

        // Liveness gate
        let status = &self.status;
        let outcome = self
            .gate
            .run(&mut handle, cancel, |snapshot| {
                if !snapshot.state.is_terminal() {
                    status.send_replace(PipelineStatus::Unlocking {
                        blinks: snapshot.blink_count,
                        required: snapshot.required_blinks,
                    });
                }
            })
            .await;

        // Exactly one still, then the camera goes back before any network call
        let still = match outcome {
            GateOutcome::Unlocked { blinks } => {
                info!("Unlocked with {} blinks, capturing still", blinks);
                handle.capture_still()
            }
            GateOutcome::TimedOut { blinks } => {
                handle.release();
                return Err(PipelineError::Timeout { blinks });
            }
            GateOutcome::Failed(err) => {
                handle.release();
                return Err(PipelineError::Device(err));
            }
            GateOutcome::Cancelled => {
                handle.release();
                return Err(PipelineError::Cancelled);
            }
        };
        handle.release();
        let frame = still.map_err(PipelineError::Device)?;

        // Weather and mood in parallel
        self.publish(PipelineStatus::Resolving);
        let (weather, mood) = tokio::select! {
            biased;
            _ = cancel.cancelled() => return Err(PipelineError::Cancelled),
            resolved = async {
                tokio::join!(self.weather.resolve(), self.mood.infer(&frame.data))
            } => resolved,
        };
        info!(
            "Resolved weather '{}' ({:?}) and mood {} ({:?})",
            weather.description, weather.source, mood.mood, mood.source
        );

        // Recommendations
        let suggestions = tokio::select! {
            biased;
            _ = cancel.cancelled() => return Err(PipelineError::Cancelled),
            suggestions = self.engine.recommend(mood.mood, &weather, registry) => suggestions,
        };

        info!(
            "Pipeline run finished in {:.2?} with {} suggestions",
            start_time.elapsed(),
            suggestions.len()
        );
        Ok(Recommendation {
            weather,
            mood,
            suggestions,
        })
    }

    fn publish(&self, status: PipelineStatus) {
        self.status.send_replace(status);
    }
}
