//! The liveness gate: drives a `LivenessSession` from live frames.
//!
//! ## Algorithm
//! 1. Start a session and arm the deadline timer
//! 2. Every `sample_interval`, grab a frame and run landmark detection
//! 3. Feed the averaged eye-openness ratio to the session
//! 4. Stop on the first terminal outcome: unlocked, deadline, device
//!    failure, or external cancellation
//!
//! The sampling loop, the deadline and cancellation are raced in one
//! `select!`, and the deadline and cancellation are raced again against
//! each in-flight detection. Once the loop returns no further frame is
//! grabbed.

use crate::error::DeviceError;
use crate::frame::CameraHandle;
use crate::landmarks::LandmarkDetector;
use crate::session::{GateConfig, LivenessSession, LivenessSnapshot, Observation};
use std::sync::Arc;
use tokio::time::{Instant, MissedTickBehavior};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, instrument, warn};

/// How a gate run ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GateOutcome {
    Unlocked { blinks: u32 },
    /// Deadline reached first; the caller may offer a retry
    TimedOut { blinks: u32 },
    /// Device failure; terminal
    Failed(DeviceError),
    /// External teardown
    Cancelled,
}

/// Blink-counting liveness check over a camera.
#[derive(Clone)]
pub struct LivenessGate {
    config: GateConfig,
    detector: Arc<dyn LandmarkDetector>,
}

impl LivenessGate {
    pub fn new(detector: Arc<dyn LandmarkDetector>) -> Self {
        Self {
            config: GateConfig::default(),
            detector,
        }
    }

    pub fn with_config(mut self, config: GateConfig) -> Self {
        self.config = config;
        self
    }

    pub fn config(&self) -> &GateConfig {
        &self.config
    }

    /// Run one liveness session on an already acquired camera.
    ///
    /// The handle is only borrowed: releasing it is the caller's job (and
    /// happens on drop regardless). `on_progress` is called whenever the
    /// session state or blink count changes.
    #[instrument(skip_all, fields(camera = handle.label()))]
    pub async fn run<F>(
        &self,
        handle: &mut CameraHandle,
        cancel: &CancellationToken,
        mut on_progress: F,
    ) -> GateOutcome
    where
        F: FnMut(LivenessSnapshot) + Send,
    {
        let mut session = LivenessSession::new(self.config.clone());
        let started_at = Instant::now();
        session.start(started_at);
        on_progress(session.snapshot());
        info!(
            "Liveness session started (need {} blinks within {:?})",
            self.config.required_blinks, self.config.deadline
        );

        let deadline = tokio::time::sleep_until(started_at + self.config.deadline);
        tokio::pin!(deadline);

        let mut ticker = tokio::time::interval(self.config.sample_interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        let mut samples: u64 = 0;

        loop {
            tokio::select! {
                biased;

                _ = cancel.cancelled() => {
                    info!("Liveness session cancelled after {} samples", samples);
                    return GateOutcome::Cancelled;
                }

                _ = &mut deadline => {
                    session.expire();
                    info!(
                        "Liveness session timed out after {} samples ({} blinks)",
                        samples,
                        session.blink_count()
                    );
                    on_progress(session.snapshot());
                    return GateOutcome::TimedOut { blinks: session.blink_count() };
                }

                _ = ticker.tick() => {
                    samples += 1;

                    let frame = match handle.capture_still() {
                        Ok(frame) => frame,
                        Err(err) => {
                            session.fail();
                            warn!("Camera failed during liveness check: {}", err);
                            on_progress(session.snapshot());
                            return GateOutcome::Failed(err);
                        }
                    };

                    let detection = tokio::select! {
                        biased;
                        _ = cancel.cancelled() => {
                            info!("Liveness session cancelled during detection");
                            return GateOutcome::Cancelled;
                        }
                        _ = &mut deadline => {
                            session.expire();
                            info!(
                                "Liveness deadline passed while detection was in flight ({} blinks)",
                                session.blink_count()
                            );
                            on_progress(session.snapshot());
                            return GateOutcome::TimedOut { blinks: session.blink_count() };
                        }
                        detection = self.detector.detect(&frame) => detection,
                    };

                    let ratio = match detection {
                        Ok(Some(landmarks)) => landmarks.openness_ratio(),
                        Ok(None) => None,
                        Err(err) => {
                            warn!("Landmark detection failed, skipping frame: {}", err);
                            None
                        }
                    };
                    debug!("Sample {} eye ratio {:?}", samples, ratio);

                    match session.observe(ratio, Instant::now()) {
                        Observation::Unlocked => {
                            info!(
                                "Liveness confirmed after {} samples in {:?}",
                                samples,
                                started_at.elapsed()
                            );
                            on_progress(session.snapshot());
                            return GateOutcome::Unlocked { blinks: session.blink_count() };
                        }
                        Observation::TimedOut => {
                            info!("Liveness deadline passed during detection");
                            on_progress(session.snapshot());
                            return GateOutcome::TimedOut { blinks: session.blink_count() };
                        }
                        Observation::BlinkCounted => on_progress(session.snapshot()),
                        _ => {}
                    }
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fake::{CameraStatsSnapshot, ScriptedDetector, StaticCamera, CLOSED, OPEN};
    use crate::frame::Camera;
    use crate::session::LivenessState;
    use tokio::time::Duration;

    async fn run_script(
        script: Vec<Option<f32>>,
    ) -> (GateOutcome, Duration, CameraStatsSnapshot) {
        let camera = StaticCamera::new();
        let stats = camera.stats();
        let gate = LivenessGate::new(Arc::new(ScriptedDetector::new(script)));
        let mut handle = camera.acquire().await.unwrap();

        let started = Instant::now();
        let outcome = gate
            .run(&mut handle, &CancellationToken::new(), |_| {})
            .await;
        let elapsed = started.elapsed();
        drop(handle);
        (outcome, elapsed, stats.snapshot())
    }

    #[tokio::test(start_paused = true)]
    async fn test_separated_blinks_unlock() {
        // Samples every 150ms: blinks complete at 300ms and 900ms
        let script = vec![OPEN, CLOSED, OPEN, OPEN, OPEN, CLOSED, OPEN];
        let (outcome, elapsed, stats) = run_script(script).await;

        assert_eq!(outcome, GateOutcome::Unlocked { blinks: 2 });
        assert_eq!(elapsed, Duration::from_millis(900));
        assert_eq!(stats.grabs, 7);
    }

    #[tokio::test(start_paused = true)]
    async fn test_fast_double_blink_counts_once() {
        // Blinks complete at 300ms and 600ms: inside the 400ms debounce
        let script = vec![OPEN, CLOSED, OPEN, CLOSED, OPEN];
        let (outcome, elapsed, _) = run_script(script).await;

        assert_eq!(outcome, GateOutcome::TimedOut { blinks: 1 });
        assert_eq!(elapsed, Duration::from_secs(15));
    }

    #[tokio::test(start_paused = true)]
    async fn test_no_blinks_times_out_and_stops_sampling() {
        let camera = StaticCamera::new();
        let stats = camera.stats();
        let gate = LivenessGate::new(Arc::new(ScriptedDetector::new(vec![])));
        let mut handle = camera.acquire().await.unwrap();

        let mut states = Vec::new();
        let outcome = gate
            .run(&mut handle, &CancellationToken::new(), |snapshot| {
                states.push(snapshot.state)
            })
            .await;
        assert_eq!(outcome, GateOutcome::TimedOut { blinks: 0 });
        assert_eq!(
            states,
            vec![LivenessState::Capturing, LivenessState::TimedOut]
        );

        let grabs_at_timeout = stats.grabs();
        tokio::time::sleep(Duration::from_secs(5)).await;
        assert_eq!(stats.grabs(), grabs_at_timeout);
    }

    #[tokio::test(start_paused = true)]
    async fn test_no_face_never_unlocks() {
        let (outcome, _, _) = run_script(vec![None; 200]).await;
        assert_eq!(outcome, GateOutcome::TimedOut { blinks: 0 });
    }

    #[tokio::test(start_paused = true)]
    async fn test_device_failure_is_terminal() {
        let camera = StaticCamera::new().failing_after(3);
        let gate = LivenessGate::new(Arc::new(ScriptedDetector::new(vec![])));
        let mut handle = camera.acquire().await.unwrap();

        let outcome = gate
            .run(&mut handle, &CancellationToken::new(), |_| {})
            .await;
        assert!(matches!(outcome, GateOutcome::Failed(DeviceError::Unavailable(_))));
    }

    #[tokio::test(start_paused = true)]
    async fn test_cancellation_stops_loop() {
        let camera = StaticCamera::new();
        let stats = camera.stats();
        let gate = LivenessGate::new(Arc::new(ScriptedDetector::new(vec![])));
        let mut handle = camera.acquire().await.unwrap();

        let cancel = CancellationToken::new();
        let trigger = cancel.clone();
        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(1_000)).await;
            trigger.cancel();
        });

        let started = Instant::now();
        let outcome = gate.run(&mut handle, &cancel, |_| {}).await;
        assert_eq!(outcome, GateOutcome::Cancelled);
        assert!(started.elapsed() < Duration::from_secs(2));

        let grabs = stats.grabs();
        tokio::time::sleep(Duration::from_secs(20)).await;
        assert_eq!(stats.grabs(), grabs);
    }

    /// Detector that never answers within a session.
    struct StalledDetector {
        stall: Duration,
    }

    #[async_trait::async_trait]
    impl LandmarkDetector for StalledDetector {
        async fn detect(
            &self,
            _frame: &crate::frame::Frame,
        ) -> Result<Option<crate::landmarks::FaceLandmarks>, crate::error::DetectError> {
            tokio::time::sleep(self.stall).await;
            Ok(None)
        }
    }

    async fn run_stalled(stall: Duration) -> (GateOutcome, Duration, Vec<LivenessState>) {
        let camera = StaticCamera::new();
        let gate = LivenessGate::new(Arc::new(StalledDetector { stall }));
        let mut handle = camera.acquire().await.unwrap();

        let mut states = Vec::new();
        let started = Instant::now();
        let outcome = gate
            .run(&mut handle, &CancellationToken::new(), |snapshot| {
                states.push(snapshot.state)
            })
            .await;
        (outcome, started.elapsed(), states)
    }

    #[tokio::test(start_paused = true)]
    async fn test_slow_detector_times_out_at_deadline() {
        let (outcome, elapsed, states) = run_stalled(Duration::from_secs(60)).await;

        assert_eq!(outcome, GateOutcome::TimedOut { blinks: 0 });
        assert_eq!(elapsed, Duration::from_secs(15));
        assert_eq!(states.last(), Some(&LivenessState::TimedOut));
    }

    #[tokio::test(start_paused = true)]
    async fn test_hung_detector_does_not_hold_gate_open() {
        let result = tokio::time::timeout(
            Duration::from_secs(60),
            run_stalled(Duration::from_secs(100_000)),
        )
        .await;

        let (outcome, elapsed, _) = result.expect("gate should end at its deadline");
        assert_eq!(outcome, GateOutcome::TimedOut { blinks: 0 });
        assert_eq!(elapsed, Duration::from_secs(15));
    }

    #[tokio::test(start_paused = true)]
    async fn test_progress_reports_blinks() {
        let camera = StaticCamera::new();
        let script = vec![CLOSED, OPEN, OPEN, OPEN, CLOSED, OPEN];
        let gate = LivenessGate::new(Arc::new(ScriptedDetector::new(script)));
        let mut handle = camera.acquire().await.unwrap();

        let mut counts = Vec::new();
        let outcome = gate
            .run(&mut handle, &CancellationToken::new(), |snapshot| {
                counts.push((snapshot.state, snapshot.blink_count))
            })
            .await;

        assert_eq!(outcome, GateOutcome::Unlocked { blinks: 2 });
        assert_eq!(
            counts,
            vec![
                (LivenessState::Capturing, 0),
                (LivenessState::Unlocking, 1),
                (LivenessState::Unlocked, 2),
            ]
        );
    }
}
