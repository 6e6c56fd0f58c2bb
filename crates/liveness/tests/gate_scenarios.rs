//! End-to-end liveness scenarios over a replayed landmark track.

use liveness::fake::StaticCamera;
use liveness::{Camera, FaceLandmarks, GateConfig, GateOutcome, LivenessGate, ReplayDetector};
use std::sync::Arc;
use tokio::time::{Duration, Instant};
use tokio_util::sync::CancellationToken;

fn track(ratios: &[Option<f32>]) -> ReplayDetector {
    ReplayDetector::from_track(
        ratios
            .iter()
            .map(|ratio| ratio.map(FaceLandmarks::with_openness))
            .collect(),
    )
}

#[tokio::test(start_paused = true)]
async fn test_open_closed_open_closed_open_unlocks() {
    let open = Some(0.32);
    let closed = Some(0.08);
    // 250ms between samples puts the two closed->open edges 500ms apart
    let config = GateConfig::default().with_sample_interval(Duration::from_millis(250));
    let gate = LivenessGate::new(Arc::new(track(&[open, closed, open, closed, open])))
        .with_config(config);

    let camera = StaticCamera::new();
    let stats = camera.stats();
    let mut handle = camera.acquire().await.unwrap();

    let outcome = gate
        .run(&mut handle, &CancellationToken::new(), |_| {})
        .await;
    handle.release();

    assert_eq!(outcome, GateOutcome::Unlocked { blinks: 2 });
    assert!(!stats.is_held());
}

#[tokio::test(start_paused = true)]
async fn test_track_from_json_with_missing_faces() {
    let open = serde_json::to_value(FaceLandmarks::with_openness(0.3)).unwrap();
    let closed = serde_json::to_value(FaceLandmarks::with_openness(0.1)).unwrap();
    let json = serde_json::json!([
        open, null, closed, null, open, open, open, closed, open
    ])
    .to_string();

    let gate = LivenessGate::new(Arc::new(ReplayDetector::from_json(&json).unwrap()));
    let camera = StaticCamera::new();
    let mut handle = camera.acquire().await.unwrap();

    let outcome = gate
        .run(&mut handle, &CancellationToken::new(), |_| {})
        .await;
    assert_eq!(outcome, GateOutcome::Unlocked { blinks: 2 });
}

#[tokio::test(start_paused = true)]
async fn test_short_deadline_times_out() {
    let config = GateConfig::default().with_deadline(Duration::from_secs(2));
    let gate = LivenessGate::new(Arc::new(track(&[]))).with_config(config);
    let camera = StaticCamera::new();
    let mut handle = camera.acquire().await.unwrap();

    let started = Instant::now();
    let outcome = gate
        .run(&mut handle, &CancellationToken::new(), |_| {})
        .await;

    assert_eq!(outcome, GateOutcome::TimedOut { blinks: 0 });
    assert_eq!(started.elapsed(), Duration::from_secs(2));
}
