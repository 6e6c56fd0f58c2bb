//! Facial landmark geometry and detector abstraction.
//!
//! ## Eye aspect ratio
//! Each eye is described by six landmarks p1..p6 going around the eye,
//! with p1 and p4 at the horizontal corners:
//!
//! ```text
//!        p2   p3
//!   p1            p4
//!        p6   p5
//! ```
//!
//! `EAR = (|p2 - p6| + |p3 - p5|) / (2 * |p1 - p4|)`
//!
//! The ratio is roughly constant while the eye is open and drops towards
//! zero while it closes, which is what blink detection keys on.

use crate::error::DetectError;
use crate::frame::Frame;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::sync::atomic::{AtomicUsize, Ordering};
use tracing::{debug, info};

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Point {
    pub x: f32,
    pub y: f32,
}

impl Point {
    pub fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    fn distance(&self, other: &Point) -> f32 {
        ((self.x - other.x).powi(2) + (self.y - other.y).powi(2)).sqrt()
    }
}

/// Eye landmarks for one detected face
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FaceLandmarks {
    #[serde(rename = "left")]
    pub left_eye: [Point; 6],
    #[serde(rename = "right")]
    pub right_eye: [Point; 6],
}

impl FaceLandmarks {
    /// Average eye aspect ratio of both eyes.
    ///
    /// `None` if either eye is degenerate (zero width); such frames are
    /// treated like frames without a face.
    pub fn openness_ratio(&self) -> Option<f32> {
        let left = eye_aspect_ratio(&self.left_eye)?;
        let right = eye_aspect_ratio(&self.right_eye)?;
        Some((left + right) / 2.0)
    }

    /// Build landmarks whose eyes both have exactly the given aspect ratio.
    pub fn with_openness(ratio: f32) -> Self {
        Self {
            left_eye: synthetic_eye(0.0, ratio),
            right_eye: synthetic_eye(2.0, ratio),
        }
    }
}

/// Eye aspect ratio for a single eye.
pub fn eye_aspect_ratio(eye: &[Point; 6]) -> Option<f32> {
    let width = eye[0].distance(&eye[3]);
    if width <= f32::EPSILON {
        return None;
    }
    let vertical = eye[1].distance(&eye[5]) + eye[2].distance(&eye[4]);
    Some(vertical / (2.0 * width))
}

/// Unit-width eye starting at `x0` with the given openness.
fn synthetic_eye(x0: f32, ratio: f32) -> [Point; 6] {
    let half = ratio / 2.0;
    [
        Point::new(x0, 0.0),
        Point::new(x0 + 1.0 / 3.0, half),
        Point::new(x0 + 2.0 / 3.0, half),
        Point::new(x0 + 1.0, 0.0),
        Point::new(x0 + 2.0 / 3.0, -half),
        Point::new(x0 + 1.0 / 3.0, -half),
    ]
}

/// Runs facial landmark detection on a frame.
#[async_trait]
pub trait LandmarkDetector: Send + Sync {
    /// `Ok(None)` when no face is visible.
    async fn detect(&self, frame: &Frame) -> Result<Option<FaceLandmarks>, DetectError>;
}

/// Replays a recorded landmark track, one entry per detection call.
///
/// The track is a JSON array whose items are either `null` (no face) or
/// `{"left": [6 points], "right": [6 points]}` with points as
/// `{"x": .., "y": ..}`. Once the track is exhausted every further frame
/// reports no face.
pub struct ReplayDetector {
    track: Vec<Option<FaceLandmarks>>,
    cursor: AtomicUsize,
}

impl ReplayDetector {
    pub fn from_track(track: Vec<Option<FaceLandmarks>>) -> Self {
        Self {
            track,
            cursor: AtomicUsize::new(0),
        }
    }

    pub fn from_json(json: &str) -> Result<Self, DetectError> {
        let track: Vec<Option<FaceLandmarks>> = serde_json::from_str(json)?;
        Ok(Self::from_track(track))
    }

    pub fn from_path(path: &Path) -> Result<Self, DetectError> {
        let json = std::fs::read_to_string(path)?;
        let detector = Self::from_json(&json)?;
        info!(
            "Loaded landmark track from {} ({} samples)",
            path.display(),
            detector.track.len()
        );
        Ok(detector)
    }

    pub fn len(&self) -> usize {
        self.track.len()
    }

    pub fn is_empty(&self) -> bool {
        self.track.is_empty()
    }
}

#[async_trait]
impl LandmarkDetector for ReplayDetector {
    async fn detect(&self, frame: &Frame) -> Result<Option<FaceLandmarks>, DetectError> {
        let index = self.cursor.fetch_add(1, Ordering::Relaxed);
        let landmarks = self.track.get(index).cloned().flatten();
        debug!(
            "Replayed landmarks for frame {} (sample {}, face: {})",
            frame.sequence,
            index,
            landmarks.is_some()
        );
        Ok(landmarks)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_synthetic_eye_has_requested_ratio() {
        for ratio in [0.05_f32, 0.22, 0.31] {
            let face = FaceLandmarks::with_openness(ratio);
            let measured = face.openness_ratio().unwrap();
            assert!((measured - ratio).abs() < 1e-5, "{measured} != {ratio}");
        }
    }

    #[test]
    fn test_degenerate_eye_has_no_ratio() {
        let mut face = FaceLandmarks::with_openness(0.3);
        face.right_eye = [Point::new(1.0, 1.0); 6];
        assert_eq!(face.openness_ratio(), None);
    }

    #[test]
    fn test_ratio_averages_both_eyes() {
        let face = FaceLandmarks {
            left_eye: FaceLandmarks::with_openness(0.1).left_eye,
            right_eye: FaceLandmarks::with_openness(0.3).right_eye,
        };
        assert!((face.openness_ratio().unwrap() - 0.2).abs() < 1e-5);
    }

    #[tokio::test]
    async fn test_replay_detector_reads_json_track() {
        let open = serde_json::to_string(&FaceLandmarks::with_openness(0.3)).unwrap();
        let json = format!("[{open}, null]");
        let detector = ReplayDetector::from_json(&json).unwrap();
        assert_eq!(detector.len(), 2);

        let frame = Frame {
            sequence: 1,
            data: vec![],
        };
        assert!(detector.detect(&frame).await.unwrap().is_some());
        assert!(detector.detect(&frame).await.unwrap().is_none());
        // Past the end of the track
        assert!(detector.detect(&frame).await.unwrap().is_none());
    }

    #[test]
    fn test_replay_detector_rejects_bad_json() {
        assert!(matches!(
            ReplayDetector::from_json("[{\"left\": []}]"),
            Err(DetectError::Track(_))
        ));
    }
}
