//! Deterministic camera and detector for tests and demos.

use crate::error::{DetectError, DeviceError};
use crate::frame::{Camera, CameraHandle, CaptureStream, Frame};
use crate::landmarks::{FaceLandmarks, LandmarkDetector};
use async_trait::async_trait;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};

/// Eye ratio comfortably above the default closed threshold.
pub const OPEN: Option<f32> = Some(0.30);
/// Eye ratio comfortably below the default closed threshold.
pub const CLOSED: Option<f32> = Some(0.10);

/// Shared counters describing what happened to a `StaticCamera`.
#[derive(Debug, Default)]
pub struct CameraStats {
    acquisitions: AtomicUsize,
    grabs: AtomicU64,
    releases: AtomicUsize,
}

/// Point-in-time copy of `CameraStats`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CameraStatsSnapshot {
    pub acquisitions: usize,
    pub grabs: u64,
    pub releases: usize,
}

impl CameraStats {
    pub fn acquisitions(&self) -> usize {
        self.acquisitions.load(Ordering::SeqCst)
    }

    pub fn grabs(&self) -> u64 {
        self.grabs.load(Ordering::SeqCst)
    }

    pub fn releases(&self) -> usize {
        self.releases.load(Ordering::SeqCst)
    }

    /// Whether some handle is still holding the device.
    pub fn is_held(&self) -> bool {
        self.acquisitions() > self.releases()
    }

    pub fn snapshot(&self) -> CameraStatsSnapshot {
        CameraStatsSnapshot {
            acquisitions: self.acquisitions(),
            grabs: self.grabs(),
            releases: self.releases(),
        }
    }
}

/// Camera that always returns the same frame.
#[derive(Debug, Clone)]
pub struct StaticCamera {
    frame: Vec<u8>,
    denial: Option<DeviceError>,
    fail_after: Option<u64>,
    stats: Arc<CameraStats>,
}

impl StaticCamera {
    pub fn new() -> Self {
        Self {
            frame: b"\xFF\xD8static-frame\xFF\xD9".to_vec(),
            denial: None,
            fail_after: None,
            stats: Arc::new(CameraStats::default()),
        }
    }

    /// Refuse every acquisition with the given error.
    pub fn denied(error: DeviceError) -> Self {
        Self {
            denial: Some(error),
            ..Self::new()
        }
    }

    /// Start failing grabs after `grabs` successful ones.
    pub fn failing_after(mut self, grabs: u64) -> Self {
        self.fail_after = Some(grabs);
        self
    }

    pub fn with_frame(mut self, frame: Vec<u8>) -> Self {
        self.frame = frame;
        self
    }

    pub fn stats(&self) -> Arc<CameraStats> {
        self.stats.clone()
    }
}

impl Default for StaticCamera {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Camera for StaticCamera {
    async fn acquire(&self) -> Result<CameraHandle, DeviceError> {
        if let Some(err) = &self.denial {
            return Err(err.clone());
        }
        self.stats.acquisitions.fetch_add(1, Ordering::SeqCst);
        Ok(CameraHandle::new(
            "static",
            Box::new(StaticStream {
                frame: self.frame.clone(),
                fail_after: self.fail_after,
                stats: self.stats.clone(),
            }),
        ))
    }
}

struct StaticStream {
    frame: Vec<u8>,
    fail_after: Option<u64>,
    stats: Arc<CameraStats>,
}

impl CaptureStream for StaticStream {
    fn grab(&mut self) -> Result<Frame, DeviceError> {
        let grabbed = self.stats.grabs.load(Ordering::SeqCst);
        if self.fail_after.is_some_and(|limit| grabbed >= limit) {
            return Err(DeviceError::Unavailable("device disconnected".to_string()));
        }
        let sequence = self.stats.grabs.fetch_add(1, Ordering::SeqCst) + 1;
        Ok(Frame {
            sequence,
            data: self.frame.clone(),
        })
    }

    fn stop(&mut self) {
        self.stats.releases.fetch_add(1, Ordering::SeqCst);
    }
}

/// Detector that replays a script of eye ratios, one per call.
///
/// `None` entries mean "no face". After the script runs out every call
/// reports open eyes.
#[derive(Debug)]
pub struct ScriptedDetector {
    script: Vec<Option<f32>>,
    calls: AtomicUsize,
}

impl ScriptedDetector {
    pub fn new(script: Vec<Option<f32>>) -> Self {
        Self {
            script,
            calls: AtomicUsize::new(0),
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl LandmarkDetector for ScriptedDetector {
    async fn detect(&self, _frame: &Frame) -> Result<Option<FaceLandmarks>, DetectError> {
        let index = self.calls.fetch_add(1, Ordering::SeqCst);
        let ratio = self.script.get(index).copied().unwrap_or(OPEN);
        Ok(ratio.map(FaceLandmarks::with_openness))
    }
}
