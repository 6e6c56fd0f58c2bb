//! Camera access: acquiring a device, grabbing stills, releasing it.
//!
//! A `CameraHandle` owns the open capture stream. Releasing it is
//! idempotent and also happens on drop, so every exit path of the
//! pipeline (success, timeout, error, cancellation, panic unwinding)
//! hands the device back.

use crate::error::DeviceError;
use async_trait::async_trait;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// A single still image, encoded (JPEG/PNG) as produced by the device.
#[derive(Debug, Clone)]
pub struct Frame {
    pub sequence: u64,
    pub data: Vec<u8>,
}

/// An open capture stream. Implementations hold the physical device.
pub trait CaptureStream: Send {
    /// Grab the most recent frame.
    fn grab(&mut self) -> Result<Frame, DeviceError>;

    /// Stop capturing and hand the device back. Called at most once.
    fn stop(&mut self);
}

/// Something that can be opened for capture.
#[async_trait]
pub trait Camera: Send + Sync {
    /// Open the device. Fails with `DeviceError` on permission or hardware
    /// problems.
    async fn acquire(&self) -> Result<CameraHandle, DeviceError>;
}

/// Scoped ownership of an open camera.
pub struct CameraHandle {
    stream: Option<Box<dyn CaptureStream>>,
    label: String,
}

impl CameraHandle {
    pub fn new(label: impl Into<String>, stream: Box<dyn CaptureStream>) -> Self {
        Self {
            stream: Some(stream),
            label: label.into(),
        }
    }

    /// Grab one still frame.
    pub fn capture_still(&mut self) -> Result<Frame, DeviceError> {
        match self.stream.as_mut() {
            Some(stream) => stream.grab(),
            None => Err(DeviceError::Released),
        }
    }

    /// Stop the stream. Safe to call any number of times.
    pub fn release(&mut self) {
        if let Some(mut stream) = self.stream.take() {
            stream.stop();
            info!("Released camera {}", self.label);
        }
    }

    pub fn is_released(&self) -> bool {
        self.stream.is_none()
    }

    pub fn label(&self) -> &str {
        &self.label
    }
}

impl Drop for CameraHandle {
    fn drop(&mut self) {
        self.release();
    }
}

impl std::fmt::Debug for CameraHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CameraHandle")
            .field("label", &self.label)
            .field("released", &self.is_released())
            .finish()
    }
}

// =============================================================================
// Directory-backed camera
// =============================================================================

const FRAME_EXTENSIONS: [&str; 3] = ["jpg", "jpeg", "png"];

/// Replays still images from a directory as if they came from a webcam.
///
/// Files are read when the camera is acquired, then served in lexical
/// order, wrapping around at the end. Useful on machines without a capture
/// device and for recorded sessions.
#[derive(Debug, Clone)]
pub struct DirectoryCamera {
    dir: PathBuf,
}

impl DirectoryCamera {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }
}

#[async_trait]
impl Camera for DirectoryCamera {
    async fn acquire(&self) -> Result<CameraHandle, DeviceError> {
        let context = self.dir.display().to_string();
        let mut entries = tokio::fs::read_dir(&self.dir)
            .await
            .map_err(|e| DeviceError::from_io(&context, &e))?;

        let mut files = Vec::new();
        while let Some(entry) = entries
            .next_entry()
            .await
            .map_err(|e| DeviceError::from_io(&context, &e))?
        {
            let path = entry.path();
            let is_frame = path
                .extension()
                .and_then(|ext| ext.to_str())
                .map(|ext| FRAME_EXTENSIONS.contains(&ext.to_lowercase().as_str()))
                .unwrap_or(false);
            if is_frame {
                files.push(path);
            }
        }

        if files.is_empty() {
            return Err(DeviceError::NotFound(format!("no frames in {}", context)));
        }
        files.sort();

        // Frames are loaded up front so grabbing never touches the disk
        let mut frames = Vec::with_capacity(files.len());
        for path in &files {
            let data = tokio::fs::read(path)
                .await
                .map_err(|e| DeviceError::from_io(&path.display().to_string(), &e))?;
            frames.push(data);
        }

        info!("Acquired directory camera {} ({} frames)", context, frames.len());
        Ok(CameraHandle::new(
            context,
            Box::new(DirectoryStream {
                frames,
                cursor: 0,
                sequence: 0,
            }),
        ))
    }
}

struct DirectoryStream {
    frames: Vec<Vec<u8>>,
    cursor: usize,
    sequence: u64,
}

impl CaptureStream for DirectoryStream {
    fn grab(&mut self) -> Result<Frame, DeviceError> {
        let data = self.frames[self.cursor].clone();
        self.cursor = (self.cursor + 1) % self.frames.len();
        self.sequence += 1;
        debug!("Grabbed frame {}", self.sequence);
        Ok(Frame {
            sequence: self.sequence,
            data,
        })
    }

    fn stop(&mut self) {
        debug!("Directory stream stopped after {} frames", self.sequence);
    }
}
