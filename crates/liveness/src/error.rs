//! Error types for camera access and landmark detection.

use thiserror::Error;

/// Camera/device failures. Always terminal for a liveness session.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DeviceError {
    /// The user or OS refused access to the camera
    #[error("Camera permission denied: {0}")]
    PermissionDenied(String),

    /// No usable capture device
    #[error("Camera not found: {0}")]
    NotFound(String),

    /// The device went away or returned garbage mid-session
    #[error("Camera unavailable: {0}")]
    Unavailable(String),

    /// Capture attempted after the handle was released
    #[error("Camera handle already released")]
    Released,
}

impl DeviceError {
    /// Classify an I/O error raised while opening or reading a device.
    pub fn from_io(context: &str, err: &std::io::Error) -> Self {
        match err.kind() {
            std::io::ErrorKind::PermissionDenied => {
                DeviceError::PermissionDenied(format!("{}: {}", context, err))
            }
            std::io::ErrorKind::NotFound => DeviceError::NotFound(format!("{}: {}", context, err)),
            _ => DeviceError::Unavailable(format!("{}: {}", context, err)),
        }
    }
}

/// Landmark detection failures. Never terminal: the frame is skipped.
#[derive(Error, Debug)]
pub enum DetectError {
    #[error("Landmark model failed: {0}")]
    Model(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid landmark track: {0}")]
    Track(#[from] serde_json::Error),
}
