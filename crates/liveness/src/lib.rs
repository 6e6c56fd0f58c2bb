//! # Liveness Crate
//!
//! Camera access and the blink-based liveness gate.
//!
//! ## Components
//!
//! ### FrameSource
//! - `Camera` opens a device and returns a `CameraHandle`
//! - `CameraHandle` grabs stills and releases the device exactly once,
//!   explicitly or on drop
//! - `DirectoryCamera` replays stills from disk
//!
//! ### Liveness
//! - `LandmarkDetector` turns a frame into eye landmarks
//! - `LivenessSession` is the pure blink-counting state machine
//! - `LivenessGate` samples frames on a fixed cadence and races the session
//!   against its deadline and external cancellation
//!
//! ## Example Usage
//!
//! ```ignore
//! use liveness::{Camera, DirectoryCamera, LivenessGate, ReplayDetector, GateOutcome};
//! use tokio_util::sync::CancellationToken;
//!
//! let camera = DirectoryCamera::new("frames/");
//! let gate = LivenessGate::new(Arc::new(ReplayDetector::from_path(track)?));
//!
//! let mut handle = camera.acquire().await?;
//! let outcome = gate.run(&mut handle, &CancellationToken::new(), |_| {}).await;
//! handle.release();
//! ```

pub mod error;
pub mod fake;
pub mod frame;
pub mod gate;
pub mod landmarks;
pub mod session;

// Re-export commonly used types
pub use error::{DetectError, DeviceError};
pub use frame::{Camera, CameraHandle, CaptureStream, DirectoryCamera, Frame};
pub use gate::{GateOutcome, LivenessGate};
pub use landmarks::{eye_aspect_ratio, FaceLandmarks, LandmarkDetector, Point, ReplayDetector};
pub use session::{GateConfig, LivenessSession, LivenessSnapshot, LivenessState, Observation};
