use liveness::DeviceError;
use std::path::PathBuf;
use thiserror::Error;

/// User-visible ways a pipeline run can end without a recommendation.
///
/// Degraded weather, mood or generation never show up here; those are
/// absorbed by their components.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum PipelineError {
    #[error("Camera unavailable: {0}")]
    Device(#[from] DeviceError),

    #[error("Liveness check timed out after {blinks} blink(s)")]
    Timeout { blinks: u32 },

    #[error("Pipeline run cancelled")]
    Cancelled,

    #[error("A pipeline run is already in progress")]
    Busy,
}

impl PipelineError {
    /// Whether restarting the session is a sensible next step.
    pub fn is_retryable(&self) -> bool {
        matches!(self, PipelineError::Timeout { .. })
    }
}

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read config {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Invalid config value for {field}: {reason}")]
    Invalid { field: &'static str, reason: String },
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CheckoutError {
    #[error("Checkout key not configured")]
    MissingKey,

    #[error("Checkout failed: {0}")]
    Failed(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_only_timeout_is_retryable() {
        assert!(PipelineError::Timeout { blinks: 1 }.is_retryable());
        assert!(!PipelineError::Device(DeviceError::Released).is_retryable());
        assert!(!PipelineError::Cancelled.is_retryable());
        assert!(!PipelineError::Busy.is_retryable());
    }
}
