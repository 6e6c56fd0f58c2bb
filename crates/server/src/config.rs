//! Configuration loading.
//!
//! Settings come from an optional TOML file; every field has a default so
//! an empty or missing file is valid. API keys resolve ENV → TOML.
//!
//! ```toml
//! [weather]
//! api_key = "..."
//! latitude = 18.52
//! longitude = 73.85
//!
//! [liveness]
//! deadline_secs = 20
//! ```

use crate::error::ConfigError;
use liveness::GateConfig;
use remote_client::{Coordinates, DecodingParams};
use serde::Deserialize;
use std::path::Path;
use std::time::Duration;
use tracing::{debug, info, warn};

pub const WEATHER_KEY_ENV: &str = "GENIE_OPENWEATHER_API_KEY";
pub const HF_KEY_ENV: &str = "GENIE_HF_API_KEY";
pub const CHECKOUT_KEY_ENV: &str = "GENIE_CHECKOUT_KEY";

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct GenieConfig {
    pub weather: WeatherSection,
    pub mood: MoodSection,
    pub text: TextSection,
    pub liveness: LivenessSection,
    pub checkout: CheckoutSection,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct WeatherSection {
    pub api_key: Option<String>,
    pub base_url: String,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
}

impl Default for WeatherSection {
    fn default() -> Self {
        Self {
            api_key: None,
            base_url: remote_client::weather::DEFAULT_WEATHER_BASE_URL.to_string(),
            latitude: None,
            longitude: None,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct MoodSection {
    pub api_key: Option<String>,
    pub endpoint: String,
    pub timeout_secs: u64,
}

impl Default for MoodSection {
    fn default() -> Self {
        Self {
            api_key: None,
            endpoint: remote_client::mood::DEFAULT_MOOD_ENDPOINT.to_string(),
            timeout_secs: remote_client::mood::DEFAULT_MOOD_TIMEOUT.as_secs(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct TextSection {
    pub api_key: Option<String>,
    pub endpoint: String,
    pub temperature: f32,
    pub top_p: f32,
    pub max_new_tokens: u32,
    pub timeout_secs: u64,
}

impl Default for TextSection {
    fn default() -> Self {
        let params = DecodingParams::default();
        Self {
            api_key: None,
            endpoint: remote_client::textgen::DEFAULT_TEXT_ENDPOINT.to_string(),
            temperature: params.temperature,
            top_p: params.top_p,
            max_new_tokens: params.max_new_tokens,
            timeout_secs: params.timeout.as_secs(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LivenessSection {
    pub required_blinks: u32,
    pub closed_threshold: f32,
    pub debounce_ms: u64,
    pub sample_interval_ms: u64,
    pub deadline_secs: u64,
}

impl Default for LivenessSection {
    fn default() -> Self {
        let gate = GateConfig::default();
        Self {
            required_blinks: gate.required_blinks,
            closed_threshold: gate.closed_threshold,
            debounce_ms: gate.debounce.as_millis() as u64,
            sample_interval_ms: gate.sample_interval.as_millis() as u64,
            deadline_secs: gate.deadline.as_secs(),
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct CheckoutSection {
    pub key: Option<String>,
}

impl GenieConfig {
    /// Load from `path`, or defaults when no path is given.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let config = match path {
            Some(path) => {
                let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
                    path: path.to_path_buf(),
                    source,
                })?;
                info!("Loaded config from {}", path.display());
                Self::from_toml_str(&content)?
            }
            None => {
                debug!("No config file given, using defaults");
                Self::default()
            }
        };
        Ok(config)
    }

    /// Parse and validate a TOML document.
    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        let config: GenieConfig = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        let invalid = |field, reason: &str| ConfigError::Invalid {
            field,
            reason: reason.to_string(),
        };

        if self.liveness.required_blinks == 0 {
            return Err(invalid("liveness.required_blinks", "must be at least 1"));
        }
        if !(self.liveness.closed_threshold > 0.0 && self.liveness.closed_threshold < 1.0) {
            return Err(invalid("liveness.closed_threshold", "must lie in (0, 1)"));
        }
        if self.liveness.sample_interval_ms == 0 {
            return Err(invalid("liveness.sample_interval_ms", "must be positive"));
        }
        if self.liveness.deadline_secs == 0 {
            return Err(invalid("liveness.deadline_secs", "must be positive"));
        }
        if self.text.temperature <= 0.0 {
            return Err(invalid("text.temperature", "must be positive"));
        }
        if !(self.text.top_p > 0.0 && self.text.top_p <= 1.0) {
            return Err(invalid("text.top_p", "must lie in (0, 1]"));
        }
        if self.text.timeout_secs == 0 {
            return Err(invalid("text.timeout_secs", "must be positive"));
        }
        if self.weather.latitude.is_some() != self.weather.longitude.is_some() {
            return Err(invalid(
                "weather.latitude/longitude",
                "set both or neither",
            ));
        }
        Ok(())
    }

    pub fn gate_config(&self) -> GateConfig {
        GateConfig::default()
            .with_required_blinks(self.liveness.required_blinks)
            .with_closed_threshold(self.liveness.closed_threshold)
            .with_debounce(Duration::from_millis(self.liveness.debounce_ms))
            .with_sample_interval(Duration::from_millis(self.liveness.sample_interval_ms))
            .with_deadline(Duration::from_secs(self.liveness.deadline_secs))
    }

    pub fn decoding_params(&self) -> DecodingParams {
        DecodingParams::default()
            .with_temperature(self.text.temperature)
            .with_top_p(self.text.top_p)
            .with_max_new_tokens(self.text.max_new_tokens)
            .with_timeout(Duration::from_secs(self.text.timeout_secs))
    }

    pub fn mood_timeout(&self) -> Duration {
        Duration::from_secs(self.mood.timeout_secs)
    }

    /// Configured device location, if any.
    pub fn coordinates(&self) -> Option<Coordinates> {
        match (self.weather.latitude, self.weather.longitude) {
            (Some(latitude), Some(longitude)) => Some(Coordinates {
                latitude,
                longitude,
            }),
            _ => None,
        }
    }

    pub fn weather_api_key(&self) -> Option<String> {
        resolve_key(WEATHER_KEY_ENV, self.weather.api_key.as_deref())
    }

    /// Key for both inference endpoints; `[mood]` wins over `[text]` in TOML.
    pub fn hf_api_key(&self) -> Option<String> {
        let toml_key = self
            .mood
            .api_key
            .as_deref()
            .filter(|key| is_valid_key(key))
            .or(self.text.api_key.as_deref());
        resolve_key(HF_KEY_ENV, toml_key)
    }

    pub fn checkout_key(&self) -> Option<String> {
        resolve_key(CHECKOUT_KEY_ENV, self.checkout.key.as_deref())
    }
}

/// Resolve a key from the environment, then TOML.
pub fn resolve_key(env_var: &str, toml_key: Option<&str>) -> Option<String> {
    let env_key = std::env::var(env_var).ok();
    let resolved = select_key(env_key.as_deref(), toml_key);
    match (&resolved, env_key.as_deref().is_some_and(is_valid_key)) {
        (Some(_), true) => debug!("{} loaded from environment", env_var),
        (Some(_), false) => debug!("{} loaded from TOML config", env_var),
        (None, _) => warn!("{} not configured; dependent service will use fallbacks", env_var),
    }
    resolved
}

/// Priority: ENV → TOML. Blank values count as absent.
pub fn select_key(env_key: Option<&str>, toml_key: Option<&str>) -> Option<String> {
    env_key
        .filter(|key| is_valid_key(key))
        .or(toml_key.filter(|key| is_valid_key(key)))
        .map(|key| key.trim().to_string())
}

/// Validate API key (non-empty, non-whitespace)
pub fn is_valid_key(key: &str) -> bool {
    !key.trim().is_empty()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_document_gives_defaults() {
        let config = GenieConfig::from_toml_str("").unwrap();
        assert_eq!(config.liveness.required_blinks, 2);
        assert_eq!(config.liveness.deadline_secs, 15);
        assert_eq!(config.gate_config().debounce, Duration::from_millis(400));
        assert_eq!(config.decoding_params(), DecodingParams::default());
        assert!(config.coordinates().is_none());
    }

    #[test]
    fn test_sections_override_defaults() {
        let config = GenieConfig::from_toml_str(
            r#"
            [weather]
            latitude = 18.52
            longitude = 73.85

            [text]
            temperature = 0.5
            max_new_tokens = 120

            [liveness]
            required_blinks = 3
            sample_interval_ms = 100
            "#,
        )
        .unwrap();

        assert_eq!(
            config.coordinates(),
            Some(Coordinates {
                latitude: 18.52,
                longitude: 73.85
            })
        );
        let params = config.decoding_params();
        assert_eq!(params.temperature, 0.5);
        assert_eq!(params.max_new_tokens, 120);
        assert_eq!(params.top_p, 0.9);

        let gate = config.gate_config();
        assert_eq!(gate.required_blinks, 3);
        assert_eq!(gate.sample_interval, Duration::from_millis(100));
    }

    #[test]
    fn test_invalid_values_rejected() {
        let err = GenieConfig::from_toml_str("[liveness]\nclosed_threshold = 1.5").unwrap_err();
        assert!(matches!(
            err,
            ConfigError::Invalid {
                field: "liveness.closed_threshold",
                ..
            }
        ));

        let err = GenieConfig::from_toml_str("[weather]\nlatitude = 1.0").unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { .. }));

        assert!(matches!(
            GenieConfig::from_toml_str("[liveness\n"),
            Err(ConfigError::Parse(_))
        ));
    }

    #[test]
    fn test_missing_file_is_io_error() {
        let err = GenieConfig::load(Some(Path::new("/nonexistent/genie.toml"))).unwrap_err();
        assert!(matches!(err, ConfigError::Io { .. }));
        assert!(GenieConfig::load(None).is_ok());
    }

    #[test]
    fn test_key_priority() {
        assert_eq!(select_key(Some("env"), Some("toml")).as_deref(), Some("env"));
        assert_eq!(select_key(Some("  "), Some("toml")).as_deref(), Some("toml"));
        assert_eq!(select_key(None, Some(" toml ")).as_deref(), Some("toml"));
        assert_eq!(select_key(None, Some("")), None);
        assert_eq!(select_key(None, None), None);
    }

    #[test]
    fn test_is_valid_key() {
        assert!(is_valid_key("abc"));
        assert!(!is_valid_key(""));
        assert!(!is_valid_key(" \t\n"));
    }
}
