//! Weather context resolution.
//!
//! `resolve()` never fails. Every failure path (no location, missing API
//! key, network error, non-2xx, malformed JSON) degrades to a synthetic
//! context picked uniformly at random from a fixed label set.

use crate::error::{RemoteError, Result};
use async_trait::async_trait;
use catalog::WeatherContext;
use rand::seq::IndexedRandom;
use rand::Rng;
use reqwest::Client;
use serde::Deserialize;
use std::sync::Arc;
use tracing::{debug, info, warn};

pub const DEFAULT_WEATHER_BASE_URL: &str = "https://api.openweathermap.org";

/// Fallback labels with a plausible temperature for each.
pub const SYNTHETIC_WEATHER: [(&str, f32); 6] = [
    ("Sunny", 28.0),
    ("Rainy", 18.0),
    ("Cloudy", 21.0),
    ("Snowy", -2.0),
    ("Windy", 15.0),
    ("Foggy", 12.0),
];

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Coordinates {
    pub latitude: f64,
    pub longitude: f64,
}

/// Single-shot device location lookup.
#[async_trait]
pub trait GeoLocator: Send + Sync {
    async fn locate(&self) -> Result<Coordinates>;
}

/// Location taken from configuration; `None` behaves like a denied
/// permission prompt.
#[derive(Debug, Clone, Default)]
pub struct StaticLocator {
    coordinates: Option<Coordinates>,
}

impl StaticLocator {
    pub fn new(coordinates: Option<Coordinates>) -> Self {
        Self { coordinates }
    }

    pub fn at(latitude: f64, longitude: f64) -> Self {
        Self::new(Some(Coordinates {
            latitude,
            longitude,
        }))
    }

    pub fn denied() -> Self {
        Self::new(None)
    }
}

#[async_trait]
impl GeoLocator for StaticLocator {
    async fn locate(&self) -> Result<Coordinates> {
        self.coordinates
            .ok_or_else(|| RemoteError::Location("location permission denied".to_string()))
    }
}

/// Produces the weather context for a pipeline run. Infallible.
#[async_trait]
pub trait WeatherProvider: Send + Sync {
    async fn resolve(&self) -> WeatherContext;
}

/// Pick a synthetic weather context uniformly at random.
pub fn synthetic_weather<R: Rng + ?Sized>(rng: &mut R) -> WeatherContext {
    let (label, temperature) = SYNTHETIC_WEATHER
        .choose(rng)
        .copied()
        .unwrap_or(SYNTHETIC_WEATHER[0]);
    WeatherContext::synthetic(label, temperature)
}

fn fallback_weather() -> WeatherContext {
    synthetic_weather(&mut rand::rng())
}

// =============================================================================
// OpenWeatherMap
// =============================================================================

#[derive(Debug, Deserialize)]
struct CurrentWeather {
    weather: Vec<Condition>,
    #[serde(default)]
    name: String,
    main: MainReadings,
}

#[derive(Debug, Deserialize)]
struct Condition {
    description: String,
}

#[derive(Debug, Deserialize)]
struct MainReadings {
    temp: f32,
}

/// Live weather via geolocation + the OpenWeatherMap current-weather API.
#[derive(Clone)]
pub struct OpenWeatherResolver {
    client: Client,
    base_url: String,
    api_key: Option<String>,
    locator: Arc<dyn GeoLocator>,
}

impl OpenWeatherResolver {
    /// Create a resolver. A missing key is allowed; every resolve then
    /// falls back to synthetic weather.
    pub fn new(api_key: Option<String>, locator: Arc<dyn GeoLocator>) -> Self {
        Self {
            client: Client::new(),
            base_url: DEFAULT_WEATHER_BASE_URL.to_string(),
            api_key: api_key.filter(|key| !key.trim().is_empty()),
            locator,
        }
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }

    /// One live lookup, surfacing every failure.
    pub async fn fetch(&self) -> Result<WeatherContext> {
        let api_key = self
            .api_key
            .as_deref()
            .ok_or_else(|| RemoteError::Config("weather API key not configured".to_string()))?;

        let coords = self.locator.locate().await?;
        debug!(
            "Looking up weather at ({:.3}, {:.3})",
            coords.latitude, coords.longitude
        );

        let response = self
            .client
            .get(format!("{}/data/2.5/weather", self.base_url))
            .query(&[
                ("lat", coords.latitude.to_string()),
                ("lon", coords.longitude.to_string()),
                ("appid", api_key.to_string()),
                ("units", "metric".to_string()),
            ])
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(RemoteError::from_response(response).await);
        }

        let body = response.text().await?;
        let current: CurrentWeather = serde_json::from_str(&body)?;
        let description = current
            .weather
            .into_iter()
            .next()
            .map(|condition| condition.description)
            .filter(|description| !description.trim().is_empty())
            .ok_or_else(|| RemoteError::Malformed("no weather condition".to_string()))?;
        let city = if current.name.trim().is_empty() {
            "Unknown".to_string()
        } else {
            current.name
        };

        Ok(WeatherContext::live(description, city, current.main.temp))
    }
}

#[async_trait]
impl WeatherProvider for OpenWeatherResolver {
    async fn resolve(&self) -> WeatherContext {
        match self.fetch().await {
            Ok(weather) => {
                info!("Resolved live weather: {}", weather.summary());
                weather
            }
            Err(err) => {
                let weather = fallback_weather();
                warn!(
                    "Weather lookup failed ({}), using synthetic weather: {}",
                    err, weather.description
                );
                weather
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use catalog::WeatherSource;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn test_synthetic_weather_uses_fixed_labels() {
        let mut rng = StdRng::seed_from_u64(7);
        for _ in 0..50 {
            let weather = synthetic_weather(&mut rng);
            assert_eq!(weather.source, WeatherSource::Synthetic);
            assert!(SYNTHETIC_WEATHER
                .iter()
                .any(|(label, _)| *label == weather.description));
        }
    }

    #[test]
    fn test_synthetic_weather_covers_all_labels() {
        let mut rng = StdRng::seed_from_u64(42);
        let mut seen = std::collections::HashSet::new();
        for _ in 0..500 {
            seen.insert(synthetic_weather(&mut rng).description);
        }
        assert_eq!(seen.len(), SYNTHETIC_WEATHER.len());
    }

    #[tokio::test]
    async fn test_missing_key_falls_back() {
        let resolver = OpenWeatherResolver::new(None, Arc::new(StaticLocator::at(18.5, 73.8)));
        assert!(matches!(resolver.fetch().await, Err(RemoteError::Config(_))));
        assert!(!resolver.resolve().await.is_live());
    }

    #[tokio::test]
    async fn test_denied_location_falls_back() {
        let resolver =
            OpenWeatherResolver::new(Some("key".to_string()), Arc::new(StaticLocator::denied()));
        assert!(matches!(
            resolver.fetch().await,
            Err(RemoteError::Location(_))
        ));
        assert!(!resolver.resolve().await.is_live());
    }
}
