//! # Remote Client
//!
//! Adapters for the three remote services a pipeline run depends on:
//!
//! - `WeatherProvider`: geolocation + current weather, degrading to a
//!   synthetic context on any failure
//! - `MoodClassifier`: facial-expression classification, degrading to
//!   `MoodResult::fallback()`
//! - `TextGenerator`: free-form suggestion text. Errors propagate to the
//!   caller.
//!
//! ## Example Usage
//!
//! ```ignore
//! use remote_client::{HuggingFaceMoodClient, MoodClassifier};
//!
//! let client = HuggingFaceMoodClient::new(Some(api_key));
//! let mood = client.infer(&jpeg_bytes).await;
//! println!("{} ({:?})", mood.mood, mood.source);
//! ```

pub mod error;
pub mod fake;
pub mod mood;
pub mod textgen;
pub mod weather;

pub use error::{RemoteError, Result};
pub use mood::{top_label, HuggingFaceMoodClient, LabelScore, MoodClassifier};
pub use textgen::{strip_prompt, DecodingParams, HuggingFaceTextClient, TextGenerator};
pub use weather::{
    synthetic_weather, Coordinates, GeoLocator, OpenWeatherResolver, StaticLocator,
    WeatherProvider, SYNTHETIC_WEATHER,
};
