//! Facial-expression mood inference over the HuggingFace inference API.

use crate::error::{RemoteError, Result};
use async_trait::async_trait;
use catalog::{Mood, MoodResult};
use reqwest::header::{AUTHORIZATION, CONTENT_TYPE};
use reqwest::Client;
use serde::Deserialize;
use std::time::Duration;
use tracing::{debug, info, warn};

pub const DEFAULT_MOOD_ENDPOINT: &str =
    "https://api-inference.huggingface.co/models/trpakov/vit-face-expression";

pub const DEFAULT_MOOD_TIMEOUT: Duration = Duration::from_secs(20);

/// Maps a still image to a canonical mood. Infallible: any failure yields
/// `MoodResult::fallback()`.
#[async_trait]
pub trait MoodClassifier: Send + Sync {
    async fn infer(&self, image: &[u8]) -> MoodResult;
}

/// One entry of the classifier's ranked output.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct LabelScore {
    pub label: String,
    pub score: f32,
}

/// The API returns either a flat ranking or a ranking per input image.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum Predictions {
    Flat(Vec<LabelScore>),
    Batched(Vec<Vec<LabelScore>>),
}

impl Predictions {
    fn into_flat(self) -> Vec<LabelScore> {
        match self {
            Predictions::Flat(scores) => scores,
            Predictions::Batched(batches) => batches.into_iter().next().unwrap_or_default(),
        }
    }
}

/// Highest-scoring label, ignoring ties.
pub fn top_label(predictions: &[LabelScore]) -> Option<&LabelScore> {
    predictions.iter().max_by(|a, b| {
        a.score
            .partial_cmp(&b.score)
            .unwrap_or(std::cmp::Ordering::Equal)
    })
}

#[derive(Debug, Clone)]
pub struct HuggingFaceMoodClient {
    client: Client,
    endpoint: String,
    api_key: Option<String>,
    timeout: Duration,
}

impl HuggingFaceMoodClient {
    pub fn new(api_key: Option<String>) -> Self {
        Self {
            client: Client::new(),
            endpoint: DEFAULT_MOOD_ENDPOINT.to_string(),
            api_key: api_key.filter(|key| !key.trim().is_empty()),
            timeout: DEFAULT_MOOD_TIMEOUT,
        }
    }

    pub fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = endpoint.into();
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Raw ranked labels for an image.
    pub async fn classify(&self, image: &[u8]) -> Result<Vec<LabelScore>> {
        let api_key = self
            .api_key
            .as_deref()
            .ok_or_else(|| RemoteError::Config("mood API key not configured".to_string()))?;

        let response = self
            .client
            .post(&self.endpoint)
            .header(AUTHORIZATION, format!("Bearer {}", api_key))
            .header(CONTENT_TYPE, "application/octet-stream")
            .timeout(self.timeout)
            .body(image.to_vec())
            .send()
            .await
            .map_err(|err| {
                if err.is_timeout() {
                    RemoteError::Timeout(self.timeout)
                } else {
                    RemoteError::Network(err)
                }
            })?;

        if !response.status().is_success() {
            return Err(RemoteError::from_response(response).await);
        }

        let body = response.text().await?;
        let predictions: Predictions = serde_json::from_str(&body)?;
        let predictions = predictions.into_flat();
        debug!("Mood classifier returned {} labels", predictions.len());
        Ok(predictions)
    }
}

#[async_trait]
impl MoodClassifier for HuggingFaceMoodClient {
    async fn infer(&self, image: &[u8]) -> MoodResult {
        let predictions = match self.classify(image).await {
            Ok(predictions) => predictions,
            Err(err) => {
                warn!("Mood inference failed ({}), falling back to {}", err, Mood::FALLBACK);
                return MoodResult::fallback();
            }
        };

        match top_label(&predictions).and_then(|top| Mood::from_label(&top.label)) {
            Some(mood) => {
                info!("Inferred mood: {}", mood);
                MoodResult::inferred(mood)
            }
            None => {
                warn!(
                    "No usable mood label in {:?}, falling back to {}",
                    top_label(&predictions).map(|top| top.label.as_str()),
                    Mood::FALLBACK
                );
                MoodResult::fallback()
            }
        }
    }
}
