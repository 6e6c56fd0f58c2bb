//! In-process adapters with call counters, for tests and the demo binary.

use crate::error::{RemoteError, Result};
use crate::mood::MoodClassifier;
use crate::textgen::{DecodingParams, TextGenerator};
use crate::weather::WeatherProvider;
use async_trait::async_trait;
use catalog::{MoodResult, WeatherContext};
use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;
use std::time::Duration;

/// Always resolves to the same weather.
#[derive(Debug)]
pub struct FixedWeather {
    weather: WeatherContext,
    calls: AtomicUsize,
}

impl FixedWeather {
    pub fn new(weather: WeatherContext) -> Self {
        Self {
            weather,
            calls: AtomicUsize::new(0),
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl WeatherProvider for FixedWeather {
    async fn resolve(&self) -> WeatherContext {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.weather.clone()
    }
}

/// Always infers the same mood.
#[derive(Debug)]
pub struct FixedMood {
    mood: MoodResult,
    calls: AtomicUsize,
    last_image_len: AtomicUsize,
}

impl FixedMood {
    pub fn new(mood: MoodResult) -> Self {
        Self {
            mood,
            calls: AtomicUsize::new(0),
            last_image_len: AtomicUsize::new(0),
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn last_image_len(&self) -> usize {
        self.last_image_len.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl MoodClassifier for FixedMood {
    async fn infer(&self, image: &[u8]) -> MoodResult {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.last_image_len.store(image.len(), Ordering::SeqCst);
        self.mood
    }
}

/// Replays queued completions in order. Once the queue is empty every call
/// fails.
#[derive(Debug, Default)]
pub struct ScriptedText {
    responses: Mutex<VecDeque<String>>,
    prompts: Mutex<Vec<String>>,
    delay: Option<Duration>,
}

impl ScriptedText {
    pub fn new<I, S>(responses: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            responses: Mutex::new(responses.into_iter().map(Into::into).collect()),
            prompts: Mutex::new(Vec::new()),
            delay: None,
        }
    }

    /// Sleep before answering, to exercise generation timeouts.
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    pub fn calls(&self) -> usize {
        self.prompts().len()
    }

    /// Every prompt received so far.
    pub fn prompts(&self) -> Vec<String> {
        self.prompts
            .lock()
            .map(|prompts| prompts.clone())
            .unwrap_or_default()
    }
}

#[async_trait]
impl TextGenerator for ScriptedText {
    async fn generate(&self, prompt: &str, _params: &DecodingParams) -> Result<String> {
        if let Ok(mut prompts) = self.prompts.lock() {
            prompts.push(prompt.to_string());
        }
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        let next = self
            .responses
            .lock()
            .ok()
            .and_then(|mut responses| responses.pop_front());
        next.ok_or_else(|| RemoteError::Malformed("no scripted response left".to_string()))
    }
}

/// Text service that is always down.
#[derive(Debug, Default)]
pub struct FailingText {
    calls: AtomicUsize,
}

impl FailingText {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl TextGenerator for FailingText {
    async fn generate(&self, _prompt: &str, _params: &DecodingParams) -> Result<String> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Err(RemoteError::Status {
            status: 503,
            body: "service unavailable".to_string(),
        })
    }
}
