//! The blink-counting liveness state machine.
//!
//! ## States
//! ```text
//! Idle -> Capturing -> Unlocking -> Unlocked
//!            |            |
//!            +------------+--> TimedOut | Failed
//! ```
//! `Unlocking` means at least one blink was counted but the threshold has
//! not been reached yet. `Unlocked`, `TimedOut` and `Failed` are terminal;
//! the only way out is a fresh session.
//!
//! The session is pure: it never reads the clock or touches a device.
//! Callers feed it eye-openness samples with timestamps, which keeps the
//! timing rules testable without a runtime.

use serde::Serialize;
use tokio::time::{Duration, Instant};
use tracing::debug;

/// Tunables for a liveness session.
#[derive(Debug, Clone, PartialEq)]
pub struct GateConfig {
    /// Counted blinks needed to unlock
    pub required_blinks: u32,
    /// Eye aspect ratio below which the eye counts as closed
    pub closed_threshold: f32,
    /// Minimum time between two counted blinks
    pub debounce: Duration,
    /// Interval between sampled frames
    pub sample_interval: Duration,
    /// Wall-clock budget for the whole session
    pub deadline: Duration,
}

impl Default for GateConfig {
    fn default() -> Self {
        Self {
            required_blinks: 2,
            closed_threshold: 0.22,
            debounce: Duration::from_millis(400),
            sample_interval: Duration::from_millis(150),
            deadline: Duration::from_secs(15),
        }
    }
}

impl GateConfig {
    pub fn with_required_blinks(mut self, blinks: u32) -> Self {
        self.required_blinks = blinks;
        self
    }

    pub fn with_closed_threshold(mut self, threshold: f32) -> Self {
        self.closed_threshold = threshold;
        self
    }

    pub fn with_debounce(mut self, debounce: Duration) -> Self {
        self.debounce = debounce;
        self
    }

    pub fn with_sample_interval(mut self, interval: Duration) -> Self {
        self.sample_interval = interval;
        self
    }

    pub fn with_deadline(mut self, deadline: Duration) -> Self {
        self.deadline = deadline;
        self
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum LivenessState {
    Idle,
    Capturing,
    Unlocking,
    Unlocked,
    TimedOut,
    Failed,
}

impl LivenessState {
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            LivenessState::Unlocked | LivenessState::TimedOut | LivenessState::Failed
        )
    }
}

/// What a single sample did to the session
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Observation {
    /// Session not running (idle or already terminal)
    Ignored,
    /// No face / no usable ratio
    Skipped,
    /// Nothing changed
    Unchanged,
    /// Eye-closing edge
    EyeClosed,
    /// Completed blink accepted
    BlinkCounted,
    /// Completed blink inside the debounce window
    BlinkRejected,
    Unlocked,
    TimedOut,
}

/// Read-only view of a session for progress reporting
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct LivenessSnapshot {
    pub state: LivenessState,
    pub blink_count: u32,
    pub required_blinks: u32,
}

#[derive(Debug, Clone)]
pub struct LivenessSession {
    config: GateConfig,
    state: LivenessState,
    blink_count: u32,
    eye_closed: bool,
    last_blink_at: Option<Instant>,
    deadline: Option<Instant>,
}

impl LivenessSession {
    pub fn new(config: GateConfig) -> Self {
        Self {
            config,
            state: LivenessState::Idle,
            blink_count: 0,
            eye_closed: false,
            last_blink_at: None,
            deadline: None,
        }
    }

    /// `Idle -> Capturing`, arming the deadline. No-op in any other state.
    pub fn start(&mut self, now: Instant) -> bool {
        if self.state != LivenessState::Idle {
            return false;
        }
        self.state = LivenessState::Capturing;
        self.deadline = Some(now + self.config.deadline);
        true
    }

    /// Feed one sampled eye-openness ratio (`None` = no face in frame).
    pub fn observe(&mut self, ratio: Option<f32>, now: Instant) -> Observation {
        if !self.is_running() {
            return Observation::Ignored;
        }
        if self.deadline.is_some_and(|deadline| now >= deadline) {
            self.finish(LivenessState::TimedOut);
            return Observation::TimedOut;
        }

        let Some(ratio) = ratio else {
            return Observation::Skipped;
        };

        if ratio < self.config.closed_threshold {
            if self.eye_closed {
                return Observation::Unchanged;
            }
            self.eye_closed = true;
            return Observation::EyeClosed;
        }

        if !self.eye_closed {
            return Observation::Unchanged;
        }
        self.eye_closed = false;

        let debounced = self
            .last_blink_at
            .is_none_or(|last| now.duration_since(last) >= self.config.debounce);
        if !debounced {
            debug!("Blink rejected inside debounce window");
            return Observation::BlinkRejected;
        }

        self.blink_count += 1;
        self.last_blink_at = Some(now);
        debug!(
            "Blink counted ({}/{})",
            self.blink_count, self.config.required_blinks
        );

        if self.blink_count >= self.config.required_blinks {
            self.finish(LivenessState::Unlocked);
            Observation::Unlocked
        } else {
            self.state = LivenessState::Unlocking;
            Observation::BlinkCounted
        }
    }

    /// Deadline reached. Returns `false` if the session had already ended.
    pub fn expire(&mut self) -> bool {
        self.finish(LivenessState::TimedOut)
    }

    /// Device failure. Returns `false` if the session had already ended.
    pub fn fail(&mut self) -> bool {
        self.finish(LivenessState::Failed)
    }

    /// The single guarded terminal transition. Only the first caller wins.
    fn finish(&mut self, terminal: LivenessState) -> bool {
        if self.state.is_terminal() {
            return false;
        }
        self.state = terminal;
        true
    }

    fn is_running(&self) -> bool {
        matches!(
            self.state,
            LivenessState::Capturing | LivenessState::Unlocking
        )
    }

    pub fn state(&self) -> LivenessState {
        self.state
    }

    pub fn blink_count(&self) -> u32 {
        self.blink_count
    }

    pub fn is_eye_closed(&self) -> bool {
        self.eye_closed
    }

    pub fn last_blink_at(&self) -> Option<Instant> {
        self.last_blink_at
    }

    pub fn deadline(&self) -> Option<Instant> {
        self.deadline
    }

    pub fn is_terminal(&self) -> bool {
        self.state.is_terminal()
    }

    pub fn snapshot(&self) -> LivenessSnapshot {
        LivenessSnapshot {
            state: self.state,
            blink_count: self.blink_count,
            required_blinks: self.config.required_blinks,
        }
    }
}
