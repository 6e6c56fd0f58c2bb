//! Server crate for the Weather Genie.
//!
//! This crate contains the controller that sequences liveness, capture,
//! weather, mood and recommendation, plus configuration loading and the
//! support checkout descriptor.

pub mod checkout;
pub mod config;
pub mod controller;
pub mod error;

pub use checkout::{launch_detached, CheckoutLauncher, CheckoutRequest, LoggingCheckout};
pub use config::GenieConfig;
pub use controller::{PipelineController, PipelineStatus, Recommendation};
pub use error::{CheckoutError, ConfigError, PipelineError};
