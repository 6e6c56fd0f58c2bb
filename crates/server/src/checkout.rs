//! "Support the Genie" checkout.
//!
//! Fire-and-forget: a launch never touches recommendation state, and its
//! failures are only logged.

use crate::error::CheckoutError;
use async_trait::async_trait;
use serde::Serialize;
use std::sync::Arc;
use tokio::task::JoinHandle;
use tracing::{info, warn};

/// Fixed support amount in minor currency units.
pub const SUPPORT_AMOUNT: u32 = 49_900;

/// Configuration handed to the payment SDK.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CheckoutRequest {
    pub key: String,
    pub amount: u32,
    pub currency: String,
    pub name: String,
    pub description: String,
    pub theme: CheckoutTheme,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CheckoutTheme {
    pub color: String,
}

impl CheckoutRequest {
    /// The fixed-amount support checkout.
    pub fn support(key: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            amount: SUPPORT_AMOUNT,
            currency: "INR".to_string(),
            name: "Weather Genie".to_string(),
            description: "Support the Genie!".to_string(),
            theme: CheckoutTheme {
                color: "#6366f1".to_string(),
            },
        }
    }
}

#[async_trait]
pub trait CheckoutLauncher: Send + Sync {
    /// Open the checkout. Returns the payment reference on success.
    async fn launch(&self, request: &CheckoutRequest) -> Result<String, CheckoutError>;
}

/// Launcher that only logs the request it would open.
#[derive(Debug, Default)]
pub struct LoggingCheckout;

#[async_trait]
impl CheckoutLauncher for LoggingCheckout {
    async fn launch(&self, request: &CheckoutRequest) -> Result<String, CheckoutError> {
        if request.key.trim().is_empty() {
            return Err(CheckoutError::MissingKey);
        }
        let payload = serde_json::to_string(request)
            .map_err(|err| CheckoutError::Failed(err.to_string()))?;
        info!("Opening checkout: {}", payload);
        Ok(format!("logged-{}-{}", request.currency, request.amount))
    }
}

/// Launch in the background; the outcome is logged and otherwise dropped.
pub fn launch_detached(
    launcher: Arc<dyn CheckoutLauncher>,
    request: CheckoutRequest,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        match launcher.launch(&request).await {
            Ok(reference) => info!("Checkout completed: {}", reference),
            Err(err) => warn!("Checkout did not complete: {}", err),
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_support_request_shape() {
        let request = CheckoutRequest::support("rzp_test_key");
        let value = serde_json::to_value(&request).unwrap();

        assert_eq!(value["amount"], 49_900);
        assert_eq!(value["currency"], "INR");
        assert_eq!(value["name"], "Weather Genie");
        assert_eq!(value["description"], "Support the Genie!");
        assert_eq!(value["theme"]["color"], "#6366f1");
    }

    #[tokio::test]
    async fn test_logging_checkout_requires_key() {
        let launcher = LoggingCheckout;
        assert_eq!(
            launcher.launch(&CheckoutRequest::support(" ")).await,
            Err(CheckoutError::MissingKey)
        );
        assert!(launcher.launch(&CheckoutRequest::support("k")).await.is_ok());
    }

    #[tokio::test]
    async fn test_detached_failure_is_swallowed() {
        let handle = launch_detached(Arc::new(LoggingCheckout), CheckoutRequest::support(""));
        assert!(handle.await.is_ok());
    }
}
