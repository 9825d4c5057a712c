//! Marketplace error types.

use std::fmt;
use std::future::Future;

use market_commerce::{CommerceError, SelectionError};
use thiserror::Error;

/// Error code the host raises when the caller may not create administrators.
pub const INSUFFICIENT_PERMISSIONS: &str = "error.active-user-does-not-have-sufficient-permissions";

/// An error reported by a host service.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("{message}")]
pub struct BackendError {
    /// Machine-readable code such as `error.entity-not-found`.
    pub code: Option<String>,
    pub message: String,
}

impl BackendError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            code: None,
            message: message.into(),
        }
    }

    pub fn with_code(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            code: Some(code.into()),
            message: message.into(),
        }
    }

    /// Whether the code or message names `code`.
    pub fn is(&self, code: &str) -> bool {
        self.code.as_deref() == Some(code) || self.message.contains(code)
    }
}

impl From<CommerceError> for BackendError {
    fn from(e: CommerceError) -> Self {
        BackendError::new(e.to_string())
    }
}

/// Errors surfaced by marketplace operations.
#[derive(Error, Debug)]
pub enum MarketplaceError {
    /// A precondition failed; the message is shown verbatim.
    #[error("{0}")]
    Precondition(String),

    /// An upstream call failed during a labelled step.
    #[error("[{step}] {message}")]
    Step { step: String, message: String },

    /// Shipping selection problem.
    #[error(transparent)]
    Selection(#[from] SelectionError),

    /// Domain rule violated.
    #[error(transparent)]
    Commerce(#[from] CommerceError),

    /// Unlabelled host failure.
    #[error(transparent)]
    Backend(#[from] BackendError),
}

impl MarketplaceError {
    pub fn precondition(message: impl Into<String>) -> Self {
        MarketplaceError::Precondition(message.into())
    }

    /// A failure attributed to `step`.
    pub fn step(step: impl Into<String>, message: impl fmt::Display) -> Self {
        MarketplaceError::Step {
            step: step.into(),
            message: message.to_string(),
        }
    }
}

/// Await `fut`, labelling any failure with `label`.
pub async fn step<T, E, F>(label: impl Into<String>, fut: F) -> Result<T, MarketplaceError>
where
    F: Future<Output = Result<T, E>>,
    E: fmt::Display,
{
    fut.await.map_err(|e| MarketplaceError::step(label, e))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_step_labels_failure() {
        let result: Result<(), _> = step("create seller", async {
            Err::<(), _>(BackendError::new("duplicate name"))
        })
        .await;
        assert_eq!(result.unwrap_err().to_string(), "[create seller] duplicate name");
    }

    #[tokio::test]
    async fn test_step_passes_value() {
        let value = step("noop", async { Ok::<_, BackendError>(7) }).await.unwrap();
        assert_eq!(value, 7);
    }

    #[test]
    fn test_precondition_verbatim() {
        assert_eq!(
            MarketplaceError::precondition("No active order").to_string(),
            "No active order"
        );
    }

    #[test]
    fn test_selection_message() {
        let err: MarketplaceError = SelectionError::NoShippingMethod.into();
        assert_eq!(err.to_string(), "No shippingMethodId provided");
    }

    #[test]
    fn test_backend_error_is() {
        let err = BackendError::with_code(INSUFFICIENT_PERMISSIONS, "Forbidden");
        assert!(err.is(INSUFFICIENT_PERMISSIONS));
        assert!(BackendError::new(INSUFFICIENT_PERMISSIONS).is(INSUFFICIENT_PERMISSIONS));
        assert!(!BackendError::new("Forbidden").is(INSUFFICIENT_PERMISSIONS));
    }
}
