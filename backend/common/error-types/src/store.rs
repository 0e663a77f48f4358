//! Document store error types
//!
//! Two boundaries: one-shot writes (`StoreError`) and live ordered
//! queries (`SubscriptionError`).

use crate::UserFacing;
use thiserror::Error;

const GENERIC_STORE_MESSAGE: &str = "Something went wrong. Please try again.";

/// Errors from appending a document
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StoreError {
    /// Security rules rejected the write
    #[error("Permission denied: {0}")]
    PermissionDenied(String),

    /// Store unreachable
    #[error("Store unavailable: {0}")]
    Unavailable(String),

    /// Write quota exhausted
    #[error("Quota exceeded: {0}")]
    QuotaExceeded(String),

    /// Document or collection rejected as malformed
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// Catch-all
    #[error("Internal store error: {0}")]
    Internal(String),
}

impl StoreError {
    /// Provider-supplied message, if it carries any text
    pub fn message(&self) -> Option<&str> {
        let message = match self {
            Self::PermissionDenied(msg)
            | Self::Unavailable(msg)
            | Self::QuotaExceeded(msg)
            | Self::InvalidArgument(msg)
            | Self::Internal(msg) => msg.as_str(),
        };

        if message.trim().is_empty() {
            None
        } else {
            Some(message)
        }
    }
}

impl UserFacing for StoreError {
    fn user_message(&self) -> String {
        self.message().unwrap_or(GENERIC_STORE_MESSAGE).to_string()
    }

    fn log(&self) {
        match self {
            Self::PermissionDenied(_) | Self::InvalidArgument(_) => {
                tracing::warn!(error = %self, "Store write rejected");
            }
            Self::Unavailable(_) | Self::QuotaExceeded(_) => {
                tracing::warn!(error = %self, "Store dependency issue");
            }
            Self::Internal(_) => {
                tracing::error!(error = %self, "Store error");
            }
        }
    }
}

/// Errors delivered on a live query's error channel
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SubscriptionError {
    /// Connection to the store lost or never established
    #[error("Subscription unavailable: {0}")]
    Unavailable(String),

    /// Security rules rejected the query
    #[error("Subscription permission denied: {0}")]
    PermissionDenied(String),

    /// Catch-all
    #[error("Subscription failed: {0}")]
    Internal(String),
}

impl UserFacing for SubscriptionError {
    fn user_message(&self) -> String {
        "Error connecting to the feed. Please check your connection.".to_string()
    }

    fn log(&self) {
        match self {
            Self::Unavailable(_) => tracing::warn!(error = %self, "Live query dropped"),
            Self::PermissionDenied(_) => tracing::warn!(error = %self, "Live query rejected"),
            Self::Internal(_) => tracing::error!(error = %self, "Live query error"),
        }
    }
}
