//! Unified error types for the RealTalk feed client
//!
//! The feed client talks to exactly one external collaborator: a managed
//! auth + document store. This library describes everything that collaborator
//! can report back, so that each failure can be caught at the boundary where
//! it happens and turned into a short inline message.
//!
//! # Design Principles
//!
//! 1. **Type Safety**: one enum per boundary (auth, store writes, live queries)
//! 2. **Non-fatal**: every error has a user-facing message, none is terminal
//! 3. **No PII**: messages never echo back emails or passwords
//! 4. **Observability**: structured logging with tracing

pub mod auth;
pub mod store;
pub mod validation;

// Re-export common types
pub use auth::AuthError;
pub use store::{StoreError, SubscriptionError};
pub use validation::ValidationError;

/// Errors that can be rendered inline next to the control that failed
pub trait UserFacing {
    /// Short message suitable for an inline banner
    fn user_message(&self) -> String;

    /// Log error with appropriate level and context
    fn log(&self);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_no_pii_in_auth_messages() {
        let error = AuthError::InvalidEmail("someone@@example".to_string());

        let message = error.user_message();
        assert!(!message.contains("someone@@example"));
        assert_eq!(message, "Please enter a valid email address.");
    }

    #[test]
    fn test_store_message_falls_back_when_blank() {
        let error = StoreError::Unavailable("   ".to_string());
        assert_eq!(error.message(), None);

        let error = StoreError::PermissionDenied("Missing or insufficient permissions.".to_string());
        assert_eq!(error.message(), Some("Missing or insufficient permissions."));
    }

    #[test]
    fn test_subscription_messages_are_generic() {
        let error = SubscriptionError::PermissionDenied("rules rejected list on /posts".to_string());
        assert!(!error.user_message().contains("/posts"));
    }
}
