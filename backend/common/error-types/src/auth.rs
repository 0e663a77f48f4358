//! Authentication error types
//!
//! Errors reported by the auth collaborator (create account, sign in,
//! sign out) without exposing sensitive information.

use crate::UserFacing;
use thiserror::Error;

/// Authentication errors
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AuthError {
    /// Email/password pair did not match an account
    #[error("Invalid credentials")]
    InvalidCredentials,

    /// Signup with an email that already has an account
    #[error("Email already in use")]
    EmailAlreadyInUse,

    /// Email failed format validation
    #[error("Invalid email: {0}")]
    InvalidEmail(String),

    /// Password rejected by the provider's policy
    #[error("Password too weak: {0}")]
    WeakPassword(String),

    /// Operation needs a signed-in session
    #[error("Not signed in")]
    NotSignedIn,

    /// Provider unreachable
    #[error("Network error: {0}")]
    Network(String),

    /// Anything else the provider reports
    #[error("Internal auth error: {0}")]
    Internal(String),
}

impl UserFacing for AuthError {
    fn user_message(&self) -> String {
        match self {
            Self::InvalidCredentials => "Invalid email or password.".to_string(),
            Self::EmailAlreadyInUse => "An account with this email already exists.".to_string(),
            Self::InvalidEmail(_) => "Please enter a valid email address.".to_string(),
            // Policy text is provider-authored and carries no user input
            Self::WeakPassword(policy) => policy.clone(),
            Self::NotSignedIn => "You must be signed in to do that.".to_string(),
            Self::Network(_) => "Network error. Please check your connection.".to_string(),
            Self::Internal(_) => "Something went wrong. Please try again.".to_string(),
        }
    }

    fn log(&self) {
        match self {
            Self::InvalidCredentials
            | Self::EmailAlreadyInUse
            | Self::InvalidEmail(_)
            | Self::WeakPassword(_) => {
                tracing::debug!(error = %self, "Auth request rejected");
            }
            Self::NotSignedIn => {
                tracing::warn!(error = %self, "Auth required");
            }
            Self::Network(_) => {
                tracing::warn!(error = %self, "Auth provider unreachable");
            }
            Self::Internal(_) => {
                tracing::error!(error = %self, "Auth provider error");
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_weak_password_passes_policy_through() {
        let error = AuthError::WeakPassword("Password should be at least 6 characters".to_string());
        assert_eq!(error.user_message(), "Password should be at least 6 characters");
    }

    #[test]
    fn test_display_is_terse() {
        assert_eq!(AuthError::InvalidCredentials.to_string(), "Invalid credentials");
        assert_eq!(AuthError::EmailAlreadyInUse.to_string(), "Email already in use");
    }
}
