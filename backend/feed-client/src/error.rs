/// Error types for the feed client
///
/// Every failure the feed surface can hit maps to exactly one inline
/// message. None of them is fatal: the view stays interactive and the
/// last-known-good list stays rendered.
use crate::models::PostId;
use error_types::{AuthError, StoreError, SubscriptionError, UserFacing, ValidationError};
use thiserror::Error;

pub const LOAD_POSTS_MESSAGE: &str = "Error loading posts. Please try refreshing the page.";
pub const CREATE_POST_MESSAGE: &str = "Error creating post. Please try again.";
pub const SIGN_OUT_MESSAGE: &str = "Error signing out. Please try again.";

/// Result type for feed client operations
pub type Result<T> = std::result::Result<T, FeedError>;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FeedError {
    /// Operation needs a signed-in session
    #[error("Not signed in")]
    Unauthenticated,

    /// Live query failed (connectivity, permission)
    #[error("Subscription error: {0}")]
    Subscription(#[from] SubscriptionError),

    /// A delivered document did not have the post shape
    #[error("Malformed post document {id}: {reason}")]
    Projection { id: PostId, reason: String },

    /// Draft could not be turned into a post
    #[error("Invalid post: {0}")]
    InvalidPost(#[from] ValidationError),

    /// Append rejected by the store
    #[error("Append error: {0}")]
    Append(#[from] StoreError),

    /// Sign-out rejected by the auth provider
    #[error("Sign out error: {0}")]
    SignOut(#[from] AuthError),
}

impl FeedError {
    /// Inline message shown next to the affected control
    pub fn user_message(&self) -> String {
        match self {
            Self::Unauthenticated => AuthError::NotSignedIn.user_message(),
            Self::Subscription(err) => err.user_message(),
            Self::Projection { .. } => LOAD_POSTS_MESSAGE.to_string(),
            Self::InvalidPost(err) => err
                .field_message("content")
                .unwrap_or(CREATE_POST_MESSAGE)
                .to_string(),
            Self::Append(err) => err.message().unwrap_or(CREATE_POST_MESSAGE).to_string(),
            Self::SignOut(_) => SIGN_OUT_MESSAGE.to_string(),
        }
    }

    /// Errors that came in on the live query rather than from a user action
    pub fn is_feed_channel(&self) -> bool {
        matches!(self, Self::Subscription(_) | Self::Projection { .. })
    }

    pub fn log(&self) {
        match self {
            Self::Subscription(err) => err.log(),
            Self::Append(err) => err.log(),
            Self::SignOut(err) => err.log(),
            Self::Projection { id, reason } => {
                tracing::warn!(post_id = %id, %reason, "Error loading posts");
            }
            Self::InvalidPost(err) => {
                let fields: Vec<&String> = err.field_errors.keys().collect();
                tracing::warn!(error = %err, ?fields, "Post rejected before append");
            }
            Self::Unauthenticated => {
                tracing::warn!("Feed operation without a session");
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_append_uses_store_message_or_fallback() {
        let err = FeedError::Append(StoreError::PermissionDenied(
            "Missing or insufficient permissions.".to_string(),
        ));
        assert_eq!(err.user_message(), "Missing or insufficient permissions.");

        let err = FeedError::Append(StoreError::Unavailable(String::new()));
        assert_eq!(err.user_message(), CREATE_POST_MESSAGE);
    }

    #[test]
    fn test_invalid_post_message() {
        let err = FeedError::InvalidPost(ValidationError::new("Validation failed").add_field_error(
            "expires_at",
            "out_of_range",
            "Post lifetime is out of range",
        ));
        assert_eq!(err.user_message(), CREATE_POST_MESSAGE);
        assert!(!err.is_feed_channel());

        let err = FeedError::InvalidPost(ValidationError::new("Validation failed").add_field_error(
            "content",
            "too_long",
            "Must be at most 500 characters",
        ));
        assert_eq!(err.user_message(), "Must be at most 500 characters");
    }

    #[test]
    fn test_feed_channel_messages() {
        let err = FeedError::Subscription(SubscriptionError::Unavailable("offline".to_string()));
        assert_eq!(
            err.user_message(),
            "Error connecting to the feed. Please check your connection."
        );
        assert!(err.is_feed_channel());

        let err = FeedError::Projection {
            id: PostId::new("x"),
            reason: "missing field `content`".to_string(),
        };
        assert_eq!(err.user_message(), LOAD_POSTS_MESSAGE);
        assert!(err.is_feed_channel());

        let err = FeedError::SignOut(AuthError::Network("offline".to_string()));
        assert_eq!(err.user_message(), SIGN_OUT_MESSAGE);
        assert!(!err.is_feed_channel());
    }
}
