//! Render model of the feed surface
//!
//! Pure projection of [`FeedState`] into what a renderer shows. No toolkit
//! types leak in here; the terminal demo prints it via `Display`.

use super::expiry::Countdown;
use super::synchronizer::FeedState;
use crate::models::{PostId, Session};
use chrono::{DateTime, Utc};
use std::fmt;

pub const EMPTY_FEED_MESSAGE: &str = "No posts yet. Be the first to share your thoughts!";
pub const POST_BUTTON_LABEL: &str = "Post";
pub const POSTING_BUTTON_LABEL: &str = "Posting...";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PostCard {
    pub id: PostId,
    pub author_email: String,
    pub avatar_initial: char,
    /// Empty while the server timestamp is pending
    pub date_label: String,
    pub content: String,
    pub countdown: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ComposerView {
    pub draft: String,
    pub button_label: &'static str,
    pub submit_enabled: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FeedView {
    pub viewer_email: Option<String>,
    pub composer: ComposerView,
    pub error: Option<String>,
    pub posts: Vec<PostCard>,
    /// Shown only when there are no posts and no error
    pub empty_state: Option<&'static str>,
}

pub fn render<F>(state: &FeedState, viewer: Option<&Session>, countdown: F) -> FeedView
where
    F: Fn(&PostId) -> Option<Countdown>,
{
    let posts: Vec<PostCard> = state
        .posts
        .iter()
        .map(|post| PostCard {
            id: post.id.clone(),
            author_email: post.author_email.clone(),
            avatar_initial: avatar_initial(&post.author_email),
            date_label: date_label(post.timestamp),
            content: post.content.clone(),
            countdown: countdown(&post.id).map(|c| c.to_string()),
        })
        .collect();

    let error = state.error_message();
    let empty_state = if posts.is_empty() && error.is_none() {
        Some(EMPTY_FEED_MESSAGE)
    } else {
        None
    };

    FeedView {
        viewer_email: viewer.map(|session| session.email.clone()),
        composer: ComposerView {
            draft: state.draft.clone(),
            button_label: if state.is_posting {
                POSTING_BUTTON_LABEL
            } else {
                POST_BUTTON_LABEL
            },
            submit_enabled: state.can_submit(),
        },
        error,
        posts,
        empty_state,
    }
}

/// First character of the email, upper-cased
pub fn avatar_initial(email: &str) -> char {
    email
        .chars()
        .next()
        .and_then(|c| c.to_uppercase().next())
        .unwrap_or('?')
}

/// Long-form date, e.g. "March 1, 2024"
pub fn date_label(timestamp: Option<DateTime<Utc>>) -> String {
    timestamp
        .map(|at| at.format("%B %-d, %Y").to_string())
        .unwrap_or_default()
}

impl fmt::Display for FeedView {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "== RealTalk ==")?;
        if let Some(email) = &self.viewer_email {
            writeln!(f, "signed in as {}", email)?;
        }
        if let Some(error) = &self.error {
            writeln!(f, "! {}", error)?;
        }
        if self.composer.button_label == POSTING_BUTTON_LABEL {
            writeln!(f, "[{}]", self.composer.button_label)?;
        }

        for card in &self.posts {
            writeln!(f)?;
            write!(f, "({}) {}", card.avatar_initial, card.author_email)?;
            if !card.date_label.is_empty() {
                write!(f, " · {}", card.date_label)?;
            }
            if let Some(countdown) = &card.countdown {
                write!(f, " · {}", countdown)?;
            }
            writeln!(f)?;
            writeln!(f, "  {}", card.content.replace('\n', "\n  "))?;
        }

        if let Some(empty) = self.empty_state {
            writeln!(f)?;
            writeln!(f, "{}", empty)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::FeedError;
    use crate::models::Post;
    use chrono::TimeZone;
    use error_types::SubscriptionError;

    fn post(id: &str, email: &str) -> Post {
        Post {
            id: PostId::new(id),
            content: "hello".to_string(),
            author_id: "uid".to_string(),
            author_email: email.to_string(),
            created_at: "2024-03-01T12:00:00.000Z".to_string(),
            timestamp: Some(Utc.with_ymd_and_hms(2024, 3, 1, 12, 0, 0).unwrap()),
            expires_at: None,
        }
    }

    #[test]
    fn test_empty_feed_shows_empty_state() {
        let view = render(&FeedState::default(), None, |_| None);
        assert_eq!(view.empty_state, Some(EMPTY_FEED_MESSAGE));
        assert!(view.error.is_none());
        assert!(view.posts.is_empty());
    }

    #[test]
    fn test_error_suppresses_empty_state() {
        let state = FeedState {
            error: Some(FeedError::Subscription(SubscriptionError::Unavailable(
                "offline".to_string(),
            ))),
            ..Default::default()
        };

        let view = render(&state, None, |_| None);
        assert_eq!(view.empty_state, None);
        assert_eq!(
            view.error.as_deref(),
            Some("Error connecting to the feed. Please check your connection.")
        );
    }

    #[test]
    fn test_card_fields() {
        let state = FeedState {
            posts: vec![post("p1", "ada@example.com")],
            ..Default::default()
        };

        let view = render(&state, None, |_| {
            Some(Countdown::Remaining {
                hours: 3,
                minutes: 7,
            })
        });
        let card = &view.posts[0];
        assert_eq!(card.avatar_initial, 'A');
        assert_eq!(card.date_label, "March 1, 2024");
        assert_eq!(card.countdown.as_deref(), Some("3h 7m left"));
        assert_eq!(view.empty_state, None);
    }

    #[test]
    fn test_composer_labels() {
        let mut state = FeedState::default();
        let view = render(&state, None, |_| None);
        assert_eq!(view.composer.button_label, "Post");
        assert!(!view.composer.submit_enabled);

        state.draft = "hi".to_string();
        assert!(render(&state, None, |_| None).composer.submit_enabled);

        state.is_posting = true;
        let view = render(&state, None, |_| None);
        assert_eq!(view.composer.button_label, "Posting...");
        assert!(!view.composer.submit_enabled);
    }

    #[test]
    fn test_avatar_and_date_edge_cases() {
        assert_eq!(avatar_initial(""), '?');
        assert_eq!(avatar_initial("émile@example.com"), 'É');
        assert_eq!(date_label(None), "");
    }

    #[test]
    fn test_viewer_email_in_header() {
        let session = Session {
            uid: "uid".to_string(),
            email: "ada@example.com".to_string(),
        };
        let view = render(&FeedState::default(), Some(&session), |_| None);
        assert_eq!(view.viewer_email.as_deref(), Some("ada@example.com"));
        assert!(view.to_string().contains("signed in as ada@example.com"));
    }
}
