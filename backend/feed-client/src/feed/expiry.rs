//! Passive expiration
//!
//! Expired posts are filtered out of the view, never deleted from the store.

use crate::models::Post;
use chrono::{DateTime, Utc};
use std::fmt;

pub const EXPIRED_LABEL: &str = "Expired";

/// Keep posts that have no expiry or expire strictly after `now`, preserving order
pub fn retain_visible(mut posts: Vec<Post>, now: DateTime<Utc>) -> Vec<Post> {
    posts.retain(|post| post.is_visible_at(now));
    posts
}

/// Time left on a post, floor-rounded to whole minutes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Countdown {
    Remaining { hours: i64, minutes: i64 },
    Expired,
}

impl Countdown {
    pub fn at(expires_at: DateTime<Utc>, now: DateTime<Utc>) -> Self {
        let remaining = expires_at - now;
        if remaining <= chrono::Duration::zero() {
            return Countdown::Expired;
        }

        let total_minutes = remaining.num_minutes();
        Countdown::Remaining {
            hours: total_minutes / 60,
            minutes: total_minutes % 60,
        }
    }

    pub fn is_expired(&self) -> bool {
        matches!(self, Countdown::Expired)
    }
}

impl fmt::Display for Countdown {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Countdown::Remaining { hours, minutes } => write!(f, "{}h {}m left", hours, minutes),
            Countdown::Expired => f.write_str(EXPIRED_LABEL),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::PostId;
    use chrono::{Duration, TimeZone};

    fn post(id: &str, expires_at: Option<DateTime<Utc>>) -> Post {
        Post {
            id: PostId::new(id),
            content: format!("post {}", id),
            author_id: "uid".to_string(),
            author_email: "a@example.com".to_string(),
            created_at: "2024-03-01T00:00:00.000Z".to_string(),
            timestamp: None,
            expires_at,
        }
    }

    fn t0() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 3, 1, 12, 0, 0).unwrap()
    }

    #[test]
    fn test_retain_visible_filters_and_keeps_order() {
        let now = t0();
        let posts = vec![
            post("a", Some(now + Duration::hours(1))),
            post("b", Some(now)),
            post("c", None),
            post("d", Some(now - Duration::minutes(1))),
            post("e", Some(now + Duration::seconds(1))),
        ];

        let visible: Vec<String> = retain_visible(posts, now)
            .into_iter()
            .map(|p| p.id.to_string())
            .collect();
        assert_eq!(visible, vec!["a", "c", "e"]);
    }

    #[test]
    fn test_no_expiry_is_always_visible() {
        let posts = vec![post("legacy", None)];
        let far_future = t0() + Duration::days(365 * 100);
        assert_eq!(retain_visible(posts, far_future).len(), 1);
    }

    #[test]
    fn test_countdown_floor_rounding() {
        let now = t0();
        let expires = now + Duration::hours(23) + Duration::minutes(59) + Duration::seconds(59);
        assert_eq!(Countdown::at(expires, now).to_string(), "23h 59m left");

        assert_eq!(
            Countdown::at(now + Duration::seconds(30), now).to_string(),
            "0h 0m left"
        );
        assert_eq!(
            Countdown::at(now + Duration::hours(24), now),
            Countdown::Remaining { hours: 24, minutes: 0 }
        );
    }

    #[test]
    fn test_countdown_expired_at_zero_and_after() {
        let now = t0();
        assert_eq!(Countdown::at(now, now).to_string(), "Expired");
        assert_eq!(Countdown::at(now - Duration::hours(5), now), Countdown::Expired);
    }
}
