use crate::models::Session;
use chrono::{DateTime, Duration, SecondsFormat, Utc};
use error_types::validation::rules;
use error_types::ValidationError;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Collection the feed reads from and appends to
pub const POSTS_COLLECTION: &str = "posts";

/// Field the feed is ordered by
pub const ORDER_KEY: &str = "timestamp";

/// Posts live for 24 hours after submission
pub const POST_TTL_SECS: i64 = 24 * 60 * 60;

/// Opaque document id assigned by the store
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PostId(String);

impl PostId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for PostId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A single feed entry as the client sees it
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Post {
    pub id: PostId,
    pub content: String,
    pub author_id: String,
    /// Denormalized at write time, never looked up later
    pub author_email: String,
    /// Client wall clock at submission, ISO-8601. Advisory only.
    pub created_at: String,
    /// Store-assigned creation time; `None` until the store confirms the write
    pub timestamp: Option<DateTime<Utc>>,
    /// Absent on legacy posts, which never expire
    pub expires_at: Option<DateTime<Utc>>,
}

impl Post {
    pub fn from_document(id: PostId, document: PostDocument) -> Self {
        Self {
            id,
            content: document.content,
            author_id: document.author_id,
            author_email: document.author_email,
            created_at: document.created_at,
            timestamp: document.timestamp,
            expires_at: document.expires_at,
        }
    }

    /// Project a raw stored document into a post
    pub fn project(id: &PostId, data: &serde_json::Value) -> Result<Self, serde_json::Error> {
        let document = PostDocument::deserialize(data)?;
        Ok(Self::from_document(id.clone(), document))
    }

    /// Visible iff there is no expiry or the expiry is strictly in the future
    pub fn is_visible_at(&self, now: DateTime<Utc>) -> bool {
        self.expires_at.map_or(true, |expires_at| expires_at > now)
    }
}

/// Persisted document shape
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PostDocument {
    pub content: String,
    pub author_id: String,
    pub author_email: String,
    /// `null` while the server timestamp is pending
    #[serde(default)]
    pub timestamp: Option<DateTime<Utc>>,
    pub created_at: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expires_at: Option<DateTime<Utc>>,
}

/// A post before the store has assigned it an id or a server timestamp.
///
/// The store fills in `timestamp` at write time; see [`NewPost::resolve`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewPost {
    pub content: String,
    pub author_id: String,
    pub author_email: String,
    pub created_at: String,
    pub expires_at: Option<DateTime<Utc>>,
}

impl NewPost {
    /// Build a post for `session` submitted at `now`.
    ///
    /// Fails with a `required` error on `content` for blank content, and an
    /// `out_of_range` error on `expires_at` when `now + ttl` is not representable.
    pub fn compose(
        content: &str,
        session: &Session,
        now: DateTime<Utc>,
        ttl: Duration,
    ) -> Result<Self, ValidationError> {
        rules::validate_required("content", content)?;

        let expires_at = now.checked_add_signed(ttl).ok_or_else(|| {
            ValidationError::new("Validation failed").add_field_error(
                "expires_at",
                "out_of_range",
                "Post lifetime is out of range",
            )
        })?;

        Ok(Self {
            content: content.trim().to_string(),
            author_id: session.uid.clone(),
            author_email: session.email.clone(),
            created_at: now.to_rfc3339_opts(SecondsFormat::Millis, true),
            expires_at: Some(expires_at),
        })
    }

    /// Stamp the document with the store's clock
    pub fn resolve(self, server_time: DateTime<Utc>) -> PostDocument {
        PostDocument {
            content: self.content,
            author_id: self.author_id,
            author_email: self.author_email,
            timestamp: Some(server_time),
            created_at: self.created_at,
            expires_at: self.expires_at,
        }
    }
}
