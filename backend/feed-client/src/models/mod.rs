/// Data models for the feed client
///
/// This module defines structures for:
/// - Post: a self-expiring feed entry and its persisted document shape
/// - Session: the signed-in viewer
mod post;
mod session;

pub use post::{
    NewPost, Post, PostDocument, PostId, ORDER_KEY, POSTS_COLLECTION,
    POST_TTL_SECS,
};
pub use session::Session;
