/// RealTalk Feed Client Library
///
/// Client-side logic for an ephemeral social feed: a session gate in front of
/// every protected surface, and a feed synchronizer that keeps a live,
/// expiration-filtered view of the shared post collection. Auth, persistence
/// and real-time sync are delegated to an injected collaborator.
///
/// # Modules
///
/// - `backend`: Collaborator traits and the in-process implementation
/// - `models`: Post, wire document and session types
/// - `session`: Routes, session gate and login/signup forms
/// - `feed`: Expiration, countdowns, synchronizer and render model
/// - `clock`: Injectable wall clock
/// - `error`: Feed error taxonomy
/// - `config`: Configuration management
/// - `logging`: Tracing subscriber setup
pub mod backend;
pub mod clock;
pub mod config;
pub mod error;
pub mod feed;
pub mod logging;
pub mod models;
pub mod session;

pub use config::Config;
pub use error::{FeedError, Result};
