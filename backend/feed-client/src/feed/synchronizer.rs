//! Feed synchronizer
//!
//! Keeps a locally rendered, expiration-filtered view of the shared post
//! collection for the lifetime of the feed surface.
//!
//! One pump task per attached live query applies events to [`FeedState`].
//! Every state change happens under the core lock, after checking the
//! attachment generation; `detach` bumps the generation under that same
//! lock, so once it returns no late snapshot can touch the state.

use super::countdown::{CountdownBoard, COUNTDOWN_INTERVAL};
use super::expiry::{retain_visible, Countdown};
use super::view::{self, FeedView};
use crate::backend::{
    AuthProvider, DocumentSnapshot, OrderedQuery, PostStore, SubscriptionEvent, SubscriptionHandle,
};
use crate::clock::Clock;
use crate::config::{ConfigError, FeedConfig};
use crate::error::{FeedError, Result};
use crate::models::{NewPost, Post, PostId, Session, ORDER_KEY, POSTS_COLLECTION, POST_TTL_SECS};
use crate::session::Route;
use chrono::{DateTime, Utc};
use parking_lot::Mutex;
use std::sync::{Arc, Weak};
use tokio::sync::mpsc::UnboundedReceiver;
use tokio::sync::watch;
use tokio::task::JoinHandle;

/// Feed synchronizer settings
#[derive(Debug, Clone)]
pub struct FeedSettings {
    /// Collection to read from and append to
    pub collection: String,
    /// Lifetime of a new post
    pub post_ttl: chrono::Duration,
    /// Countdown label recompute period
    pub countdown_interval: std::time::Duration,
}

impl Default for FeedSettings {
    fn default() -> Self {
        Self {
            collection: POSTS_COLLECTION.to_string(),
            post_ttl: chrono::Duration::seconds(POST_TTL_SECS),
            countdown_interval: COUNTDOWN_INTERVAL,
        }
    }
}

impl TryFrom<&FeedConfig> for FeedSettings {
    type Error = ConfigError;

    fn try_from(config: &FeedConfig) -> std::result::Result<Self, Self::Error> {
        let post_ttl = i64::try_from(config.post_ttl_secs)
            .ok()
            .and_then(chrono::Duration::try_seconds)
            .ok_or_else(|| {
                ConfigError::Invalid(format!(
                    "post lifetime of {}s is out of range",
                    config.post_ttl_secs
                ))
            })?;

        Ok(Self {
            collection: config.collection.clone(),
            post_ttl,
            countdown_interval: std::time::Duration::from_secs(config.countdown_interval_secs),
        })
    }
}

/// Observable state of the feed surface
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FeedState {
    /// Visible posts in delivered order
    pub posts: Vec<Post>,
    /// Single inline error, if any
    pub error: Option<FeedError>,
    /// Composer contents
    pub draft: String,
    /// An append is in flight
    pub is_posting: bool,
    /// A live query is attached
    pub attached: bool,
}

impl FeedState {
    pub fn error_message(&self) -> Option<String> {
        self.error.as_ref().map(FeedError::user_message)
    }

    /// Submit button is enabled
    pub fn can_submit(&self) -> bool {
        !self.is_posting && !self.draft.trim().is_empty()
    }
}

/// Result of a submit attempt
#[derive(Debug, Clone, PartialEq)]
pub enum SubmitOutcome {
    /// Append confirmed by the store
    Posted(PostId),
    /// Blank draft or torn-down view; nothing happened
    Ignored,
    /// Another submission is still in flight
    Busy,
    Failed(FeedError),
}

struct Attachment {
    handle: SubscriptionHandle,
    pump: JoinHandle<()>,
}

struct FeedCore {
    generation: u64,
    attachment: Option<Attachment>,
    countdowns: CountdownBoard,
    torn_down: bool,
    state: watch::Sender<FeedState>,
}

impl FeedCore {
    /// Drop the live query, if any. Returns whether one was attached.
    fn release(&mut self) -> bool {
        self.generation += 1;

        match self.attachment.take() {
            Some(mut attachment) => {
                attachment.pump.abort();
                attachment.handle.cancel();
                true
            }
            None => false,
        }
    }

    fn apply(&mut self, event: SubscriptionEvent, now: DateTime<Utc>) {
        match event {
            SubscriptionEvent::Snapshot(documents) => match project(&documents) {
                Ok(posts) => {
                    let total = posts.len();
                    let visible = retain_visible(posts, now);
                    self.countdowns.sync(&visible);

                    tracing::debug!(total, visible = visible.len(), "Posts loaded");
                    self.state.send_modify(|state| {
                        state.posts = visible;
                        if state.error.as_ref().map_or(false, FeedError::is_feed_channel) {
                            state.error = None;
                        }
                    });
                }
                Err(err) => {
                    err.log();
                    self.state.send_modify(|state| state.error = Some(err));
                }
            },
            SubscriptionEvent::Error(err) => {
                let err = FeedError::Subscription(err);
                err.log();
                self.state.send_modify(|state| state.error = Some(err));
            }
        }
    }
}

/// Project every document of a snapshot; any malformed document fails the whole snapshot
fn project(documents: &[DocumentSnapshot]) -> Result<Vec<Post>> {
    documents
        .iter()
        .map(|doc| {
            Post::project(&doc.id, &doc.data).map_err(|e| FeedError::Projection {
                id: doc.id.clone(),
                reason: e.to_string(),
            })
        })
        .collect()
}

async fn pump(
    core: Weak<Mutex<FeedCore>>,
    generation: u64,
    mut events: UnboundedReceiver<SubscriptionEvent>,
    clock: Arc<dyn Clock>,
) {
    while let Some(event) = events.recv().await {
        let Some(shared) = core.upgrade() else {
            break;
        };

        let mut guard = shared.lock();
        if guard.generation != generation || guard.torn_down {
            break;
        }
        guard.apply(event, clock.now());
    }

    tracing::debug!(generation, "Feed pump stopped");
}

/// Live, expiration-filtered view of the post collection
pub struct FeedSynchronizer {
    auth: Arc<dyn AuthProvider>,
    store: Arc<dyn PostStore>,
    clock: Arc<dyn Clock>,
    settings: FeedSettings,
    core: Arc<Mutex<FeedCore>>,
}

impl FeedSynchronizer {
    pub fn new(
        auth: Arc<dyn AuthProvider>,
        store: Arc<dyn PostStore>,
        clock: Arc<dyn Clock>,
        settings: FeedSettings,
    ) -> Self {
        let (state, _) = watch::channel(FeedState::default());
        let countdowns = CountdownBoard::new(clock.clone(), settings.countdown_interval);

        Self {
            auth,
            store,
            clock,
            settings,
            core: Arc::new(Mutex::new(FeedCore {
                generation: 0,
                attachment: None,
                countdowns,
                torn_down: false,
                state,
            })),
        }
    }

    /// Open the live query. Requires a session; attaching twice is a no-op.
    pub async fn attach(&self) -> Result<()> {
        if self.auth.current_session().is_none() {
            let err = FeedError::Unauthenticated;
            err.log();
            return Err(err);
        }

        {
            let core = self.core.lock();
            if core.torn_down || core.attachment.is_some() {
                return Ok(());
            }
        }

        let query = OrderedQuery::descending(self.settings.collection.clone(), ORDER_KEY);
        let subscription = match self.store.subscribe_ordered(query).await {
            Ok(subscription) => subscription,
            Err(err) => {
                let err = FeedError::Subscription(err);
                err.log();
                self.publish(|state| state.error = Some(err.clone()));
                return Err(err);
            }
        };

        let (events, handle) = subscription.into_parts();
        let mut core = self.core.lock();
        if core.torn_down || core.attachment.is_some() {
            // Lost a race with teardown or another attach; dropping the handle cancels
            return Ok(());
        }

        core.generation += 1;
        let pump = tokio::spawn(pump(
            Arc::downgrade(&self.core),
            core.generation,
            events,
            self.clock.clone(),
        ));
        core.attachment = Some(Attachment { handle, pump });
        core.state.send_modify(|state| state.attached = true);

        tracing::info!(collection = %self.settings.collection, "Feed subscription attached");
        Ok(())
    }

    /// Release the live query. Idempotent.
    pub fn detach(&self) {
        let mut core = self.core.lock();
        if core.release() {
            if !core.torn_down {
                core.state.send_modify(|state| state.attached = false);
            }
            tracing::info!(collection = %self.settings.collection, "Feed subscription detached");
        }
    }

    /// Tear the view down: detach, stop countdowns, ignore everything afterwards
    pub fn unmount(&self) {
        let mut core = self.core.lock();
        if core.torn_down {
            return;
        }

        core.torn_down = true;
        core.release();
        core.countdowns.clear();
        tracing::debug!("Feed view torn down");
    }

    /// Detach if the session is gone. Returns the session if it is still there.
    pub fn refresh_session(&self) -> Option<Session> {
        let session = self.auth.current_session();
        if session.is_none() {
            self.detach();
        }
        session
    }

    pub fn set_draft(&self, draft: impl Into<String>) {
        let draft = draft.into();
        self.publish(|state| state.draft = draft);
    }

    /// Append the current draft as a new post.
    ///
    /// Blank drafts are a no-op. Only one append may be in flight; the draft
    /// is cleared only once the store confirms the write.
    pub async fn submit(&self) -> SubmitOutcome {
        let session = self.auth.current_session();

        let post = {
            let core = self.core.lock();
            if core.torn_down {
                return SubmitOutcome::Ignored;
            }

            let (draft, is_posting) = {
                let state = core.state.borrow();
                (state.draft.clone(), state.is_posting)
            };
            if draft.trim().is_empty() {
                return SubmitOutcome::Ignored;
            }
            if is_posting {
                return SubmitOutcome::Busy;
            }

            let Some(session) = session else {
                let err = FeedError::Unauthenticated;
                err.log();
                core.state.send_modify(|state| state.error = Some(err.clone()));
                return SubmitOutcome::Failed(err);
            };

            let post =
                match NewPost::compose(&draft, &session, self.clock.now(), self.settings.post_ttl) {
                    Ok(post) => post,
                    Err(err) => {
                        let err = FeedError::InvalidPost(err);
                        err.log();
                        core.state.send_modify(|state| state.error = Some(err.clone()));
                        return SubmitOutcome::Failed(err);
                    }
                };

            core.state.send_modify(|state| {
                state.is_posting = true;
                state.error = None;
            });
            post
        };

        tracing::debug!(author = %post.author_id, "Submitting post");
        let result = self.store.append(&self.settings.collection, post).await;

        let core = self.core.lock();
        match result {
            Ok(id) => {
                tracing::info!(post_id = %id, "Post created");
                if !core.torn_down {
                    core.state.send_modify(|state| {
                        state.is_posting = false;
                        state.draft.clear();
                        state.error = None;
                    });
                }
                SubmitOutcome::Posted(id)
            }
            Err(err) => {
                let err = FeedError::Append(err);
                err.log();
                if !core.torn_down {
                    core.state.send_modify(|state| {
                        state.is_posting = false;
                        state.error = Some(err.clone());
                    });
                }
                SubmitOutcome::Failed(err)
            }
        }
    }

    /// Sign out and leave the feed. On failure the feed stays attached.
    pub async fn sign_out(&self) -> Result<Route> {
        match self.auth.sign_out().await {
            Ok(()) => {
                self.detach();
                Ok(Route::Login)
            }
            Err(err) => {
                let err = FeedError::SignOut(err);
                err.log();
                self.publish(|state| state.error = Some(err.clone()));
                Err(err)
            }
        }
    }

    pub fn state(&self) -> FeedState {
        self.core.lock().state.borrow().clone()
    }

    /// Receiver notified on every state change
    pub fn subscribe(&self) -> watch::Receiver<FeedState> {
        self.core.lock().state.subscribe()
    }

    pub fn is_attached(&self) -> bool {
        self.core.lock().attachment.is_some()
    }

    pub fn countdown(&self, id: &PostId) -> Option<Countdown> {
        self.core.lock().countdowns.label(id)
    }

    pub fn watch_countdown(&self, id: &PostId) -> Option<watch::Receiver<Countdown>> {
        self.core.lock().countdowns.watch(id)
    }

    /// Number of countdown tickers currently held
    pub fn countdown_count(&self) -> usize {
        self.core.lock().countdowns.len()
    }

    /// Render model of the feed surface
    pub fn render(&self) -> FeedView {
        let viewer = self.auth.current_session();
        let core = self.core.lock();
        let state = core.state.borrow();
        view::render(&state, viewer.as_ref(), |id| core.countdowns.label(id))
    }

    fn publish(&self, update: impl FnOnce(&mut FeedState)) {
        let core = self.core.lock();
        if !core.torn_down {
            core.state.send_modify(update);
        }
    }
}

impl Drop for FeedSynchronizer {
    fn drop(&mut self) {
        self.unmount();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn feed_config(post_ttl_secs: u64) -> FeedConfig {
        FeedConfig {
            collection: "posts".to_string(),
            post_ttl_secs,
            countdown_interval_secs: 60,
        }
    }

    #[test]
    fn test_settings_from_config() {
        let settings = FeedSettings::try_from(&feed_config(3600)).unwrap();
        assert_eq!(settings.post_ttl, chrono::Duration::hours(1));
        assert_eq!(settings.countdown_interval, std::time::Duration::from_secs(60));
    }

    #[test]
    fn test_settings_reject_unrepresentable_ttl() {
        // would wrap to a negative lifetime with a plain cast
        assert!(FeedSettings::try_from(&feed_config(u64::MAX)).is_err());
        assert!(FeedSettings::try_from(&feed_config(10_000_000_000_000_000)).is_err());
    }
}
