/// Live feed
///
/// - `expiry`: visibility rule and countdown labels
/// - `countdown`: per-post label tickers
/// - `synchronizer`: live query lifecycle, submission, sign-out
/// - `view`: render model
pub mod countdown;
pub mod expiry;
pub mod synchronizer;
pub mod view;

pub use countdown::{CountdownBoard, COUNTDOWN_INTERVAL};
pub use expiry::{retain_visible, Countdown, EXPIRED_LABEL};
pub use synchronizer::{FeedSettings, FeedState, FeedSynchronizer, SubmitOutcome};
pub use view::{FeedView, PostCard, EMPTY_FEED_MESSAGE};
