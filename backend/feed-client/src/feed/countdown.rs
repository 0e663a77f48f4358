//! Per-post countdown tickers
//!
//! Each rendered post with an expiry gets its own ticker that recomputes
//! the "Nh Mm left" label on a fixed interval. Tickers are cosmetic: they
//! never remove a post, so a post can read "Expired" until the next
//! snapshot filters it out.

use super::expiry::Countdown;
use crate::clock::Clock;
use crate::models::{Post, PostId};
use chrono::{DateTime, Utc};
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::{interval_at, Instant, MissedTickBehavior};

/// Default recompute period for countdown labels
pub const COUNTDOWN_INTERVAL: Duration = Duration::from_secs(60);

struct Ticker {
    expires_at: DateTime<Utc>,
    label: watch::Receiver<Countdown>,
    task: Option<JoinHandle<()>>,
}

impl Ticker {
    fn stop(&mut self) {
        if let Some(task) = self.task.take() {
            task.abort();
        }
    }
}

/// Countdown tickers for the posts currently on screen
pub struct CountdownBoard {
    clock: Arc<dyn Clock>,
    period: Duration,
    tickers: HashMap<PostId, Ticker>,
}

impl CountdownBoard {
    pub fn new(clock: Arc<dyn Clock>, period: Duration) -> Self {
        Self {
            clock,
            period,
            tickers: HashMap::new(),
        }
    }

    /// Start tickers for new posts with an expiry and stop those no longer shown.
    ///
    /// Must be called from within a tokio runtime.
    pub fn sync(&mut self, posts: &[Post]) {
        let wanted: HashMap<&PostId, DateTime<Utc>> = posts
            .iter()
            .filter_map(|post| post.expires_at.map(|expires_at| (&post.id, expires_at)))
            .collect();

        self.tickers.retain(|id, ticker| {
            let keep = wanted.get(id) == Some(&ticker.expires_at);
            if !keep {
                ticker.stop();
            }
            keep
        });

        for (id, expires_at) in wanted {
            if !self.tickers.contains_key(id) {
                let ticker = self.start(expires_at);
                self.tickers.insert(id.clone(), ticker);
            }
        }
    }

    fn start(&self, expires_at: DateTime<Utc>) -> Ticker {
        let initial = Countdown::at(expires_at, self.clock.now());
        let (tx, rx) = watch::channel(initial);

        // An expired label never changes again, so it needs no ticker
        let task = if initial.is_expired() {
            None
        } else {
            let clock = self.clock.clone();
            let period = self.period;
            Some(tokio::spawn(async move {
                let mut interval = interval_at(Instant::now() + period, period);
                interval.set_missed_tick_behavior(MissedTickBehavior::Delay);

                loop {
                    interval.tick().await;
                    if tx.is_closed() {
                        break;
                    }

                    let next = Countdown::at(expires_at, clock.now());
                    tx.send_if_modified(|current| {
                        if *current == next {
                            false
                        } else {
                            *current = next;
                            true
                        }
                    });

                    if next.is_expired() {
                        break;
                    }
                }
            }))
        };

        Ticker {
            expires_at,
            label: rx,
            task,
        }
    }

    /// Current label for a post, if it has a ticker
    pub fn label(&self, id: &PostId) -> Option<Countdown> {
        self.tickers.get(id).map(|ticker| *ticker.label.borrow())
    }

    /// Receiver that changes whenever the post's label changes
    pub fn watch(&self, id: &PostId) -> Option<watch::Receiver<Countdown>> {
        self.tickers.get(id).map(|ticker| ticker.label.clone())
    }

    /// Stop every ticker
    pub fn clear(&mut self) {
        for ticker in self.tickers.values_mut() {
            ticker.stop();
        }
        self.tickers.clear();
    }

    /// Number of posts with a ticker
    pub fn len(&self) -> usize {
        self.tickers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tickers.is_empty()
    }

    /// Number of tickers still running
    pub fn running(&self) -> usize {
        self.tickers
            .values()
            .filter(|ticker| ticker.task.as_ref().map_or(false, |task| !task.is_finished()))
            .count()
    }
}

impl Drop for CountdownBoard {
    fn drop(&mut self) {
        self.clear();
    }
}
