//! Change feed - push notification of whole-collection snapshots.
//!
//! Every write to a collection publishes the complete, freshly loaded collection.
//! Subscribers replace their copy wholesale; nothing is patched incrementally, so a
//! subscriber that falls behind simply skips to the newest snapshot.

use std::sync::Arc;
use tokio::sync::broadcast;
use tokio::sync::broadcast::error::RecvError;
use tracing::{trace, warn};

/// Snapshots buffered per subscriber before it starts lagging.
const FEED_CAPACITY: usize = 64;

/// A full copy of a collection at one point in time.
pub type Snapshot<T> = Arc<Vec<T>>;

/// Publisher side of a collection's notifications.
#[derive(Debug)]
pub struct ChangeFeed<T> {
    sender: broadcast::Sender<Snapshot<T>>,
}

impl<T> Clone for ChangeFeed<T> {
    fn clone(&self) -> Self {
        Self {
            sender: self.sender.clone(),
        }
    }
}

impl<T> Default for ChangeFeed<T>
where
    T: Send + Sync + 'static,
{
    fn default() -> Self {
        Self::new()
    }
}

impl<T> ChangeFeed<T>
where
    T: Send + Sync + 'static,
{
    /// Creates a feed with no subscribers.
    #[must_use]
    pub fn new() -> Self {
        let (sender, _) = broadcast::channel(FEED_CAPACITY);
        Self { sender }
    }

    /// Registers a new subscriber; it sees snapshots published from now on.
    #[must_use]
    pub fn subscribe(&self) -> Subscription<T> {
        Subscription {
            receiver: self.sender.subscribe(),
        }
    }

    /// Publishes a snapshot and returns how many subscribers received it.
    pub fn publish(&self, records: Vec<T>) -> usize {
        let count = records.len();
        // Sending fails only when nobody is listening
        let delivered = self.sender.send(Arc::new(records)).unwrap_or(0);
        trace!(records = count, subscribers = delivered, "Published snapshot");
        delivered
    }
}

/// Receiving side of a [`ChangeFeed`].
#[derive(Debug)]
pub struct Subscription<T> {
    receiver: broadcast::Receiver<Snapshot<T>>,
}

impl<T> Subscription<T> {
    /// Waits for the next snapshot. Returns `None` once the feed is gone.
    pub async fn next(&mut self) -> Option<Snapshot<T>> {
        loop {
            match self.receiver.recv().await {
                Ok(snapshot) => return Some(snapshot),
                Err(RecvError::Lagged(skipped)) => {
                    warn!(skipped, "Subscriber lagged, skipping to newest snapshot");
                }
                Err(RecvError::Closed) => return None,
            }
        }
    }

    /// Returns the newest pending snapshot without waiting, if any.
    pub fn latest(&mut self) -> Option<Snapshot<T>> {
        let mut newest = None;
        loop {
            match self.receiver.try_recv() {
                Ok(snapshot) => newest = Some(snapshot),
                Err(broadcast::error::TryRecvError::Lagged(_)) => {}
                Err(_) => return newest,
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_publish_reaches_every_subscriber() {
        let feed: ChangeFeed<u32> = ChangeFeed::new();
        let mut first = feed.subscribe();
        let mut second = feed.subscribe();

        assert_eq!(feed.publish(vec![1, 2, 3]), 2);

        assert_eq!(first.next().await.as_deref(), Some(&vec![1, 2, 3]));
        assert_eq!(second.next().await.as_deref(), Some(&vec![1, 2, 3]));
    }

    #[tokio::test]
    async fn test_publish_without_subscribers() {
        let feed: ChangeFeed<u32> = ChangeFeed::new();
        assert_eq!(feed.publish(vec![1]), 0);
    }

    #[tokio::test]
    async fn test_latest_returns_newest_snapshot() {
        let feed: ChangeFeed<u32> = ChangeFeed::new();
        let mut subscription = feed.subscribe();
        assert!(subscription.latest().is_none());
        feed.publish(vec![1]);
        feed.publish(vec![1, 2]);
        assert_eq!(subscription.latest().as_deref(), Some(&vec![1, 2]));
    }

    #[tokio::test]
    async fn test_lagging_subscriber_skips_ahead() {
        let feed: ChangeFeed<usize> = ChangeFeed::new();
        let mut subscription = feed.subscribe();
        for i in 0..(FEED_CAPACITY + 10) {
            feed.publish(vec![i]);
        }
        let snapshot = subscription.next().await;
        assert!(snapshot.is_some());
        assert_eq!(subscription.latest().as_deref(), Some(&vec![FEED_CAPACITY + 9]));
    }

    #[tokio::test]
    async fn test_subscription_ends_when_feed_dropped() {
        let feed: ChangeFeed<u32> = ChangeFeed::new();
        let mut subscription = feed.subscribe();
        drop(feed);
        assert!(subscription.next().await.is_none());
    }
}
