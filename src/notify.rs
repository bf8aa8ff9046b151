//! Status notifications for an external viewer.
//!
//! ## Rules
//!
//! - Publishing is fire-and-forget: no acknowledgement, no queue, no
//!   delivery guarantee beyond "the latest message wins".
//! - Producers only see the [`Notify`] trait; the production implementation
//!   is [`StatusFeed`], a `watch`-backed slot holding the most recent
//!   message.
//! - Viewers either poll [`StatusFeed::latest`] (the `GET /message` route)
//!   or wait on [`StatusFeed::subscribe`] (the file mirror task).
//!
//! The file mirror exists for display processes that cannot speak HTTP: the
//! latest status string is rewritten to a well-known file on every change,
//! and the viewer polls that file.

use std::path::PathBuf;
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

/// # One-way sink for human-readable status messages.
///
/// Implementations must never fail and never block the caller for longer
/// than it takes to store the message.
#[async_trait]
pub trait Notify: Send + Sync {
    /// Publishes `message`, replacing whatever was published before.
    async fn publish(&self, message: &str);
}

/// # Latest-message feed.
///
/// A cloneable handle around a `watch` channel: every publish replaces the
/// current value, and any number of viewers can read or await it. Clones
/// share the same slot.
#[derive(Debug, Clone)]
pub struct StatusFeed {
    tx: Arc<watch::Sender<String>>,
}

impl StatusFeed {
    /// Creates a feed with an empty initial message.
    pub fn new() -> Self {
        let (tx, _rx) = watch::channel(String::new());
        Self { tx: Arc::new(tx) }
    }

    /// Returns the most recently published message.
    pub fn latest(&self) -> String {
        self.tx.borrow().clone()
    }

    /// Returns a receiver that observes every subsequent publish.
    ///
    /// Slow receivers skip intermediate values; that is the point.
    pub fn subscribe(&self) -> watch::Receiver<String> {
        self.tx.subscribe()
    }
}

impl Default for StatusFeed {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Notify for StatusFeed {
    async fn publish(&self, message: &str) {
        debug!(message, "status published");
        self.tx.send_replace(message.to_string());
    }
}

/// Spawns a task mirroring the feed into a file.
///
/// Every published message overwrites `path` wholesale, so an external
/// viewer can poll the file for the latest status. Write failures are
/// logged and skipped; the mirror keeps running until `cancel` fires or
/// the feed is dropped.
pub fn spawn_file_mirror(
    feed: &StatusFeed,
    path: PathBuf,
    cancel: CancellationToken,
) -> JoinHandle<()> {
    let mut rx = feed.subscribe();
    tokio::spawn(async move {
        loop {
            tokio::select! {
                _ = cancel.cancelled() => break,
                changed = rx.changed() => {
                    if changed.is_err() {
                        break;
                    }
                    let message = rx.borrow_and_update().clone();
                    if let Err(err) = tokio::fs::write(&path, &message).await {
                        warn!(path = %path.display(), error = %err, "message mirror write failed");
                    }
                }
            }
        }
        debug!(path = %path.display(), "message mirror stopped");
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_latest_message_wins() {
        let feed = StatusFeed::new();
        assert_eq!(feed.latest(), "");

        feed.publish("first").await;
        feed.publish("second").await;
        assert_eq!(feed.latest(), "second");
    }

    #[tokio::test]
    async fn test_clones_share_one_slot() {
        let feed = StatusFeed::new();
        let viewer = feed.clone();

        feed.publish("shared").await;
        assert_eq!(viewer.latest(), "shared");
    }

    #[tokio::test]
    async fn test_subscriber_sees_only_newest_under_burst() {
        let feed = StatusFeed::new();
        let mut rx = feed.subscribe();

        feed.publish("a").await;
        feed.publish("b").await;
        feed.publish("c").await;

        rx.changed().await.unwrap();
        assert_eq!(rx.borrow_and_update().as_str(), "c");
    }

    #[tokio::test]
    async fn test_file_mirror_writes_latest() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("message.txt");

        let feed = StatusFeed::new();
        let cancel = CancellationToken::new();
        let handle = spawn_file_mirror(&feed, path.clone(), cancel.clone());

        feed.publish("on display").await;

        // The mirror runs on its own task; poll until the write lands.
        let mut contents = String::new();
        for _ in 0..40 {
            tokio::time::sleep(std::time::Duration::from_millis(25)).await;
            if let Ok(found) = tokio::fs::read_to_string(&path).await {
                contents = found;
                if !contents.is_empty() {
                    break;
                }
            }
        }
        assert_eq!(contents, "on display");

        cancel.cancel();
        handle.await.unwrap();
    }
}
