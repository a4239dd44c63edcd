//! Change feed for stores that cannot push.
//!
//! Polls the table on an interval and emits `ChangeKind::Changed`
//! whenever the content fingerprint moves.

use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

use crate::{ChangeEvent, ChangeFeed, ChangeKind, DataStore, Query, Subscription};

pub struct PollingFeed {
    store: Arc<dyn DataStore>,
    interval: Duration,
    shutdown: CancellationToken,
}

impl PollingFeed {
    /// Every subscription stops when `shutdown` is cancelled.
    pub fn new(store: Arc<dyn DataStore>, interval: Duration, shutdown: CancellationToken) -> Self {
        Self {
            store,
            interval,
            shutdown,
        }
    }
}

fn fingerprint(rows: &[serde_json::Value]) -> u64 {
    let mut hasher = DefaultHasher::new();
    for row in rows {
        row.to_string().hash(&mut hasher);
    }
    hasher.finish()
}

async fn snapshot(store: &dyn DataStore, table: &str) -> Option<u64> {
    match store.select(table, &Query::new().order("id", true)).await {
        Ok(rows) => Some(fingerprint(&rows)),
        Err(e) => {
            warn!(table, "change poll failed: {}", e);
            None
        }
    }
}

impl ChangeFeed for PollingFeed {
    fn subscribe(&self, table: &str) -> Subscription {
        let (tx, rx) = mpsc::channel(8);
        let cancel = self.shutdown.child_token();
        let stop = cancel.clone();
        let store = self.store.clone();
        let interval = self.interval;
        let table = table.to_string();

        tokio::spawn(async move {
            let mut last = snapshot(store.as_ref(), &table).await;
            loop {
                tokio::select! {
                    _ = stop.cancelled() => {
                        debug!(table = %table, "change poll stopped");
                        break;
                    }
                    _ = tokio::time::sleep(interval) => {}
                }

                let Some(current) = snapshot(store.as_ref(), &table).await else {
                    continue;
                };
                if last.is_some_and(|prev| prev == current) {
                    continue;
                }
                let first = last.is_none();
                last = Some(current);
                if first {
                    // Baseline only; the first successful poll after a failure is not a change.
                    continue;
                }

                let event = ChangeEvent {
                    table: table.clone(),
                    kind: ChangeKind::Changed,
                };
                if tx.send(event).await.is_err() {
                    break;
                }
            }
        });

        Subscription::new(rx, cancel)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::MemoryStore;
    use serde_json::json;

    #[tokio::test]
    async fn emits_when_rows_change() {
        let store = Arc::new(MemoryStore::new());
        store.seed("pakages", vec![json!({"id": "1", "status": "belum_diambil"})]);
        let feed = PollingFeed::new(store.clone(), Duration::from_millis(10), CancellationToken::new());
        let mut sub = feed.subscribe("pakages");

        tokio::time::sleep(Duration::from_millis(30)).await;
        store
            .update("pakages", "1", &json!({"status": "sudah_diambil"}))
            .await
            .unwrap();

        let event = tokio::time::timeout(Duration::from_secs(2), sub.next())
            .await
            .unwrap()
            .unwrap();
        assert_eq!(event.kind, ChangeKind::Changed);
        assert_eq!(event.table, "pakages");
    }

    #[tokio::test]
    async fn shutdown_stops_subscriptions() {
        let store = Arc::new(MemoryStore::new());
        let shutdown = CancellationToken::new();
        let feed = PollingFeed::new(store, Duration::from_millis(10), shutdown.clone());
        let mut sub = feed.subscribe("pakages");

        shutdown.cancel();
        let next = tokio::time::timeout(Duration::from_secs(2), sub.next()).await.unwrap();
        assert!(next.is_none());
    }

    #[test]
    fn fingerprint_tracks_content() {
        let a = vec![json!({"id": "1", "status": "belum_diambil"})];
        let b = vec![json!({"id": "1", "status": "sudah_diambil"})];
        assert_eq!(fingerprint(&a), fingerprint(&a.clone()));
        assert_ne!(fingerprint(&a), fingerprint(&b));
    }
}
