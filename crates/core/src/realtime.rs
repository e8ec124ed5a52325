//! Client-side realtime support.
//!
//! The hosted database pushes row-change notifications; this module models
//! the subscriber side only. Adapters emit a [`ChangeEvent`] for every write
//! they perform, and listeners use the events to invalidate cached query
//! results, re-fetching on next access.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;

/// Kind of row change.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChangeOp {
    Insert,
    Update,
    Delete,
}

/// One row-change notification.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChangeEvent {
    pub table: &'static str,
    pub op: ChangeOp,
    pub row_id: String,
}

impl ChangeEvent {
    pub fn new(table: &'static str, op: ChangeOp, row_id: impl Into<String>) -> Self {
        Self {
            table,
            op,
            row_id: row_id.into(),
        }
    }
}

/// Broadcast hub for change events.
///
/// Cloning is cheap; all clones share one channel. Events published while no
/// subscriber exists are dropped, matching the at-most-once delivery of the
/// hosted feed.
#[derive(Clone)]
pub struct ChangeFeed {
    sender: broadcast::Sender<ChangeEvent>,
}

impl ChangeFeed {
    pub fn new() -> Self {
        let (sender, _) = broadcast::channel(256);
        Self { sender }
    }

    /// Publish an event. Send failures (no active subscriber) are ignored.
    pub fn emit(&self, event: ChangeEvent) {
        let _ = self.sender.send(event);
    }

    /// Subscribe to all subsequent events.
    pub fn subscribe(&self) -> broadcast::Receiver<ChangeEvent> {
        self.sender.subscribe()
    }
}

impl Default for ChangeFeed {
    fn default() -> Self {
        Self::new()
    }
}

/// A per-table cache of serialized query results.
///
/// The cache itself is dumb storage; pair it with
/// [`spawn_invalidator`] so change events drop the affected table's entries.
#[derive(Default)]
pub struct QueryCache {
    entries: Mutex<HashMap<String, HashMap<String, serde_json::Value>>>,
}

impl QueryCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, table: &str, key: &str) -> Option<serde_json::Value> {
        let entries = self.entries.lock().unwrap();
        entries.get(table).and_then(|t| t.get(key)).cloned()
    }

    pub fn put(&self, table: &str, key: impl Into<String>, value: serde_json::Value) {
        let mut entries = self.entries.lock().unwrap();
        entries
            .entry(table.to_string())
            .or_default()
            .insert(key.into(), value);
    }

    /// Drop every cached entry for a table.
    pub fn invalidate_table(&self, table: &str) {
        let mut entries = self.entries.lock().unwrap();
        entries.remove(table);
    }

    pub fn len(&self) -> usize {
        let entries = self.entries.lock().unwrap();
        entries.values().map(|t| t.len()).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Spawn the listener task that invalidates `cache` whenever a change event
/// arrives for a cached table.
///
/// The task ends when the feed's last sender is dropped. Lagged receivers
/// resubscribe implicitly: on lag the whole cache is cleared, since missed
/// events may concern any table.
pub fn spawn_invalidator(
    cache: Arc<QueryCache>,
    mut receiver: broadcast::Receiver<ChangeEvent>,
) -> tokio::task::JoinHandle<()> {
    tokio::spawn(async move {
        loop {
            match receiver.recv().await {
                Ok(event) => cache.invalidate_table(event.table),
                Err(broadcast::error::RecvError::Lagged(_)) => {
                    let mut entries = cache.entries.lock().unwrap();
                    entries.clear();
                }
                Err(broadcast::error::RecvError::Closed) => break,
            }
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn events_reach_subscribers() {
        let feed = ChangeFeed::new();
        let mut rx = feed.subscribe();

        feed.emit(ChangeEvent::new("invoices", ChangeOp::Insert, "inv-1"));

        let event = rx.recv().await.unwrap();
        assert_eq!(event.table, "invoices");
        assert_eq!(event.op, ChangeOp::Insert);
        assert_eq!(event.row_id, "inv-1");
    }

    #[tokio::test]
    async fn emit_without_subscribers_is_silent() {
        let feed = ChangeFeed::new();
        feed.emit(ChangeEvent::new("invoices", ChangeOp::Delete, "inv-1"));
    }

    #[tokio::test]
    async fn invalidator_drops_only_affected_table() {
        let feed = ChangeFeed::new();
        let cache = Arc::new(QueryCache::new());
        cache.put("invoices", "list:acme", serde_json::json!([1, 2]));
        cache.put("companies", "acme", serde_json::json!({"name": "Acme"}));

        let handle = spawn_invalidator(cache.clone(), feed.subscribe());

        feed.emit(ChangeEvent::new("invoices", ChangeOp::Update, "inv-1"));

        // Give the listener task a chance to run.
        for _ in 0..50 {
            if cache.get("invoices", "list:acme").is_none() {
                break;
            }
            tokio::time::sleep(std::time::Duration::from_millis(5)).await;
        }

        assert!(cache.get("invoices", "list:acme").is_none());
        assert!(cache.get("companies", "acme").is_some());

        drop(feed);
        handle.await.unwrap();
    }
}
