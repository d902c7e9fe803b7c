//! WebSocket subscription manager and the ledger stream publisher.

use crate::domain::methods::Stream;
use crate::domain::types::LedgerClosed;
use dashmap::DashMap;
use lg_02_ledger_backend::LedgerBackendApi;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::sync::Arc;
use tokio::sync::broadcast;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};
use uuid::Uuid;

/// Identity of one WebSocket connection
pub type ConnectionId = Uuid;

/// Capacity of the notification fan-out; lagging connections skip ahead.
const NOTIFICATION_CAPACITY: usize = 256;

/// Stream notification envelope
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SubscriptionNotification<T> {
    pub jsonrpc: String,
    pub method: String,
    pub params: T,
}

impl<T> SubscriptionNotification<T> {
    pub fn new(method: &str, params: T) -> Self {
        Self {
            jsonrpc: "2.0".to_string(),
            method: method.to_string(),
            params,
        }
    }
}

/// Subscription manager
///
/// Tracks which streams each connection listens to and fans serialized
/// notifications out to every connection. Each connection filters on its
/// own subscriptions before sending.
pub struct SubscriptionManager {
    by_connection: DashMap<ConnectionId, HashSet<Stream>>,
    ledger_tx: broadcast::Sender<Arc<str>>,
}

impl Default for SubscriptionManager {
    fn default() -> Self {
        Self::new()
    }
}

impl SubscriptionManager {
    pub fn new() -> Self {
        let (ledger_tx, _) = broadcast::channel(NOTIFICATION_CAPACITY);
        Self {
            by_connection: DashMap::new(),
            ledger_tx,
        }
    }

    pub fn subscribe(&self, connection_id: ConnectionId, streams: &[Stream]) {
        let mut subscribed = self.by_connection.entry(connection_id).or_default();
        subscribed.extend(streams.iter().copied());
        debug!(%connection_id, ?streams, "Subscribed");
    }

    pub fn unsubscribe(&self, connection_id: ConnectionId, streams: &[Stream]) {
        if let Some(mut subscribed) = self.by_connection.get_mut(&connection_id) {
            for stream in streams {
                subscribed.remove(stream);
            }
        }
        debug!(%connection_id, ?streams, "Unsubscribed");
    }

    pub fn is_subscribed(&self, connection_id: &ConnectionId, stream: Stream) -> bool {
        self.by_connection
            .get(connection_id)
            .is_some_and(|subscribed| subscribed.contains(&stream))
    }

    /// Remove all subscriptions for a connection
    pub fn remove_connection(&self, connection_id: &ConnectionId) {
        if self.by_connection.remove(connection_id).is_some() {
            debug!(%connection_id, "Removed all subscriptions for connection");
        }
    }

    /// Connections currently listening to `stream`
    pub fn subscriber_count(&self, stream: Stream) -> usize {
        self.by_connection
            .iter()
            .filter(|entry| entry.value().contains(&stream))
            .count()
    }

    /// Receiver of every serialized `ledger` stream notification
    pub fn ledger_notifications(&self) -> broadcast::Receiver<Arc<str>> {
        self.ledger_tx.subscribe()
    }

    /// Broadcast a closed ledger. Returns the number of live receivers.
    pub fn publish_ledger_closed(&self, event: LedgerClosed) -> usize {
        let notification = SubscriptionNotification::new(LedgerClosed::KIND, event);
        match serde_json::to_string(&notification) {
            Ok(text) => self.ledger_tx.send(Arc::from(text)).unwrap_or(0),
            Err(e) => {
                warn!(error = %e, "Failed to serialize ledger notification");
                0
            }
        }
    }
}

/// Forward range extensions from the backend to `ledger` subscribers.
///
/// Only a growing maximum is announced; a raised minimum (pruning) is not a
/// closed ledger.
pub fn spawn_ledger_publisher(
    backend: Arc<dyn LedgerBackendApi>,
    manager: Arc<SubscriptionManager>,
) -> JoinHandle<()> {
    let mut ranges = backend.subscribe_ranges();
    let mut last_max = backend.fetch_range().map(|range| range.max_sequence);

    tokio::spawn(async move {
        loop {
            match ranges.recv().await {
                Ok(range) => {
                    if last_max.is_some_and(|max| range.max_sequence <= max) {
                        continue;
                    }
                    last_max = Some(range.max_sequence);

                    let header = match backend.fetch_ledger_header(range.max_sequence).await {
                        Ok(header) => Some(header),
                        Err(e) => {
                            debug!(sequence = range.max_sequence, error = %e, "Closed ledger header unavailable");
                            None
                        }
                    };
                    let receivers =
                        manager.publish_ledger_closed(LedgerClosed::new(range, header.as_ref()));
                    debug!(range = %range, receivers, "Published ledgerClosed");
                }
                Err(broadcast::error::RecvError::Lagged(skipped)) => {
                    warn!(skipped, "Ledger publisher lagged behind range updates");
                }
                Err(broadcast::error::RecvError::Closed) => {
                    info!("Range updates closed, ledger publisher stopping");
                    break;
                }
            }
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rpc::testing::{backend_with_ledgers, header};
    use lg_02_ledger_backend::LedgerWrite;
    use std::time::Duration;

    #[test]
    fn test_subscribe_and_unsubscribe() {
        let manager = SubscriptionManager::new();
        let a = Uuid::new_v4();
        let b = Uuid::new_v4();

        manager.subscribe(a, &[Stream::Ledger]);
        assert!(manager.is_subscribed(&a, Stream::Ledger));
        assert!(!manager.is_subscribed(&b, Stream::Ledger));
        assert_eq!(manager.subscriber_count(Stream::Ledger), 1);

        manager.unsubscribe(a, &[Stream::Ledger]);
        assert!(!manager.is_subscribed(&a, Stream::Ledger));
        assert_eq!(manager.subscriber_count(Stream::Ledger), 0);
    }

    #[test]
    fn test_remove_connection() {
        let manager = SubscriptionManager::new();
        let a = Uuid::new_v4();
        manager.subscribe(a, &[Stream::Ledger]);
        manager.remove_connection(&a);
        assert!(!manager.is_subscribed(&a, Stream::Ledger));
    }

    #[tokio::test]
    async fn test_notification_shape() {
        let manager = SubscriptionManager::new();
        let mut rx = manager.ledger_notifications();
        let range = shared_types::LedgerRange::new(1, 2).unwrap();
        assert_eq!(manager.publish_ledger_closed(LedgerClosed::new(range, None)), 1);

        let text = rx.recv().await.unwrap();
        let json: serde_json::Value = serde_json::from_str(&text).unwrap();
        assert_eq!(json["jsonrpc"], "2.0");
        assert_eq!(json["method"], "ledgerClosed");
        assert_eq!(json["params"]["ledger_index"], 2);
        assert_eq!(json["params"]["validated_ledgers"], "1-2");
    }

    #[tokio::test]
    async fn test_publisher_announces_new_ledgers_only() {
        let backend = backend_with_ledgers(1, 3).await;
        let manager = Arc::new(SubscriptionManager::new());
        let mut rx = manager.ledger_notifications();
        let publisher = spawn_ledger_publisher(backend.clone(), Arc::clone(&manager));

        // Pruning does not close a ledger
        backend.advance_min_sequence(2).await.unwrap();
        backend.write_ledger(LedgerWrite::new(header(4))).await.unwrap();

        let text = tokio::time::timeout(Duration::from_secs(5), rx.recv())
            .await
            .unwrap()
            .unwrap();
        let json: serde_json::Value = serde_json::from_str(&text).unwrap();
        assert_eq!(json["params"]["ledger_index"], 4);
        assert_eq!(json["params"]["validated_ledgers"], "2-4");
        assert_eq!(json["params"]["ledger_hash"], header(4).hash.to_string());
        assert_eq!(json["params"]["ledger_time"], header(4).close_time);

        publisher.abort();
    }
}
