//! # Read-Only Node Flows
//!
//! A writer process and a read-only gateway share one cluster. The reader
//! learns about new ledgers only through its range monitor, and announces
//! them to `ledger` stream subscribers.

#[cfg(test)]
mod tests {
    use std::sync::Arc;
    use std::time::Duration;

    use gateway_node::RangeMonitor;
    use lg_01_storage_executor::{ClusterConfig, InMemoryCluster, StorageConnection};
    use lg_02_ledger_backend::{BackendError, LedgerBackend, LedgerBackendApi};
    use lg_03_api_gateway::{
        spawn_ledger_publisher, AppState, LimitsConfig, RpcHandlers, SubscriptionManager,
        WebSocketHandler,
    };
    use serde_json::json;
    use shared_types::{LedgerRange, NodeMode};

    use crate::fixtures::{gateway, header, ledger, open_backend, rpc, transaction, write_ledgers};

    async fn writer_and_reader() -> (LedgerBackend, Arc<LedgerBackend>) {
        let cluster: Arc<dyn StorageConnection> =
            Arc::new(InMemoryCluster::new(ClusterConfig::default()).unwrap());
        let writer = open_backend(Arc::clone(&cluster), NodeMode::ReadWrite)
            .await
            .unwrap();
        write_ledgers(&writer, 1, 2).await.unwrap();

        let reader = open_backend(cluster, NodeMode::ReadOnly).await.unwrap();
        (writer, Arc::new(reader))
    }

    #[tokio::test]
    async fn test_read_only_needs_a_populated_database() {
        let cluster: Arc<dyn StorageConnection> =
            Arc::new(InMemoryCluster::new(ClusterConfig::default()).unwrap());
        let result = open_backend(cluster, NodeMode::ReadOnly).await;
        assert!(matches!(result, Err(BackendError::EmptyReadOnly)));
    }

    #[tokio::test]
    async fn test_reader_rejects_writes() {
        let (_writer, reader) = writer_and_reader().await;
        assert_eq!(reader.fetch_range(), LedgerRange::new(1, 2));

        let err = reader.write_ledger(ledger(3)).await.unwrap_err();
        assert!(matches!(err, BackendError::ReadOnly));
        assert_eq!(reader.fetch_range(), LedgerRange::new(1, 2));
    }

    #[tokio::test]
    async fn test_searched_all_follows_monitor() {
        let (writer, reader) = writer_and_reader().await;
        let service = gateway(reader.clone());
        let monitor = RangeMonitor::new(reader.clone(), Duration::from_millis(10));

        writer.write_ledger(ledger(3)).await.unwrap();
        let missing = transaction(50).hash().to_string();
        let request = json!({
            "id": 1,
            "method": "tx",
            "params": { "transaction": missing, "min_ledger": 1, "max_ledger": 3 }
        });

        // Ledger 3 is persisted but not yet known to the reader
        let (_, reply) = rpc(service.http_router(), request.clone()).await;
        assert_eq!(reply["error"]["data"]["searched_all"], false);

        assert_eq!(monitor.poll_once().await.unwrap(), LedgerRange::new(1, 3));
        let (_, reply) = rpc(service.http_router(), request).await;
        assert_eq!(reply["error"]["data"]["searched_all"], true);

        let (_, info) = rpc(service.http_router(), json!({ "id": 2, "method": "server_info" })).await;
        assert_eq!(info["result"]["complete_ledgers"], "1-3");
        assert_eq!(info["result"]["read_only"], true);
    }

    #[tokio::test]
    async fn test_monitor_feeds_ledger_stream() {
        let (writer, reader) = writer_and_reader().await;
        let backend: Arc<dyn LedgerBackendApi> = reader.clone();

        let limits = LimitsConfig::default();
        let state = AppState {
            rpc_handlers: Arc::new(RpcHandlers::new(Arc::clone(&backend), limits.clone())),
            subscriptions: Arc::new(SubscriptionManager::new()),
            limits,
        };
        let handler = WebSocketHandler::new(state.clone(), 64 * 1024);
        let reply: serde_json::Value = serde_json::from_str(
            &handler
                .handle_message(r#"{"id":1,"method":"subscribe","params":{"streams":["ledger"]}}"#)
                .await,
        )
        .unwrap();
        assert_eq!(reply["result"]["validated_ledgers"], "1-2");

        let mut notifications = state.subscriptions.ledger_notifications();
        let publisher = spawn_ledger_publisher(Arc::clone(&backend), Arc::clone(&state.subscriptions));
        let (stop_tx, stop_rx) = tokio::sync::watch::channel(());
        let monitor = RangeMonitor::new(backend, Duration::from_millis(10)).spawn(stop_rx);

        writer.write_ledger(ledger(3)).await.unwrap();
        let text = tokio::time::timeout(Duration::from_secs(5), notifications.recv())
            .await
            .unwrap()
            .unwrap();
        let notification: serde_json::Value = serde_json::from_str(&text).unwrap();
        assert_eq!(notification["method"], "ledgerClosed");
        assert_eq!(notification["params"]["type"], "ledgerClosed");
        assert_eq!(notification["params"]["ledger_index"], 3);
        assert_eq!(notification["params"]["ledger_hash"], header(3).hash.to_string());
        assert_eq!(notification["params"]["validated_ledgers"], "1-3");

        stop_tx.send(()).unwrap();
        monitor.await.unwrap();
        publisher.abort();
    }
}
