//! # Storage Fault Flows
//!
//! Faults injected under the executor surface as retries, `tooBusy` or
//! `internal` at the JSON-RPC boundary, and never move the ledger range.

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use axum::http::StatusCode;
    use lg_01_storage_executor::{
        ClusterConfig, ErrorCode, Fault, FaultyConnection, InMemoryCluster, NodeHealth,
        OperationClass,
    };
    use lg_02_ledger_backend::{LedgerBackend, LedgerBackendApi};
    use lg_03_api_gateway::{codes, tokens, ApiGatewayService};
    use serde_json::json;
    use shared_types::{LedgerRange, NodeMode};

    use crate::fixtures::{gateway, ledger, open_backend, rpc, transaction, write_ledgers};

    struct Harness {
        connection: Arc<FaultyConnection<InMemoryCluster>>,
        backend: Arc<LedgerBackend>,
        service: ApiGatewayService,
    }

    /// Ledgers 1..=5 behind a fault-injecting connection.
    async fn harness() -> Harness {
        let cluster = InMemoryCluster::new(ClusterConfig::default()).unwrap();
        let connection = Arc::new(FaultyConnection::new(cluster));
        let backend = open_backend(connection.clone(), NodeMode::ReadWrite)
            .await
            .unwrap();
        write_ledgers(&backend, 1, 5).await.unwrap();

        let backend = Arc::new(backend);
        let service = gateway(backend.clone());
        Harness {
            connection,
            backend,
            service,
        }
    }

    async fn lookup(service: &ApiGatewayService, sequence: u64) -> serde_json::Value {
        let (status, reply) = rpc(
            service.http_router(),
            json!({
                "jsonrpc": "2.0",
                "id": 1,
                "method": "tx",
                "params": { "transaction": transaction(sequence).hash().to_string() }
            }),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        reply
    }

    #[tokio::test]
    async fn test_transient_faults_are_retried() {
        let h = harness().await;
        let retries_before = h.backend.executor().stats().snapshot().retries;

        h.connection.inject_failures(ErrorCode::RequestTimedOut, 2);
        let reply = lookup(&h.service, 3).await;

        assert_eq!(reply["result"]["ledger_index"], 3);
        assert_eq!(h.connection.pending_faults(), 0);
        assert!(h.backend.executor().stats().snapshot().retries >= retries_before + 2);
    }

    #[tokio::test]
    async fn test_exhausted_retries_are_too_busy() {
        let h = harness().await;
        h.connection.inject_failures(ErrorCode::RequestTimedOut, 3);

        let reply = lookup(&h.service, 3).await;
        assert_eq!(reply["error"]["code"], codes::RESOURCE_UNAVAILABLE);
        assert_eq!(reply["error"]["data"]["error"], tokens::TOO_BUSY);

        // The next request is served normally
        let reply = lookup(&h.service, 3).await;
        assert_eq!(reply["result"]["ledger_index"], 3);
    }

    #[tokio::test]
    async fn test_fatal_faults_are_not_retried() {
        let h = harness().await;
        h.connection.inject(Fault::Fail(ErrorCode::ServerError));
        let submissions_before = h.connection.submissions();

        let reply = lookup(&h.service, 4).await;
        assert_eq!(reply["error"]["code"], codes::INTERNAL_ERROR);
        assert_eq!(reply["error"]["data"]["error"], tokens::INTERNAL);
        assert_eq!(h.connection.submissions(), submissions_before + 1);
    }

    #[tokio::test]
    async fn test_dropped_completion_is_internal() {
        let h = harness().await;
        h.connection.inject(Fault::DropCompletion);

        let reply = lookup(&h.service, 2).await;
        assert_eq!(reply["error"]["code"], codes::INTERNAL_ERROR);
    }

    #[tokio::test]
    async fn test_other_transient_codes_are_not_retried_by_default() {
        let h = harness().await;
        h.connection.inject(Fault::Fail(ErrorCode::Overloaded));
        let submissions_before = h.connection.submissions();

        let reply = lookup(&h.service, 3).await;
        assert_eq!(reply["error"]["data"]["error"], tokens::TOO_BUSY);
        assert_eq!(h.connection.submissions(), submissions_before + 1);
    }

    #[tokio::test]
    async fn test_cluster_outage_and_recovery() {
        let h = harness().await;
        h.connection.inner().set_all_health(NodeHealth::Down);

        let reply = lookup(&h.service, 1).await;
        assert_eq!(reply["error"]["data"]["error"], tokens::TOO_BUSY);

        h.connection.inner().set_all_health(NodeHealth::Up);
        let reply = lookup(&h.service, 1).await;
        assert_eq!(reply["result"]["ledger_index"], 1);
    }

    #[tokio::test]
    async fn test_failed_write_keeps_range() {
        let h = harness().await;
        h.connection.inner().set_all_health(NodeHealth::Down);

        assert!(h.backend.write_ledger(ledger(6)).await.is_err());
        assert_eq!(h.backend.fetch_range(), LedgerRange::new(1, 5));

        h.connection.inner().set_all_health(NodeHealth::Up);
        h.connection
            .inject_for_class(OperationClass::Write, Fault::Fail(ErrorCode::RequestTimedOut));
        h.backend.write_ledger(ledger(6)).await.unwrap();
        assert_eq!(h.backend.fetch_range(), LedgerRange::new(1, 6));
        assert_eq!(h.backend.hard_fetch_range().await.unwrap(), LedgerRange::new(1, 6));
    }
}
