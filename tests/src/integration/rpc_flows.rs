//! # JSON-RPC Flows
//!
//! Requests enter through the HTTP router and travel through the handlers,
//! the ledger backend and the storage executor down to the in-memory
//! cluster.

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use axum::http::StatusCode;
    use lg_02_ledger_backend::{make_backend, BackendConfig, LedgerBackendApi};
    use lg_03_api_gateway::{codes, tokens, ApiGatewayService};
    use serde_json::json;

    use crate::fixtures::{gateway, header, object_blob, object_key, rpc, transaction, write_ledgers};

    // =============================================================================
    // TEST FIXTURES
    // =============================================================================

    /// Gateway over ledgers 1..=20, one payment per ledger.
    async fn populated_gateway() -> ApiGatewayService {
        let backend = make_backend(&BackendConfig::default()).await.unwrap();
        write_ledgers(&backend, 1, 20).await.unwrap();
        let backend: Arc<dyn LedgerBackendApi> = Arc::new(backend);
        gateway(backend)
    }

    fn upper_hex(bytes: &[u8]) -> String {
        bytes.iter().map(|b| format!("{b:02X}")).collect()
    }

    async fn call(service: &ApiGatewayService, method: &str, params: serde_json::Value) -> serde_json::Value {
        let (status, reply) = rpc(
            service.http_router(),
            json!({ "jsonrpc": "2.0", "id": 1, "method": method, "params": [params] }),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        reply
    }

    // =============================================================================
    // tx
    // =============================================================================

    #[tokio::test]
    async fn test_tx_found_decodes_json_blobs() {
        let service = populated_gateway().await;
        let hash = transaction(5).hash();

        let reply = call(&service, "tx", json!({ "transaction": hash.to_string() })).await;
        let result = &reply["result"];
        assert_eq!(result["hash"], hash.to_string());
        assert_eq!(result["ledger_index"], 5);
        assert_eq!(result["date"], transaction(5).date);
        assert_eq!(result["validated"], true);
        assert_eq!(result["tx"]["TransactionType"], "Payment");
        assert_eq!(result["meta"]["TransactionResult"], "tesSUCCESS");
    }

    #[tokio::test]
    async fn test_tx_binary_is_upper_hex() {
        let service = populated_gateway().await;
        let tx = transaction(9);

        let reply = call(
            &service,
            "tx",
            json!({ "transaction": tx.hash().to_string(), "binary": true }),
        )
        .await;
        assert_eq!(reply["result"]["tx"], upper_hex(&tx.transaction));
        assert_eq!(reply["result"]["meta"], upper_hex(&tx.metadata));
    }

    #[tokio::test]
    async fn test_tx_not_found_reports_searched_all_only_with_window() {
        let service = populated_gateway().await;
        let missing = transaction(99).hash().to_string();

        let reply = call(&service, "tx", json!({ "transaction": missing })).await;
        assert_eq!(reply["error"]["code"], codes::RESOURCE_NOT_FOUND);
        assert_eq!(reply["error"]["message"], "Transaction not found.");
        assert_eq!(reply["error"]["data"]["error"], tokens::TXN_NOT_FOUND);
        assert!(reply["error"]["data"].get("searched_all").is_none());

        let covered = call(
            &service,
            "tx",
            json!({ "transaction": missing, "min_ledger": 1, "max_ledger": 20 }),
        )
        .await;
        assert_eq!(covered["error"]["data"]["searched_all"], true);

        let beyond = call(
            &service,
            "tx",
            json!({ "transaction": missing, "min_ledger": 1, "max_ledger": 30 }),
        )
        .await;
        assert_eq!(beyond["error"]["data"]["searched_all"], false);
    }

    #[tokio::test]
    async fn test_tx_window_validation() {
        let service = populated_gateway().await;
        let hash = transaction(1).hash().to_string();

        let excessive = call(
            &service,
            "tx",
            json!({ "transaction": hash, "min_ledger": 1, "max_ledger": 1002 }),
        )
        .await;
        assert_eq!(excessive["error"]["data"]["error"], tokens::EXCESSIVE_LGR_RANGE);
        assert_eq!(excessive["error"]["message"], "Ledger range exceeds 1000.");

        let inverted = call(
            &service,
            "tx",
            json!({ "transaction": hash, "min_ledger": 10, "max_ledger": 2 }),
        )
        .await;
        assert_eq!(inverted["error"]["data"]["error"], tokens::INVALID_LGR_RANGE);

        let half_open = call(&service, "tx", json!({ "transaction": hash, "min_ledger": 10 })).await;
        assert_eq!(half_open["error"]["data"]["error"], tokens::INVALID_LGR_RANGE);
    }

    // =============================================================================
    // LEDGER QUERIES
    // =============================================================================

    #[tokio::test]
    async fn test_ledger_entry_versions() {
        let service = populated_gateway().await;
        let index = object_key().to_string();

        let at_seven = call(&service, "ledger_entry", json!({ "index": index, "ledger_index": 7 })).await;
        assert_eq!(at_seven["result"]["ledger_index"], 7);
        assert_eq!(at_seven["result"]["node_binary"], upper_hex(&object_blob(7)));

        let latest = call(&service, "ledger_entry", json!({ "index": index })).await;
        assert_eq!(latest["result"]["ledger_index"], 20);
        assert_eq!(latest["result"]["node_binary"], upper_hex(&object_blob(20)));

        let future = call(&service, "ledger_entry", json!({ "index": index, "ledger_index": 25 })).await;
        assert_eq!(future["error"]["data"]["error"], tokens::LGR_NOT_FOUND);
    }

    #[tokio::test]
    async fn test_ledger_header_and_range() {
        let service = populated_gateway().await;

        let reply = call(&service, "ledger", json!({ "ledger_index": 3 })).await;
        assert_eq!(reply["result"]["ledger_index"], 3);
        assert_eq!(reply["result"]["ledger"]["ledger_hash"], header(3).hash.to_string());
        assert_eq!(reply["result"]["ledger"]["close_time"], header(3).close_time);

        let range = call(&service, "ledger_range", json!({})).await;
        assert_eq!(range["result"]["ledger_min"], 1);
        assert_eq!(range["result"]["ledger_max"], 20);

        let info = call(&service, "server_info", json!({})).await;
        assert_eq!(info["result"]["complete_ledgers"], "1-20");
        assert_eq!(info["result"]["read_only"], false);
    }

    #[tokio::test]
    async fn test_empty_database_is_not_ready() {
        let backend: Arc<dyn LedgerBackendApi> =
            Arc::new(make_backend(&BackendConfig::default()).await.unwrap());
        let service = gateway(backend);

        let range = call(&service, "ledger_range", json!({})).await;
        assert_eq!(range["error"]["data"]["error"], tokens::NOT_READY);

        let info = call(&service, "server_info", json!({})).await;
        assert_eq!(info["result"]["complete_ledgers"], "empty");
    }

    #[tokio::test]
    async fn test_mixed_batch_keeps_order_and_ids() {
        let service = populated_gateway().await;
        let (status, reply) = rpc(
            service.http_router(),
            json!([
                { "jsonrpc": "2.0", "id": "a", "method": "ledger_range" },
                { "jsonrpc": "2.0", "id": "b", "method": "no_such_method" },
                { "jsonrpc": "2.0", "id": 3, "method": "tx", "params": { "transaction": transaction(2).hash().to_string() } },
            ]),
        )
        .await;

        assert_eq!(status, StatusCode::OK);
        let replies = reply.as_array().unwrap();
        assert_eq!(replies.len(), 3);
        assert_eq!(replies[0]["id"], "a");
        assert_eq!(replies[0]["result"]["ledger_max"], 20);
        assert_eq!(replies[1]["error"]["code"], codes::METHOD_NOT_FOUND);
        assert_eq!(replies[2]["id"], 3);
        assert_eq!(replies[2]["result"]["ledger_index"], 2);
    }
}
