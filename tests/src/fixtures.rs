//! Shared fixtures: deterministic ledgers, populated backends and an HTTP
//! JSON-RPC client over the gateway router.

use std::sync::Arc;

use axum::body::{to_bytes, Body};
use axum::http::{header, Request, StatusCode};
use axum::Router;
use lg_01_storage_executor::{ExecutorConfig, StorageConnection};
use lg_02_ledger_backend::{BackendError, LedgerBackend, LedgerBackendApi, LedgerWrite};
use lg_03_api_gateway::{ApiGatewayService, GatewayConfig};
use shared_types::{Hash256, LedgerHeader, NodeMode, TransactionAndMetadata};
use tower::ServiceExt;

pub fn header(sequence: u64) -> LedgerHeader {
    LedgerHeader {
        sequence,
        hash: Hash256::digest(format!("ledger-{sequence}").as_bytes()),
        parent_hash: Hash256::digest(format!("ledger-{}", sequence.saturating_sub(1)).as_bytes()),
        close_time: 750_000_000 + sequence * 4,
    }
}

/// The single transaction closed in ledger `sequence`.
pub fn transaction(sequence: u64) -> TransactionAndMetadata {
    TransactionAndMetadata {
        transaction: serde_json::json!({
            "TransactionType": "Payment",
            "Sequence": sequence,
        })
        .to_string()
        .into_bytes(),
        metadata: serde_json::json!({ "TransactionResult": "tesSUCCESS" })
            .to_string()
            .into_bytes(),
        ledger_sequence: sequence,
        date: 750_000_000 + sequence * 4,
    }
}

/// The state object rewritten in every ledger.
pub fn object_key() -> Hash256 {
    Hash256::digest(b"account-root")
}

pub fn object_blob(sequence: u64) -> Vec<u8> {
    format!("balance={sequence}").into_bytes()
}

pub fn ledger(sequence: u64) -> LedgerWrite {
    LedgerWrite::new(header(sequence))
        .with_transaction(transaction(sequence))
        .with_object(object_key(), object_blob(sequence))
}

pub async fn open_backend(
    connection: Arc<dyn StorageConnection>,
    mode: NodeMode,
) -> Result<LedgerBackend, BackendError> {
    LedgerBackend::open(connection, ExecutorConfig::default(), mode).await
}

/// Write ledgers `first..=last` with [`ledger`].
pub async fn write_ledgers(
    backend: &dyn LedgerBackendApi,
    first: u64,
    last: u64,
) -> Result<(), BackendError> {
    for sequence in first..=last {
        backend.write_ledger(ledger(sequence)).await?;
    }
    Ok(())
}

/// Gateway with default limits. Panics on an invalid default config.
pub fn gateway(backend: Arc<dyn LedgerBackendApi>) -> ApiGatewayService {
    match ApiGatewayService::new(GatewayConfig::default(), backend) {
        Ok(service) => service,
        Err(e) => panic!("default gateway config rejected: {e}"),
    }
}

/// POST one JSON-RPC body and decode the reply.
pub async fn rpc(router: Router, body: serde_json::Value) -> (StatusCode, serde_json::Value) {
    let request = Request::post("/")
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap();
    let response = router.oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    (status, serde_json::from_slice(&bytes).unwrap())
}
