//! JSON-RPC envelope handling and method routing.
//!
//! Shared by the HTTP endpoint and the WebSocket handler: both hand a parsed
//! request object to [`process_single_request`] and send back whatever it
//! returns.

use crate::domain::config::LimitsConfig;
use crate::domain::error::{ApiError, ApiResult};
use crate::domain::methods::{get_method_info, metric_label, Transport};
use crate::domain::types::JsonRpcId;
use crate::rpc::RpcHandlers;
use crate::ws::SubscriptionManager;
use axum::{extract::State, http::StatusCode, Json};
use gateway_telemetry::RPC_REQUESTS;
use serde::{de::DeserializeOwned, Serialize};
use std::sync::Arc;
use tracing::debug;

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub rpc_handlers: Arc<RpcHandlers>,
    pub subscriptions: Arc<SubscriptionManager>,
    pub limits: LimitsConfig,
}

/// Handle a JSON-RPC HTTP body: a single request or a batch.
pub async fn handle_json_rpc(
    State(state): State<AppState>,
    body: String,
) -> (StatusCode, Json<serde_json::Value>) {
    let request: serde_json::Value = match serde_json::from_str(&body) {
        Ok(v) => v,
        Err(e) => {
            return (
                StatusCode::BAD_REQUEST,
                Json(error_response(None, ApiError::parse_error(e.to_string()))),
            );
        }
    };

    let response = match request {
        serde_json::Value::Array(requests) => process_batch(&state, &requests).await,
        single => process_single_request(&state, &single).await,
    };

    (StatusCode::OK, Json(response))
}

async fn process_batch(state: &AppState, requests: &[serde_json::Value]) -> serde_json::Value {
    if requests.is_empty() {
        return error_response(None, ApiError::invalid_request("empty batch"));
    }
    if requests.len() > state.limits.max_batch_size {
        return error_response(
            None,
            ApiError::limit_exceeded(format!(
                "batch of {} requests (max: {})",
                requests.len(),
                state.limits.max_batch_size
            )),
        );
    }

    let responses =
        futures::future::join_all(requests.iter().map(|req| process_single_request(state, req)))
            .await;
    serde_json::Value::Array(responses)
}

/// Process a single JSON-RPC request object into a response object.
pub async fn process_single_request(
    state: &AppState,
    request: &serde_json::Value,
) -> serde_json::Value {
    let id = match parse_id(request) {
        Ok(id) => id,
        Err(e) => return error_response(None, e),
    };

    let Some(method) = request.get("method").and_then(|m| m.as_str()) else {
        return error_response(id, ApiError::invalid_request("missing method"));
    };

    let result = route_method(state, method, request.get("params")).await;
    record_outcome(method, result.is_ok());

    match result {
        Ok(value) => success_response(id, value),
        Err(e) => {
            debug!(method, code = e.code, error = %e, "RPC request failed");
            error_response(id, e)
        }
    }
}

/// Validate the request ID. Missing is allowed, null is a notification and
/// rejected.
pub(crate) fn parse_id(request: &serde_json::Value) -> ApiResult<Option<JsonRpcId>> {
    match request.get("id") {
        None => Ok(None),
        Some(serde_json::Value::Null) => Err(ApiError::invalid_request(
            "null id (notifications not supported)",
        )),
        Some(raw) => {
            let id: JsonRpcId = serde_json::from_value(raw.clone())
                .map_err(|_| ApiError::invalid_request("id must be string or number"))?;
            id.validate().map_err(ApiError::invalid_request)?;
            Ok(Some(id))
        }
    }
}

/// Route JSON-RPC method to appropriate handler.
pub async fn route_method(
    state: &AppState,
    method: &str,
    params: Option<&serde_json::Value>,
) -> ApiResult<serde_json::Value> {
    let handlers = &state.rpc_handlers;
    match method {
        "tx" => to_value(handlers.tx(parse_params(params)?).await?),
        "ledger_range" => to_value(handlers.ledger_range()?),
        "server_info" => to_value(handlers.server_info()),
        "ledger_entry" => to_value(handlers.ledger_entry(parse_params(params)?).await?),
        "ledger" => to_value(handlers.ledger(parse_params(params)?).await?),
        _ => match get_method_info(method) {
            Some(info) if info.transport == Transport::WebSocketOnly => Err(
                ApiError::invalid_request(format!("{method} requires a WebSocket connection")),
            ),
            _ => Err(ApiError::method_not_found(method)),
        },
    }
}

/// Parse named parameters: an object, or an array holding one object.
/// Missing params read as `{}`.
pub(crate) fn parse_params<T: DeserializeOwned>(params: Option<&serde_json::Value>) -> ApiResult<T> {
    let object = match params {
        None | Some(serde_json::Value::Null) => serde_json::Value::Object(Default::default()),
        Some(serde_json::Value::Array(items)) => items
            .first()
            .cloned()
            .unwrap_or_else(|| serde_json::Value::Object(Default::default())),
        Some(other) => other.clone(),
    };
    if !object.is_object() {
        return Err(ApiError::invalid_params("expected an object"));
    }
    serde_json::from_value(object).map_err(|e| ApiError::invalid_params(e.to_string()))
}

fn to_value<T: Serialize>(value: T) -> ApiResult<serde_json::Value> {
    serde_json::to_value(value).map_err(|e| ApiError::internal(e.to_string()))
}

pub(crate) fn record_outcome(method: &str, success: bool) {
    let outcome = if success { "success" } else { "error" };
    RPC_REQUESTS
        .with_label_values(&[metric_label(method), outcome])
        .inc();
}

/// Create JSON-RPC success response
pub(crate) fn success_response(
    id: Option<JsonRpcId>,
    result: serde_json::Value,
) -> serde_json::Value {
    serde_json::json!({
        "jsonrpc": "2.0",
        "id": id,
        "result": result
    })
}

/// Create JSON-RPC error response
pub(crate) fn error_response(id: Option<JsonRpcId>, error: ApiError) -> serde_json::Value {
    serde_json::json!({
        "jsonrpc": "2.0",
        "id": id,
        "error": error
    })
}
