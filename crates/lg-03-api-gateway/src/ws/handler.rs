//! WebSocket connection handler.
//!
//! Every JSON-RPC method is available over the socket. `subscribe` and
//! `unsubscribe` are handled here since they need the connection identity;
//! everything else goes through the shared router.

use crate::domain::error::{ApiError, ApiResult};
use crate::domain::methods::Stream;
use crate::domain::types::StreamParams;
use crate::router::{
    error_response, parse_id, parse_params, process_single_request, record_outcome,
    success_response, AppState,
};
use crate::ws::subscriptions::ConnectionId;
use axum::extract::ws::{Message, WebSocket};
use futures::{SinkExt, StreamExt};
use tokio::sync::broadcast::error::RecvError;
use tracing::{debug, info, warn};
use uuid::Uuid;

/// WebSocket connection handler
pub struct WebSocketHandler {
    state: AppState,
    connection_id: ConnectionId,
    max_message_size: usize,
}

impl WebSocketHandler {
    pub fn new(state: AppState, max_message_size: usize) -> Self {
        Self {
            state,
            connection_id: Uuid::new_v4(),
            max_message_size,
        }
    }

    pub fn connection_id(&self) -> ConnectionId {
        self.connection_id
    }

    /// Serve one connection until the peer closes it.
    pub async fn handle(self, socket: WebSocket) {
        info!(connection_id = %self.connection_id, "New WebSocket connection");

        let (mut sender, mut receiver) = socket.split();
        let mut notifications = self.state.subscriptions.ledger_notifications();

        loop {
            tokio::select! {
                incoming = receiver.next() => {
                    let reply = match incoming {
                        Some(Ok(Message::Text(text))) => Message::Text(self.handle_message(&text).await),
                        Some(Ok(Message::Binary(data))) => match String::from_utf8(data) {
                            Ok(text) => Message::Text(self.handle_message(&text).await),
                            Err(_) => Message::Text(
                                error_response(None, ApiError::parse_error("binary frame is not UTF-8")).to_string(),
                            ),
                        },
                        Some(Ok(Message::Ping(data))) => Message::Pong(data),
                        Some(Ok(Message::Pong(_))) => continue,
                        Some(Ok(Message::Close(_))) | None => {
                            debug!(connection_id = %self.connection_id, "WebSocket close received");
                            break;
                        }
                        Some(Err(e)) => {
                            warn!(connection_id = %self.connection_id, error = %e, "WebSocket error");
                            break;
                        }
                    };
                    if let Err(e) = sender.send(reply).await {
                        warn!(connection_id = %self.connection_id, error = %e, "Failed to send WebSocket response");
                        break;
                    }
                }
                notification = notifications.recv() => match notification {
                    Ok(text) => {
                        if !self.state.subscriptions.is_subscribed(&self.connection_id, Stream::Ledger) {
                            continue;
                        }
                        if let Err(e) = sender.send(Message::Text(text.to_string())).await {
                            warn!(connection_id = %self.connection_id, error = %e, "Failed to push notification");
                            break;
                        }
                    }
                    Err(RecvError::Lagged(skipped)) => {
                        warn!(connection_id = %self.connection_id, skipped, "Connection lagged behind ledger stream");
                    }
                    Err(RecvError::Closed) => break,
                },
            }
        }

        // Cleanup subscriptions on disconnect
        self.state.subscriptions.remove_connection(&self.connection_id);
        info!(connection_id = %self.connection_id, "WebSocket connection closed");
    }

    /// Handle a single text message and return the serialized reply.
    pub async fn handle_message(&self, text: &str) -> String {
        if text.len() > self.max_message_size {
            warn!(
                connection_id = %self.connection_id,
                size = text.len(),
                max = self.max_message_size,
                "Message exceeds size limit"
            );
            return error_response(
                None,
                ApiError::limit_exceeded(format!(
                    "message of {} bytes (max: {})",
                    text.len(),
                    self.max_message_size
                )),
            )
            .to_string();
        }

        let request: serde_json::Value = match serde_json::from_str(text) {
            Ok(v) => v,
            Err(e) => return error_response(None, ApiError::parse_error(e.to_string())).to_string(),
        };

        let method = request.get("method").and_then(|m| m.as_str());
        let response = match method {
            Some(method @ ("subscribe" | "unsubscribe")) => {
                self.handle_stream_request(method, &request)
            }
            _ => process_single_request(&self.state, &request).await,
        };
        response.to_string()
    }

    fn handle_stream_request(&self, method: &str, request: &serde_json::Value) -> serde_json::Value {
        let id = match parse_id(request) {
            Ok(id) => id,
            Err(e) => return error_response(None, e),
        };

        let result = self.apply_streams(method, request.get("params"));
        record_outcome(method, result.is_ok());
        match result {
            Ok(value) => success_response(id, value),
            Err(e) => error_response(id, e),
        }
    }

    fn apply_streams(
        &self,
        method: &str,
        params: Option<&serde_json::Value>,
    ) -> ApiResult<serde_json::Value> {
        let params: StreamParams = parse_params(params)?;
        let streams = params
            .streams
            .iter()
            .map(|name| Stream::from_str(name).ok_or_else(ApiError::malformed_stream))
            .collect::<ApiResult<Vec<_>>>()?;

        let subscriptions = &self.state.subscriptions;
        if method == "unsubscribe" {
            subscriptions.unsubscribe(self.connection_id, &streams);
            return Ok(serde_json::json!({}));
        }

        subscriptions.subscribe(self.connection_id, &streams);
        let range = self.state.rpc_handlers.backend().fetch_range();
        match range {
            Some(range) if streams.contains(&Stream::Ledger) => Ok(serde_json::json!({
                "ledger_index": range.max_sequence,
                "validated_ledgers": range.to_string(),
            })),
            _ => Ok(serde_json::json!({})),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::error::{codes, tokens};
    use crate::router::tests::state;
    use crate::rpc::testing::backend_with_ledgers;

    async fn handler() -> WebSocketHandler {
        WebSocketHandler::new(state(backend_with_ledgers(10, 12).await), 1024)
    }

    async fn send(handler: &WebSocketHandler, request: serde_json::Value) -> serde_json::Value {
        serde_json::from_str(&handler.handle_message(&request.to_string()).await).unwrap()
    }

    #[tokio::test]
    async fn test_subscribe_to_ledger_stream() {
        let handler = handler().await;
        let reply = send(
            &handler,
            serde_json::json!({ "id": 1, "method": "subscribe", "params": { "streams": ["ledger"] } }),
        )
        .await;

        assert_eq!(reply["result"]["ledger_index"], 12);
        assert_eq!(reply["result"]["validated_ledgers"], "10-12");
        assert!(handler
            .state
            .subscriptions
            .is_subscribed(&handler.connection_id(), Stream::Ledger));

        let reply = send(
            &handler,
            serde_json::json!({ "id": 2, "method": "unsubscribe", "params": [{ "streams": ["ledger"] }] }),
        )
        .await;
        assert_eq!(reply["result"], serde_json::json!({}));
        assert!(!handler
            .state
            .subscriptions
            .is_subscribed(&handler.connection_id(), Stream::Ledger));
    }

    #[tokio::test]
    async fn test_unknown_stream_is_malformed() {
        let handler = handler().await;
        let reply = send(
            &handler,
            serde_json::json!({ "id": 1, "method": "subscribe", "params": { "streams": ["ledger", "book"] } }),
        )
        .await;
        assert_eq!(reply["error"]["code"], codes::INVALID_PARAMS);
        assert_eq!(reply["error"]["data"]["error"], tokens::MALFORMED_STREAM);
        assert!(!handler
            .state
            .subscriptions
            .is_subscribed(&handler.connection_id(), Stream::Ledger));
    }

    #[tokio::test]
    async fn test_other_methods_go_through_router() {
        let handler = handler().await;
        let reply = send(&handler, serde_json::json!({ "id": "x", "method": "server_info" })).await;
        assert_eq!(reply["id"], "x");
        assert_eq!(reply["result"]["complete_ledgers"], "10-12");
    }

    #[tokio::test]
    async fn test_oversized_and_malformed_messages() {
        let handler = handler().await;
        let big = "x".repeat(2048);
        let reply: serde_json::Value =
            serde_json::from_str(&handler.handle_message(&big).await).unwrap();
        assert_eq!(reply["error"]["code"], codes::LIMIT_EXCEEDED);

        let reply: serde_json::Value =
            serde_json::from_str(&handler.handle_message("{not json").await).unwrap();
        assert_eq!(reply["error"]["code"], codes::PARSE_ERROR);
    }
}
