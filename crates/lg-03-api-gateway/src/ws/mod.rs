//! WebSocket module for JSON-RPC and real-time streams.
//!
//! Supports every HTTP method plus `subscribe` / `unsubscribe` with
//! `streams: ["ledger"]`; each newly validated ledger is pushed as a
//! `ledgerClosed` notification.

pub mod handler;
pub mod subscriptions;

pub use handler::WebSocketHandler;
pub use subscriptions::{
    spawn_ledger_publisher, ConnectionId, SubscriptionManager, SubscriptionNotification,
};
