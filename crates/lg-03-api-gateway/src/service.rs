//! API Gateway service - main entry point.
//!
//! Provides HTTP (JSON-RPC), WebSocket, and Admin API servers.

use crate::domain::config::GatewayConfig;
use crate::domain::error::GatewayError;
use crate::router::{handle_json_rpc, AppState};
use crate::rpc::RpcHandlers;
use crate::ws::{spawn_ledger_publisher, SubscriptionManager, WebSocketHandler};
use axum::{
    extract::{ws::WebSocketUpgrade, DefaultBodyLimit, State},
    http::{header, StatusCode},
    response::IntoResponse,
    routing::{get, post},
    Json, Router,
};
use gateway_telemetry::encode_metrics;
use lg_02_ledger_backend::LedgerBackendApi;
use std::future::Future;
use std::sync::Arc;
use tokio::sync::watch;
use tower::ServiceBuilder;
use tower_http::{cors::CorsLayer, timeout::TimeoutLayer, trace::TraceLayer};
use tracing::{error, info};

/// API Gateway service state
pub struct ApiGatewayService {
    config: GatewayConfig,
    state: AppState,
}

impl ApiGatewayService {
    /// Create a new API Gateway service
    pub fn new(
        config: GatewayConfig,
        backend: Arc<dyn LedgerBackendApi>,
    ) -> Result<Self, GatewayError> {
        config.validate()?;

        let state = AppState {
            rpc_handlers: Arc::new(RpcHandlers::new(backend, config.limits.clone())),
            subscriptions: Arc::new(SubscriptionManager::new()),
            limits: config.limits.clone(),
        };

        Ok(Self { config, state })
    }

    pub fn subscriptions(&self) -> Arc<SubscriptionManager> {
        Arc::clone(&self.state.subscriptions)
    }

    /// Bind every enabled server and serve until `shutdown` resolves.
    ///
    /// Bind failures are returned before anything is served.
    pub async fn run<F>(self, shutdown: F) -> Result<(), GatewayError>
    where
        F: Future<Output = ()> + Send + 'static,
    {
        info!("Starting API Gateway...");

        let publisher = spawn_ledger_publisher(
            Arc::clone(self.state.rpc_handlers.backend()),
            Arc::clone(&self.state.subscriptions),
        );

        let (stop_tx, stop_rx) = watch::channel(());
        let servers = [
            ("http", self.config.http.enabled, self.config.http_addr(), self.http_router()),
            ("websocket", self.config.websocket.enabled, self.config.ws_addr(), self.ws_router()),
            ("admin", self.config.admin.enabled, self.config.admin_addr(), self.admin_router()),
        ];

        let mut handles = Vec::new();
        for (name, enabled, addr, router) in servers {
            if !enabled {
                continue;
            }
            let listener = tokio::net::TcpListener::bind(addr)
                .await
                .map_err(|source| GatewayError::Bind { addr, source })?;
            info!(server = name, addr = %addr, "Listening");

            let mut stop = stop_rx.clone();
            handles.push(tokio::spawn(async move {
                axum::serve(listener, router)
                    .with_graceful_shutdown(async move {
                        let _ = stop.changed().await;
                    })
                    .await
                    .map_err(|e| GatewayError::Serve(format!("{name}: {e}")))
            }));
        }

        info!("API Gateway started successfully");
        shutdown.await;
        info!("Received shutdown signal");

        let _ = stop_tx.send(());
        let mut result = Ok(());
        for handle in handles {
            match handle.await {
                Ok(Ok(())) => {}
                Ok(Err(e)) => {
                    error!(error = %e, "Server stopped with error");
                    result = Err(e);
                }
                Err(e) => {
                    error!(error = %e, "Server task panicked");
                    result = Err(GatewayError::Serve(e.to_string()));
                }
            }
        }
        publisher.abort();

        info!("API Gateway stopped");
        result
    }

    /// Build HTTP router for JSON-RPC
    pub fn http_router(&self) -> Router {
        let middleware = ServiceBuilder::new()
            .layer(TraceLayer::new_for_http())
            .layer(TimeoutLayer::new(self.config.http.request_timeout));

        let router = Router::new()
            .route("/", post(handle_json_rpc))
            .route("/health", get(health_check))
            .layer(DefaultBodyLimit::max(self.config.limits.max_request_size))
            .layer(middleware);

        let router = if self.config.http.cors {
            router.layer(CorsLayer::permissive())
        } else {
            router
        };
        router.with_state(self.state.clone())
    }

    /// Build WebSocket router
    pub fn ws_router(&self) -> Router {
        let max_message_size = self.config.websocket.max_message_size;

        Router::new()
            .route(
                "/",
                get(
                    move |State(state): State<AppState>, ws: WebSocketUpgrade| async move {
                        ws.max_message_size(max_message_size)
                            .on_upgrade(move |socket| async move {
                                WebSocketHandler::new(state, max_message_size)
                                    .handle(socket)
                                    .await;
                            })
                    },
                ),
            )
            .with_state(self.state.clone())
    }

    /// Build Admin router
    pub fn admin_router(&self) -> Router {
        Router::new()
            .route("/health", get(admin_health))
            .route("/metrics", get(metrics))
            .with_state(self.state.clone())
    }
}

/// Health check endpoint
async fn health_check() -> impl IntoResponse {
    Json(serde_json::json!({
        "status": "healthy",
        "service": "api-gateway",
        "version": env!("CARGO_PKG_VERSION")
    }))
}

/// Admin health: liveness plus what the node can currently answer.
async fn admin_health(State(state): State<AppState>) -> impl IntoResponse {
    let info = state.rpc_handlers.server_info();
    Json(serde_json::json!({
        "status": "healthy",
        "service": "api-gateway",
        "version": info.build_version,
        "complete_ledgers": info.complete_ledgers,
        "read_only": info.read_only,
    }))
}

/// Prometheus text exposition
async fn metrics() -> impl IntoResponse {
    match encode_metrics() {
        Ok(body) => (
            StatusCode::OK,
            [(header::CONTENT_TYPE, "text/plain; version=0.0.4")],
            body,
        ),
        Err(e) => (
            StatusCode::INTERNAL_SERVER_ERROR,
            [(header::CONTENT_TYPE, "text/plain")],
            e.to_string(),
        ),
    }
}
