//! `RelayServer`: Axum HTTP + WebSocket server.

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Instant;

use axum::Router;
use axum::extract::ws::WebSocketUpgrade;
use axum::extract::ws::rejection::WebSocketUpgradeRejection;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Json, Response};
use axum::routing::get;
use metrics_exporter_prometheus::PrometheusHandle;
use relay_store::{InMemoryDirectory, InMemoryMessageLog};
use serde_json::{Value, json};
use tokio::net::TcpListener;
use tokio::task::JoinHandle;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::{error, info, warn};

use crate::config::ServerConfig;
use crate::errors::ApiError;
use crate::health::{self, HealthResponse};
use crate::routes;
use crate::service::RelayService;
use crate::shutdown::ShutdownCoordinator;
use crate::websocket::identity::{ClientIdentity, ClientRole};
use crate::websocket::registry::ConnectionRegistry;
use crate::websocket::session::run_session;

/// Shared state accessible from Axum handlers.
#[derive(Clone)]
pub struct AppState {
    /// Relay operations.
    pub service: Arc<RelayService>,
    /// Server configuration.
    pub config: Arc<ServerConfig>,
    /// When the server started.
    pub start_time: Instant,
    /// Prometheus handle for `/metrics`, when a recorder is installed.
    pub metrics: Option<PrometheusHandle>,
}

/// The relay server.
pub struct RelayServer {
    config: Arc<ServerConfig>,
    service: Arc<RelayService>,
    shutdown: ShutdownCoordinator,
    metrics: Option<PrometheusHandle>,
    start_time: Instant,
}

impl RelayServer {
    /// Create a server around an existing service.
    pub fn new(
        config: ServerConfig,
        service: RelayService,
        metrics: Option<PrometheusHandle>,
    ) -> Self {
        Self {
            config: Arc::new(config),
            service: Arc::new(service),
            shutdown: ShutdownCoordinator::new(),
            metrics,
            start_time: Instant::now(),
        }
    }

    /// Create a server backed by empty in-memory stores.
    pub fn in_memory(config: ServerConfig, metrics: Option<PrometheusHandle>) -> Self {
        let service = RelayService::new(
            Arc::new(InMemoryDirectory::new()),
            Arc::new(InMemoryMessageLog::new()),
            Arc::new(ConnectionRegistry::new()),
        );
        Self::new(config, service, metrics)
    }

    /// Build the Axum router with all routes.
    pub fn router(&self) -> Router {
        let state = AppState {
            service: self.service.clone(),
            config: self.config.clone(),
            start_time: self.start_time,
            metrics: self.metrics.clone(),
        };

        Router::new()
            .route("/", get(root_handler))
            .route("/healthz", get(health_handler))
            .route("/metrics", get(metrics_handler))
            .route("/ws/{client_type}/{client_id}", get(ws_handler))
            .nest("/api", routes::api_router())
            .with_state(state)
            .layer(TraceLayer::new_for_http())
            .layer(CorsLayer::permissive())
    }

    /// Bind the configured address and serve until shutdown is signalled.
    ///
    /// Returns the bound address (useful with port `0`) and the server task.
    pub async fn listen(&self) -> std::io::Result<(SocketAddr, JoinHandle<()>)> {
        let listener = TcpListener::bind(self.config.bind_addr()).await?;
        let addr = listener.local_addr()?;
        let router = self.router();
        let token = self.shutdown.token();
        info!(%addr, "relay server listening");

        let handle = tokio::spawn(async move {
            let result = axum::serve(listener, router)
                .with_graceful_shutdown(token.cancelled_owned())
                .await;
            if let Err(e) = result {
                error!(error = %e, "server terminated with error");
            }
            info!("relay server stopped");
        });
        Ok((addr, handle))
    }

    /// The relay service.
    pub fn service(&self) -> &Arc<RelayService> {
        &self.service
    }

    /// The shutdown coordinator.
    pub fn shutdown(&self) -> &ShutdownCoordinator {
        &self.shutdown
    }

    /// The server configuration.
    pub fn config(&self) -> &ServerConfig {
        &self.config
    }
}

/// GET /
async fn root_handler() -> Json<Value> {
    Json(json!({
        "message": "Officer Distress Messaging API",
        "status": "active",
    }))
}

/// GET /healthz
async fn health_handler(State(state): State<AppState>) -> Json<HealthResponse> {
    Json(health::health_check(
        state.start_time,
        state.service.registry(),
    ))
}

/// GET /metrics
async fn metrics_handler(State(state): State<AppState>) -> Response {
    match state.metrics {
        Some(ref handle) => crate::metrics::render(handle).into_response(),
        None => StatusCode::NOT_FOUND.into_response(),
    }
}

/// GET /ws/{client_type}/{client_id}
async fn ws_handler(
    Path((client_type, client_id)): Path<(String, String)>,
    State(state): State<AppState>,
    ws: Result<WebSocketUpgrade, WebSocketUpgradeRejection>,
) -> Response {
    let role: ClientRole = match client_type.parse() {
        Ok(role) => role,
        Err(msg) => {
            warn!(%client_type, %client_id, "rejected websocket for unknown client type");
            return ApiError::BadRequest(msg).into_response();
        }
    };
    let ws = match ws {
        Ok(ws) => ws,
        Err(rejection) => return rejection.into_response(),
    };

    let identity = ClientIdentity::new(role, client_id);
    let service = state.service.clone();
    let capacity = state.config.send_queue_capacity;
    ws.max_message_size(state.config.max_message_size)
        .on_upgrade(move |socket| run_session(socket, identity, service, capacity))
}
