// SPDX-FileCopyrightText: 2026 Mnemo Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Gateway HTTP server built on axum.

use std::sync::Arc;

use axum::{Router, routing::get};
use mnemo_agent::{AdminService, ChatServices};
use mnemo_config::model::GatewayConfig;
use mnemo_core::MnemoError;
use tokio::net::TcpListener;
use tokio_util::sync::CancellationToken;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use crate::handlers;
use crate::ws;

/// Health state for the unauthenticated health endpoint.
#[derive(Clone)]
pub struct HealthState {
    /// Process start time for uptime calculation.
    pub start_time: std::time::Instant,
}

/// Shared state for axum request handlers.
#[derive(Clone)]
pub struct GatewayState {
    pub chat: Arc<ChatServices>,
    pub admin: Arc<AdminService>,
    pub health: HealthState,
    /// Cancelled on process shutdown; every connection runs on a child token.
    pub shutdown: CancellationToken,
}

impl GatewayState {
    pub fn new(chat: Arc<ChatServices>, admin: Arc<AdminService>, shutdown: CancellationToken) -> Self {
        Self {
            chat,
            admin,
            health: HealthState {
                start_time: std::time::Instant::now(),
            },
            shutdown,
        }
    }
}

/// Bind address of the gateway.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

impl From<&GatewayConfig> for ServerConfig {
    fn from(config: &GatewayConfig) -> Self {
        Self {
            host: config.host.clone(),
            port: config.port,
        }
    }
}

pub fn build_router(state: GatewayState) -> Router {
    Router::new()
        .route("/health", get(handlers::get_health))
        .route("/ws/chat/temp", get(ws::temp_chat_handler))
        .route("/ws/chat/user", get(ws::user_chat_handler))
        .route("/ws/chat/user/continue", get(ws::resume_chat_handler))
        .route("/ws/data", get(ws::data_handler))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}

/// Binds `host:port` and serves until the shutdown token is cancelled.
pub async fn start_server(config: &ServerConfig, state: GatewayState) -> Result<(), MnemoError> {
    let addr = format!("{}:{}", config.host, config.port);
    let listener = TcpListener::bind(&addr)
        .await
        .map_err(|e| MnemoError::Transport {
            message: format!("failed to bind gateway to {addr}: {e}"),
            source: Some(Box::new(e)),
        })?;
    tracing::info!("gateway listening on {addr}");
    serve(listener, state).await
}

/// Serves on an already-bound listener until the shutdown token is cancelled.
pub async fn serve(listener: TcpListener, state: GatewayState) -> Result<(), MnemoError> {
    let shutdown = state.shutdown.clone();
    let app = build_router(state);
    axum::serve(listener, app)
        .with_graceful_shutdown(async move { shutdown.cancelled().await })
        .await
        .map_err(|e| MnemoError::Transport {
            message: format!("gateway server error: {e}"),
            source: Some(Box::new(e)),
        })?;
    tracing::info!("gateway stopped");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use axum::http::{Request, StatusCode};
    use mnemo_test_utils::TestHarness;
    use tower::ServiceExt;

    async fn state(harness: &TestHarness) -> GatewayState {
        let chat = Arc::new(ChatServices {
            assembler: harness.assembler.clone(),
            storage: harness.storage_dyn(),
            provider: harness.provider_dyn(),
            model_timeout: std::time::Duration::from_secs(5),
            max_tokens: None,
        });
        let admin = Arc::new(AdminService::new(
            harness.storage_dyn(),
            harness.embedder_dyn(),
            harness.store_dyn(),
            harness.summarizer.clone(),
        ));
        GatewayState::new(chat, admin, CancellationToken::new())
    }

    #[tokio::test]
    async fn health_reports_ok() {
        let harness = TestHarness::new().await.unwrap();
        let app = build_router(state(&harness).await);

        let response = app
            .oneshot(Request::get("/health").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn plain_get_on_ws_route_is_rejected() {
        let harness = TestHarness::new().await.unwrap();
        let app = build_router(state(&harness).await);

        let response = app
            .oneshot(Request::get("/ws/chat/temp").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert!(response.status().is_client_error());
    }

    #[test]
    fn server_config_from_gateway_config() {
        let config = ServerConfig::from(&GatewayConfig::default());
        assert_eq!(config.host, "127.0.0.1");
        assert_eq!(config.port, 8080);
    }
}
