//! Development Backend
//!
//! Serves the REST and WebSocket contract the chat clients talk to, with
//! replies produced by a pluggable [`Responder`].
//!
//! # Endpoints
//!
//! ## Creation
//! - `POST /conversation` - Standalone conversation
//! - `POST /room/{mode}` - Room of one (`sm`) or two (`cm`) conversations
//!
//! ## Pages
//! - `GET /conversation/{id}` - Page shell
//! - `GET /room/{mode}/{room_id}` - Page shell
//!
//! ## WebSocket
//! - `GET /ws/conversation/{conversation_id}` - Plain text chat
//! - `GET /ws/room/{mode}/{room_id}/{conversation_id}` - JSON replies
//!
//! ## Health
//! - `GET /health` - Uptime, counts and generation totals
//!
//! Anything else is served from the static directory (the web client bundle).

pub mod error;
pub mod responder;
pub mod routes;
pub mod socket;
pub mod state;

pub use error::{BackendError, BackendResult};
pub use responder::{EchoResponder, Responder, ResponderError, FALLBACK_RESPONSE};
pub use state::{BackendState, ChatTarget, Conversation, Room, StoredMessage};

use axum::{
    routing::{get, post},
    Router,
};
use std::sync::Arc;
use tower_http::{cors::CorsLayer, services::ServeDir, trace::TraceLayer};

use crate::config::BackendConfig;

/// Build the router with all routes and middleware
pub fn build_router(state: BackendState) -> Router {
    let static_dir = ServeDir::new(&state.config.static_dir);
    let shared_state = Arc::new(state);

    Router::new()
        // Creation routes
        .route("/conversation", post(routes::create_conversation))
        .route("/room/:mode", post(routes::create_room))
        // Page routes
        .route("/conversation/:conversation_id", get(routes::page))
        .route("/room/:mode/:room_id", get(routes::page))
        // WebSocket routes
        .route(
            "/ws/conversation/:conversation_id",
            get(socket::conversation_socket),
        )
        .route(
            "/ws/room/:mode/:room_id/:conversation_id",
            get(socket::room_socket),
        )
        .route("/health", get(routes::health))
        .fallback_service(static_dir)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(shared_state)
}

/// Start the backend
pub async fn serve(state: BackendState, config: &BackendConfig) -> Result<(), BackendError> {
    let router = build_router(state);

    let addr = config.addr();
    let listener = tokio::net::TcpListener::bind(&addr).await?;

    tracing::info!("mmchat backend listening on {}", addr);

    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .map_err(|e| BackendError::Internal(format!("Server error: {}", e)))?;

    tracing::info!("mmchat backend shut down gracefully");
    Ok(())
}

/// Wait for shutdown signal
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "Failed to install Ctrl+C handler");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "Failed to install signal handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    tracing::info!("Shutdown signal received, starting graceful shutdown");
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{
        body::{to_bytes, Body},
        http::{Request, StatusCode},
    };
    use serde_json::Value;
    use tower::util::ServiceExt;

    fn create_test_app(config: BackendConfig) -> Router {
        build_router(BackendState::new(config, Arc::new(EchoResponder)))
    }

    async fn post(app: Router, uri: &str) -> (StatusCode, Value) {
        let response = app
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri(uri)
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        (status, serde_json::from_slice(&bytes).unwrap_or(Value::Null))
    }

    #[tokio::test]
    async fn test_create_conversation() {
        let (status, body) = post(create_test_app(BackendConfig::default()), "/conversation").await;

        assert_eq!(status, StatusCode::OK);
        assert!(body["conversation_id"].as_str().is_some_and(|id| !id.is_empty()));
    }

    #[tokio::test]
    async fn test_create_single_room() {
        let (status, body) = post(create_test_app(BackendConfig::default()), "/room/sm").await;

        assert_eq!(status, StatusCode::CREATED);
        assert!(body["id"].is_string());
        let conversations = body["conversations"].as_array().unwrap();
        assert_eq!(conversations.len(), 1);
        assert_eq!(conversations[0]["model"], "echo-small");
        assert!(conversations[0]["createdAt"].is_string());
    }

    #[tokio::test]
    async fn test_create_comparison_room() {
        let (status, body) = post(create_test_app(BackendConfig::default()), "/room/cm").await;

        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(body["conversations"].as_array().unwrap().len(), 2);
    }

    #[tokio::test]
    async fn test_unknown_mode() {
        let (status, body) = post(create_test_app(BackendConfig::default()), "/room/xx").await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["status"], "error");
    }

    #[tokio::test]
    async fn test_unconfigured_model() {
        let config = BackendConfig {
            model1: String::new(),
            ..Default::default()
        };
        let (status, body) = post(create_test_app(config), "/room/sm").await;

        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body["error"], "Model is not configured");
    }

    #[tokio::test]
    async fn test_page_shell() {
        let dir = tempfile::tempdir().unwrap();
        let config = BackendConfig {
            static_dir: dir.path().to_string_lossy().to_string(),
            ..Default::default()
        };

        let missing = create_test_app(config.clone())
            .oneshot(
                Request::builder()
                    .uri("/room/cm/abc")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(missing.status(), StatusCode::NOT_FOUND);

        std::fs::write(dir.path().join("index.html"), "<html>chat</html>").unwrap();
        let found = create_test_app(config)
            .oneshot(
                Request::builder()
                    .uri("/conversation/abc")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(found.status(), StatusCode::OK);
        let bytes = to_bytes(found.into_body(), usize::MAX).await.unwrap();
        assert_eq!(&bytes[..], b"<html>chat</html>");
    }

    #[tokio::test]
    async fn test_health() {
        let response = create_test_app(BackendConfig::default())
            .oneshot(
                Request::builder()
                    .uri("/health")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let health: Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(health["status"], "ok");
        assert_eq!(health["generations"], 0);
        assert_eq!(health["failed_generations"], 0);
    }
}
