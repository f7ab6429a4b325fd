//! REST and page handlers.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{Html, IntoResponse, Response},
    Json,
};
use serde::Serialize;
use std::sync::Arc;

use super::error::{BackendError, BackendResult};
use super::state::{BackendState, Room};
use crate::protocol::ChatMode;

#[derive(Serialize)]
pub struct ConversationCreated {
    pub conversation_id: String,
}

#[derive(Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub uptime_seconds: u64,
    pub rooms: usize,
    pub conversations: usize,
    pub generations: u64,
    pub failed_generations: u64,
}

/// `POST /conversation`
pub async fn create_conversation(
    State(state): State<Arc<BackendState>>,
) -> BackendResult<Json<ConversationCreated>> {
    let conversation_id = state.create_conversation().await?;
    Ok(Json(ConversationCreated { conversation_id }))
}

/// `POST /room/{mode}`
pub async fn create_room(
    State(state): State<Arc<BackendState>>,
    Path(mode): Path<String>,
) -> BackendResult<(StatusCode, Json<Room>)> {
    let mode = parse_mode(&mode)?;
    let room = state.create_room(mode).await?;
    Ok((StatusCode::CREATED, Json(room)))
}

/// `GET /conversation/{id}` and `GET /room/{mode}/{room_id}`: the page shell.
///
/// The client reads the path itself, so every page gets the same document.
pub async fn page(State(state): State<Arc<BackendState>>) -> Response {
    let index = std::path::Path::new(&state.config.static_dir).join("index.html");

    match tokio::fs::read_to_string(&index).await {
        Ok(html) => Html(html).into_response(),
        Err(e) => {
            tracing::warn!(path = ?index, error = %e, "Page shell not available");
            (
                StatusCode::NOT_FOUND,
                Html("<html><head><title>Not Found</title></head><body><h1>Index.html not found</h1></body></html>"),
            )
                .into_response()
        }
    }
}

/// `GET /health`
pub async fn health(State(state): State<Arc<BackendState>>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        uptime_seconds: state.uptime_seconds(),
        rooms: state.room_count().await,
        conversations: state.conversation_count().await,
        generations: state.generation_count(),
        failed_generations: state.failed_generation_count(),
    })
}

pub(super) fn parse_mode(mode: &str) -> BackendResult<ChatMode> {
    mode.parse()
        .map_err(|_| BackendError::Validation(format!("unknown chat mode: {}", mode)))
}
