//! WebSocket Handlers
//!
//! One socket per conversation. Every text frame is a prompt; the reply goes
//! back on the same socket before the next frame is read.

use axum::{
    extract::{
        ws::{CloseFrame, Message, WebSocket, WebSocketUpgrade},
        Path, State,
    },
    response::{IntoResponse, Response},
};
use std::sync::Arc;

use super::error::BackendError;
use super::routes::parse_mode;
use super::state::{BackendState, ChatTarget};
use crate::protocol::InboundFrame;

/// Close code for a conversation the server cannot serve
const CLOSE_INTERNAL_ERROR: u16 = 1011;

/// `GET /ws/conversation/{conversation_id}`: plain text both ways
pub async fn conversation_socket(
    ws: WebSocketUpgrade,
    Path(conversation_id): Path<String>,
    State(state): State<Arc<BackendState>>,
) -> Response {
    let target = ChatTarget::Conversation {
        id: conversation_id,
    };
    ws.on_upgrade(move |socket| handle_socket(socket, state, target, Reply::Text))
}

/// `GET /ws/room/{mode}/{room_id}/{conversation_id}`: replies as JSON frames
pub async fn room_socket(
    ws: WebSocketUpgrade,
    Path((mode, room_id, conversation_id)): Path<(String, String, String)>,
    State(state): State<Arc<BackendState>>,
) -> Response {
    if let Err(e) = parse_mode(&mode) {
        return e.into_response();
    }

    let target = ChatTarget::Room {
        room_id,
        conversation_id,
    };
    ws.on_upgrade(move |socket| handle_socket(socket, state, target, Reply::Frame))
}

#[derive(Debug, Clone, Copy)]
enum Reply {
    Text,
    Frame,
}

/// Handle an established WebSocket connection
async fn handle_socket(
    mut socket: WebSocket,
    state: Arc<BackendState>,
    target: ChatTarget,
    reply: Reply,
) {
    tracing::info!(target = ?target, "WebSocket connected");

    while let Some(result) = socket.recv().await {
        let prompt = match result {
            Ok(Message::Text(text)) => text,
            Ok(Message::Close(_)) => break,
            Ok(_) => continue,
            Err(e) => {
                tracing::debug!(target = ?target, error = %e, "WebSocket receive error");
                break;
            }
        };

        let outgoing = match state.chat(&target, &prompt).await {
            Ok(response) => encode(&target, reply, response),
            Err(e) => Err(e),
        };

        match outgoing {
            Ok(text) => {
                if socket.send(Message::Text(text)).await.is_err() {
                    tracing::debug!(target = ?target, "WebSocket send failed, closing connection");
                    break;
                }
            }
            Err(e) => {
                tracing::error!(target = ?target, error = %e, "Closing socket");
                let _ = socket
                    .send(Message::Close(Some(CloseFrame {
                        code: CLOSE_INTERNAL_ERROR,
                        reason: e.to_string().into(),
                    })))
                    .await;
                break;
            }
        }
    }

    tracing::info!(target = ?target, "Client disconnected");
}

fn encode(target: &ChatTarget, reply: Reply, response: String) -> Result<String, BackendError> {
    match (reply, target) {
        (Reply::Frame, ChatTarget::Room { conversation_id, .. }) => {
            let frame = InboundFrame {
                conversation_id: Some(conversation_id.clone()),
                response,
            };
            serde_json::to_string(&frame).map_err(|e| BackendError::Internal(e.to_string()))
        }
        _ => Ok(response),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_room_replies_are_frames() {
        let target = ChatTarget::Room {
            room_id: "r1".to_string(),
            conversation_id: "c1".to_string(),
        };

        let text = encode(&target, Reply::Frame, "hi".to_string()).unwrap();
        let frame: InboundFrame = serde_json::from_str(&text).unwrap();

        assert_eq!(frame.response, "hi");
        assert_eq!(frame.conversation_id.as_deref(), Some("c1"));
    }

    #[test]
    fn test_conversation_replies_are_plain() {
        let target = ChatTarget::Conversation { id: "c".to_string() };
        assert_eq!(encode(&target, Reply::Text, "hi".to_string()).unwrap(), "hi");
    }
}
