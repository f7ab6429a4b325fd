//! Backend State
//!
//! Rooms and conversations live in memory for the lifetime of the process.
//! Shared by all handlers behind an `Arc`.

use chrono::{DateTime, Utc};
use serde::Serialize;
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Instant;
use tokio::sync::RwLock;

use super::error::{BackendError, BackendResult};
use super::responder::{Responder, FALLBACK_RESPONSE};
use crate::config::BackendConfig;
use crate::protocol::{ChatMode, Role};

/// One turn of a conversation
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StoredMessage {
    pub role: Role,
    pub content: String,
}

impl StoredMessage {
    pub fn new(role: Role, content: impl Into<String>) -> Self {
        Self {
            role,
            content: content.into(),
        }
    }
}

/// A conversation with one model
#[derive(Debug, Clone, Serialize)]
pub struct Conversation {
    pub id: String,
    pub model: String,
    pub messages: Vec<StoredMessage>,
    #[serde(rename = "createdAt")]
    pub created_at: DateTime<Utc>,
}

impl Conversation {
    fn new(model: &str) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            model: model.to_string(),
            messages: Vec::new(),
            created_at: Utc::now(),
        }
    }
}

/// Conversations created together by one `POST /room/{mode}`
#[derive(Debug, Clone, Serialize)]
pub struct Room {
    pub id: String,
    pub conversations: Vec<Conversation>,
}

/// Which conversation a socket talks to
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChatTarget {
    /// Conversation created by `POST /conversation`
    Conversation { id: String },
    /// Conversation inside a room
    Room {
        room_id: String,
        conversation_id: String,
    },
}

/// Shared state for all handlers
pub struct BackendState {
    pub config: Arc<BackendConfig>,
    pub start_time: Instant,
    responder: Arc<dyn Responder>,
    generations: AtomicU64,
    failed_generations: AtomicU64,
    rooms: RwLock<HashMap<String, Room>>,
    conversations: RwLock<HashMap<String, Conversation>>,
}

impl BackendState {
    pub fn new(config: BackendConfig, responder: Arc<dyn Responder>) -> Self {
        Self {
            config: Arc::new(config),
            start_time: Instant::now(),
            responder,
            generations: AtomicU64::new(0),
            failed_generations: AtomicU64::new(0),
            rooms: RwLock::new(HashMap::new()),
            conversations: RwLock::new(HashMap::new()),
        }
    }

    /// Get server uptime in seconds
    pub fn uptime_seconds(&self) -> u64 {
        self.start_time.elapsed().as_secs()
    }

    /// Responder calls so far, failed ones included
    pub fn generation_count(&self) -> u64 {
        self.generations.load(Ordering::Relaxed)
    }

    pub fn failed_generation_count(&self) -> u64 {
        self.failed_generations.load(Ordering::Relaxed)
    }

    pub async fn room_count(&self) -> usize {
        self.rooms.read().await.len()
    }

    pub async fn conversation_count(&self) -> usize {
        self.conversations.read().await.len()
    }

    /// Create a standalone conversation with the first model
    pub async fn create_conversation(&self) -> BackendResult<String> {
        if self.config.model1.is_empty() {
            return Err(BackendError::ModelNotConfigured("Model is not configured"));
        }

        let conversation = Conversation::new(&self.config.model1);
        let id = conversation.id.clone();
        self.conversations.write().await.insert(id.clone(), conversation);

        tracing::info!(conversation_id = %id, "Conversation created");
        Ok(id)
    }

    /// Create a room: one conversation in single mode, two in comparison mode
    pub async fn create_room(&self, mode: ChatMode) -> BackendResult<Room> {
        let models = match mode {
            ChatMode::Single => {
                if self.config.model1.is_empty() {
                    return Err(BackendError::ModelNotConfigured("Model is not configured"));
                }
                vec![self.config.model1.as_str()]
            }
            ChatMode::Comparison => {
                if self.config.model1.is_empty() || self.config.model2.is_empty() {
                    return Err(BackendError::ModelNotConfigured(
                        "One of the models is not configured",
                    ));
                }
                vec![self.config.model1.as_str(), self.config.model2.as_str()]
            }
        };

        let room = Room {
            id: uuid::Uuid::new_v4().to_string(),
            conversations: models.into_iter().map(Conversation::new).collect(),
        };
        self.rooms.write().await.insert(room.id.clone(), room.clone());

        tracing::info!(room_id = %room.id, mode = %mode, "Room created");
        Ok(room)
    }

    /// Run one chat turn: record the prompt, ask the responder, record and
    /// return the reply. A responder failure is answered with
    /// [`FALLBACK_RESPONSE`].
    pub async fn chat(&self, target: &ChatTarget, prompt: &str) -> BackendResult<String> {
        let (model, history) = self
            .update(target, |conversation| {
                conversation
                    .messages
                    .push(StoredMessage::new(Role::User, prompt));
                (conversation.model.clone(), conversation.messages.clone())
            })
            .await?;

        let started = Instant::now();
        let result = self.responder.respond(&model, &history).await;
        let duration_ms = started.elapsed().as_millis() as u64;
        self.generations.fetch_add(1, Ordering::Relaxed);

        let reply = match result {
            Ok(reply) => {
                tracing::info!(
                    model = %model,
                    prompt_chars = prompt.chars().count(),
                    history_len = history.len(),
                    reply_chars = reply.chars().count(),
                    duration_ms,
                    "Generation finished"
                );
                reply
            }
            Err(e) => {
                self.failed_generations.fetch_add(1, Ordering::Relaxed);
                tracing::error!(
                    model = %model,
                    prompt_chars = prompt.chars().count(),
                    duration_ms,
                    error = %e,
                    "Responder failed"
                );
                FALLBACK_RESPONSE.to_string()
            }
        };

        self.update(target, |conversation| {
            conversation
                .messages
                .push(StoredMessage::new(Role::Assistant, reply.clone()));
        })
        .await?;

        Ok(reply)
    }

    /// History of a conversation
    pub async fn messages(&self, target: &ChatTarget) -> BackendResult<Vec<StoredMessage>> {
        self.update(target, |conversation| conversation.messages.clone())
            .await
    }

    async fn update<T>(
        &self,
        target: &ChatTarget,
        f: impl FnOnce(&mut Conversation) -> T,
    ) -> BackendResult<T> {
        match target {
            ChatTarget::Conversation { id } => {
                let mut conversations = self.conversations.write().await;
                let conversation = conversations.get_mut(id).ok_or_else(|| BackendError::NotFound {
                    kind: "Conversation",
                    id: id.clone(),
                })?;
                Ok(f(conversation))
            }
            ChatTarget::Room {
                room_id,
                conversation_id,
            } => {
                let mut rooms = self.rooms.write().await;
                let room = rooms.get_mut(room_id).ok_or_else(|| BackendError::NotFound {
                    kind: "Room",
                    id: room_id.clone(),
                })?;
                let conversation = room
                    .conversations
                    .iter_mut()
                    .find(|c| &c.id == conversation_id)
                    .ok_or_else(|| BackendError::NotFound {
                        kind: "Conversation",
                        id: conversation_id.clone(),
                    })?;
                Ok(f(conversation))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::responder::{EchoResponder, ResponderError};
    use async_trait::async_trait;

    struct FailingResponder;

    #[async_trait]
    impl Responder for FailingResponder {
        async fn respond(&self, model: &str, _: &[StoredMessage]) -> Result<String, ResponderError> {
            Err(ResponderError::EmptyOutput(model.to_string()))
        }
    }

    fn echo_state() -> BackendState {
        BackendState::new(BackendConfig::default(), Arc::new(EchoResponder))
    }

    #[tokio::test]
    async fn test_room_sizes_follow_mode() {
        let state = echo_state();

        let single = state.create_room(ChatMode::Single).await.unwrap();
        let comparison = state.create_room(ChatMode::Comparison).await.unwrap();

        assert_eq!(single.conversations.len(), 1);
        assert_eq!(comparison.conversations.len(), 2);
        assert_eq!(comparison.conversations[0].model, "echo-small");
        assert_eq!(comparison.conversations[1].model, "echo-large");
        assert_eq!(state.room_count().await, 2);
    }

    #[tokio::test]
    async fn test_comparison_needs_both_models() {
        let config = BackendConfig {
            model2: String::new(),
            ..Default::default()
        };
        let state = BackendState::new(config, Arc::new(EchoResponder));

        assert!(state.create_room(ChatMode::Single).await.is_ok());
        assert!(matches!(
            state.create_room(ChatMode::Comparison).await,
            Err(BackendError::ModelNotConfigured(_))
        ));
    }

    #[tokio::test]
    async fn test_chat_records_both_turns() {
        let state = echo_state();
        let room = state.create_room(ChatMode::Comparison).await.unwrap();
        let target = ChatTarget::Room {
            room_id: room.id.clone(),
            conversation_id: room.conversations[1].id.clone(),
        };

        let reply = state.chat(&target, "ping").await.unwrap();

        assert_eq!(reply, "ping");
        assert_eq!(
            state.messages(&target).await.unwrap(),
            vec![
                StoredMessage::new(Role::User, "ping"),
                StoredMessage::new(Role::Assistant, "ping"),
            ]
        );
        assert_eq!(state.generation_count(), 1);
        assert_eq!(state.failed_generation_count(), 0);
    }

    #[tokio::test]
    async fn test_responder_failure_answers_fallback() {
        let state = BackendState::new(BackendConfig::default(), Arc::new(FailingResponder));
        let id = state.create_conversation().await.unwrap();
        let target = ChatTarget::Conversation { id };

        let reply = state.chat(&target, "hello").await.unwrap();

        assert_eq!(reply, FALLBACK_RESPONSE);
        assert_eq!(state.messages(&target).await.unwrap().len(), 2);
        assert_eq!(state.generation_count(), 1);
        assert_eq!(state.failed_generation_count(), 1);
    }

    #[tokio::test]
    async fn test_unknown_targets() {
        let state = echo_state();
        let room = state.create_room(ChatMode::Single).await.unwrap();

        for target in [
            ChatTarget::Conversation { id: "nope".to_string() },
            ChatTarget::Room {
                room_id: "nope".to_string(),
                conversation_id: room.conversations[0].id.clone(),
            },
            ChatTarget::Room {
                room_id: room.id.clone(),
                conversation_id: "nope".to_string(),
            },
        ] {
            assert!(matches!(
                state.chat(&target, "x").await,
                Err(BackendError::NotFound { .. })
            ));
        }
        assert_eq!(state.generation_count(), 0);
    }
}
