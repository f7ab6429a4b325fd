//! Wire and storage types shared by every client platform.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fmt;
use std::str::FromStr;

use crate::error::{ChatError, ChatResult};

/// Chat mode of a room
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ChatMode {
    /// One model, one conversation
    #[serde(rename = "sm")]
    Single,
    /// Two models answering the same prompts side by side
    #[serde(rename = "cm")]
    Comparison,
}

impl ChatMode {
    /// URL segment for this mode
    pub fn as_str(&self) -> &'static str {
        match self {
            ChatMode::Single => "sm",
            ChatMode::Comparison => "cm",
        }
    }
}

impl fmt::Display for ChatMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ChatMode {
    type Err = ChatError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "sm" => Ok(ChatMode::Single),
            "cm" => Ok(ChatMode::Comparison),
            other => Err(ChatError::InvalidPayload(format!("unknown chat mode: {}", other))),
        }
    }
}

/// Author of a rendered message
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Assistant,
}

impl Role {
    /// CSS class selecting the visual style of a message node
    pub fn css_class(&self) -> &'static str {
        match self {
            Role::User => "usr-message",
            Role::Assistant => "assistant-message",
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Role::User => "user",
            Role::Assistant => "assistant",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One conversation of a room, bound to a single model
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConversationEntry {
    pub id: String,
    pub model: String,
    /// Everything else the server sent along (history, timestamps, ...)
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl ConversationEntry {
    pub fn new(id: impl Into<String>, model: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            model: model.into(),
            extra: Map::new(),
        }
    }
}

/// Descriptor of the last created room or conversation.
///
/// Wraps the body the server answered a creation request with. The body is
/// kept as received and is what gets persisted; `id` and `conversations` are
/// read out of it for routing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "Value", into = "Value")]
pub struct RoomDescriptor {
    id: String,
    conversations: Vec<ConversationEntry>,
    body: Value,
}

impl RoomDescriptor {
    pub fn new(id: impl Into<String>) -> Self {
        let id = id.into();
        let mut body = Map::new();
        body.insert("id".to_string(), Value::String(id.clone()));

        Self {
            id,
            conversations: Vec::new(),
            body: Value::Object(body),
        }
    }

    /// Add a conversation entry
    pub fn conversation(mut self, entry: ConversationEntry) -> Self {
        let mut object = entry.extra.clone();
        object.insert("id".to_string(), Value::String(entry.id.clone()));
        object.insert("model".to_string(), Value::String(entry.model.clone()));

        if let Value::Object(body) = &mut self.body {
            match body
                .entry("conversations")
                .or_insert_with(|| Value::Array(Vec::new()))
            {
                Value::Array(list) => list.push(Value::Object(object)),
                other => *other = Value::Array(vec![Value::Object(object)]),
            }
        }

        self.conversations.push(entry);
        self
    }

    /// Room id, or the conversation id for single-conversation creation
    pub fn id(&self) -> &str {
        &self.id
    }

    /// Conversations of a room, empty for a single conversation
    pub fn conversations(&self) -> &[ConversationEntry] {
        &self.conversations
    }

    /// The body as the server sent it
    pub fn as_json(&self) -> &Value {
        &self.body
    }

    /// Decode a creation response body.
    ///
    /// The id is `id` when that is a non-empty string, else
    /// `conversation_id`. Fails with [`ChatError::MissingIdentifier`] when
    /// neither is.
    pub fn from_response(body: Value) -> ChatResult<Self> {
        let id = ["id", "conversation_id"]
            .iter()
            .filter_map(|field| body.get(field).and_then(Value::as_str))
            .find(|id| !id.is_empty())
            .map(str::to_string)
            .ok_or(ChatError::MissingIdentifier)?;

        let conversations = match body.get("conversations") {
            None | Some(Value::Null) => Vec::new(),
            Some(list) => serde_json::from_value(list.clone())?,
        };

        Ok(Self {
            id,
            conversations,
            body,
        })
    }
}

impl TryFrom<Value> for RoomDescriptor {
    type Error = ChatError;

    fn try_from(body: Value) -> ChatResult<Self> {
        Self::from_response(body)
    }
}

impl From<RoomDescriptor> for Value {
    fn from(descriptor: RoomDescriptor) -> Self {
        descriptor.body
    }
}

/// JSON frame delivered on room sockets
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InboundFrame {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub conversation_id: Option<String>,
    pub response: String,
}
