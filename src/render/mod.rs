//! Message Rendering
//!
//! The [`Renderer`] capability lets the session append message nodes without
//! knowing what draws them. Containers are addressed through an explicit
//! [`ContainerKey`], one per conversation (or the single container of a
//! conversation page).
//!
//! Implementations:
//! - [`MemoryRenderer`]: keeps the node tree in memory
//! - [`TerminalRenderer`]: writes transcript lines (native only)
//! - the signal-backed DOM renderer of the web client

#[cfg(feature = "native")]
mod terminal;

#[cfg(feature = "native")]
pub use terminal::TerminalRenderer;

use std::fmt;

use crate::error::{ChatError, ChatResult};
use crate::protocol::Role;

/// Address of a message container
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum ContainerKey {
    /// The one container of a `/conversation/{id}` page
    Single,
    /// Container of one room conversation
    Conversation(String),
}

impl fmt::Display for ContainerKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ContainerKey::Single => f.write_str("chat"),
            ContainerKey::Conversation(id) => write!(f, "conversation {}", id),
        }
    }
}

/// Something that can display chat messages
pub trait Renderer {
    /// Register a container. `label` is shown as its heading (the model name).
    fn open_container(&mut self, key: &ContainerKey, label: &str);

    /// Append one message node to a container.
    ///
    /// Fails with [`ChatError::UnknownContainer`] if `key` was never opened.
    fn append_message(&mut self, key: &ContainerKey, text: &str, role: Role) -> ChatResult<()>;

    /// Show or hide the input area
    fn set_input_visible(&mut self, visible: bool);
}

/// A message node as rendered
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderedMessage {
    pub text: String,
    pub role: Role,
}

impl RenderedMessage {
    pub fn css_class(&self) -> &'static str {
        self.role.css_class()
    }
}

/// A container and the nodes appended to it
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Container {
    pub key: ContainerKey,
    pub label: String,
    pub messages: Vec<RenderedMessage>,
}

/// In-memory node tree
#[derive(Debug, Default)]
pub struct MemoryRenderer {
    containers: Vec<Container>,
    input_visible: bool,
}

impl MemoryRenderer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn containers(&self) -> &[Container] {
        &self.containers
    }

    pub fn input_visible(&self) -> bool {
        self.input_visible
    }

    /// Messages of one container, empty if it does not exist
    pub fn messages(&self, key: &ContainerKey) -> &[RenderedMessage] {
        self.containers
            .iter()
            .find(|c| &c.key == key)
            .map(|c| c.messages.as_slice())
            .unwrap_or(&[])
    }

    /// Number of nodes with `role` across all containers
    pub fn count(&self, role: Role) -> usize {
        self.containers
            .iter()
            .flat_map(|c| c.messages.iter())
            .filter(|m| m.role == role)
            .count()
    }
}

impl Renderer for MemoryRenderer {
    fn open_container(&mut self, key: &ContainerKey, label: &str) {
        if self.containers.iter().any(|c| &c.key == key) {
            return;
        }
        self.containers.push(Container {
            key: key.clone(),
            label: label.to_string(),
            messages: Vec::new(),
        });
    }

    fn append_message(&mut self, key: &ContainerKey, text: &str, role: Role) -> ChatResult<()> {
        let container = self
            .containers
            .iter_mut()
            .find(|c| &c.key == key)
            .ok_or_else(|| ChatError::UnknownContainer(key.to_string()))?;

        container.messages.push(RenderedMessage {
            text: text.to_string(),
            role,
        });
        Ok(())
    }

    fn set_input_visible(&mut self, visible: bool) {
        self.input_visible = visible;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_append_goes_to_matching_container_only() {
        let mut renderer = MemoryRenderer::new();
        let a = ContainerKey::Conversation("a".to_string());
        let ab = ContainerKey::Conversation("ab".to_string());
        renderer.open_container(&a, "small");
        renderer.open_container(&ab, "large");

        renderer.append_message(&ab, "hello", Role::Assistant).unwrap();

        assert!(renderer.messages(&a).is_empty());
        assert_eq!(renderer.messages(&ab).len(), 1);
        assert_eq!(renderer.messages(&ab)[0].css_class(), "assistant-message");
    }

    #[test]
    fn test_unknown_container() {
        let mut renderer = MemoryRenderer::new();
        let result = renderer.append_message(&ContainerKey::Single, "x", Role::User);
        assert!(matches!(result, Err(ChatError::UnknownContainer(_))));
        assert_eq!(renderer.count(Role::User), 0);
    }

    #[test]
    fn test_reopening_keeps_messages() {
        let mut renderer = MemoryRenderer::new();
        renderer.open_container(&ContainerKey::Single, "");
        renderer
            .append_message(&ContainerKey::Single, "kept", Role::User)
            .unwrap();
        renderer.open_container(&ContainerKey::Single, "");

        assert_eq!(renderer.containers().len(), 1);
        assert_eq!(renderer.messages(&ContainerKey::Single).len(), 1);
    }
}
