//! Chat View State
//!
//! Reactive state the chat panes render from, and the [`Renderer`] that
//! writes into it.

use leptos::*;
use mmchat::error::{ChatError, ChatResult};
use mmchat::protocol::Role;
use mmchat::render::{Container, ContainerKey, RenderedMessage, Renderer};

/// View state shared by the chat components
#[derive(Clone, Copy)]
pub struct ChatState {
    /// One pane per conversation, in socket order
    pub panes: RwSignal<Vec<Container>>,
    /// Whether the input area is shown
    pub input_visible: RwSignal<bool>,
}

impl ChatState {
    pub fn new() -> Self {
        Self {
            panes: create_rw_signal(Vec::new()),
            input_visible: create_rw_signal(false),
        }
    }
}

/// Renders by updating [`ChatState`] signals
#[derive(Clone, Copy)]
pub struct SignalRenderer {
    state: ChatState,
}

impl SignalRenderer {
    pub fn new(state: ChatState) -> Self {
        Self { state }
    }
}

impl Renderer for SignalRenderer {
    fn open_container(&mut self, key: &ContainerKey, label: &str) {
        self.state.panes.update(|panes| {
            if !panes.iter().any(|pane| &pane.key == key) {
                panes.push(Container {
                    key: key.clone(),
                    label: label.to_string(),
                    messages: Vec::new(),
                });
            }
        });
    }

    fn append_message(&mut self, key: &ContainerKey, text: &str, role: Role) -> ChatResult<()> {
        let mut result = Err(ChatError::UnknownContainer(key.to_string()));

        self.state.panes.update(|panes| {
            if let Some(pane) = panes.iter_mut().find(|pane| &pane.key == key) {
                pane.messages.push(RenderedMessage {
                    text: text.to_string(),
                    role,
                });
                result = Ok(());
            }
        });

        result
    }

    fn set_input_visible(&mut self, visible: bool) {
        self.state.input_visible.set(visible);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_messages_land_in_their_pane() {
        let runtime = create_runtime();
        let state = ChatState::new();
        let mut renderer = SignalRenderer::new(state);
        let left = ContainerKey::Conversation("c1".to_string());
        let right = ContainerKey::Conversation("c2".to_string());

        renderer.open_container(&left, "small");
        renderer.open_container(&right, "large");
        renderer.open_container(&left, "ignored");
        renderer.append_message(&right, "hi", Role::Assistant).unwrap();

        let panes = state.panes.get_untracked();
        assert_eq!(panes.len(), 2);
        assert_eq!(panes[0].label, "small");
        assert!(panes[0].messages.is_empty());
        assert_eq!(panes[1].messages[0].css_class(), "assistant-message");

        runtime.dispose();
    }

    #[test]
    fn test_unknown_pane() {
        let runtime = create_runtime();
        let state = ChatState::new();
        let mut renderer = SignalRenderer::new(state);

        let result = renderer.append_message(&ContainerKey::Single, "lost", Role::User);

        assert!(matches!(result, Err(ChatError::UnknownContainer(_))));
        assert!(state.panes.get_untracked().is_empty());

        renderer.set_input_visible(true);
        assert!(state.input_visible.get_untracked());

        runtime.dispose();
    }
}
