//! Transcript renderer for the terminal client.

use std::collections::HashMap;
use std::io::Write;

use super::{ContainerKey, Renderer};
use crate::error::{ChatError, ChatResult};
use crate::protocol::Role;

/// Writes one line per message node: `[label] role> text`
pub struct TerminalRenderer<W: Write> {
    out: W,
    labels: HashMap<ContainerKey, String>,
    input_visible: bool,
}

impl<W: Write> TerminalRenderer<W> {
    pub fn new(out: W) -> Self {
        Self {
            out,
            labels: HashMap::new(),
            input_visible: false,
        }
    }

    pub fn input_visible(&self) -> bool {
        self.input_visible
    }

    /// Give back the underlying writer
    pub fn into_inner(self) -> W {
        self.out
    }
}

impl<W: Write> Renderer for TerminalRenderer<W> {
    fn open_container(&mut self, key: &ContainerKey, label: &str) {
        let label = if label.is_empty() {
            key.to_string()
        } else {
            label.to_string()
        };
        self.labels.entry(key.clone()).or_insert(label);
    }

    fn append_message(&mut self, key: &ContainerKey, text: &str, role: Role) -> ChatResult<()> {
        let label = self
            .labels
            .get(key)
            .ok_or_else(|| ChatError::UnknownContainer(key.to_string()))?;

        writeln!(self.out, "[{}] {}> {}", label, role, text)
            .and_then(|_| self.out.flush())
            .map_err(|e| ChatError::Render(e.to_string()))
    }

    fn set_input_visible(&mut self, visible: bool) {
        if visible && !self.input_visible {
            let _ = writeln!(self.out, "-- type a message and press Enter, Ctrl-D to leave --");
        }
        self.input_visible = visible;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lines_are_labelled_by_container() {
        let mut renderer = TerminalRenderer::new(Vec::new());
        let key = ContainerKey::Conversation("c1".to_string());
        renderer.open_container(&key, "qwen-0.5b");
        renderer.open_container(&ContainerKey::Single, "");

        renderer.append_message(&key, "hi", Role::User).unwrap();
        renderer
            .append_message(&ContainerKey::Single, "hello", Role::Assistant)
            .unwrap();

        let output = String::from_utf8(renderer.into_inner()).unwrap();
        assert_eq!(output, "[qwen-0.5b] user> hi\n[chat] assistant> hello\n");
    }

    #[test]
    fn test_unknown_container_writes_nothing() {
        let mut renderer = TerminalRenderer::new(Vec::new());
        assert!(renderer
            .append_message(&ContainerKey::Single, "x", Role::User)
            .is_err());
        assert!(renderer.into_inner().is_empty());
    }
}
