//! Backend URL construction.

use super::types::ChatMode;

/// Default backend location
pub const DEFAULT_HTTP_BASE: &str = "http://localhost:8000";

/// HTTP and WebSocket base URLs of a chat backend
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Endpoints {
    http_base: String,
    ws_base: String,
}

impl Default for Endpoints {
    fn default() -> Self {
        Self::from_http_base(DEFAULT_HTTP_BASE)
    }
}

impl Endpoints {
    /// Create endpoints from explicit HTTP and WebSocket bases
    pub fn new(http_base: &str, ws_base: &str) -> Self {
        Self {
            http_base: http_base.trim_end_matches('/').to_string(),
            ws_base: ws_base.trim_end_matches('/').to_string(),
        }
    }

    /// Derive the WebSocket base from the HTTP one (`http` → `ws`, `https` → `wss`)
    pub fn from_http_base(http_base: &str) -> Self {
        let ws_base = if let Some(rest) = http_base.strip_prefix("https://") {
            format!("wss://{}", rest)
        } else if let Some(rest) = http_base.strip_prefix("http://") {
            format!("ws://{}", rest)
        } else {
            http_base.to_string()
        };
        Self::new(http_base, &ws_base)
    }

    pub fn http_base(&self) -> &str {
        &self.http_base
    }

    pub fn ws_base(&self) -> &str {
        &self.ws_base
    }

    /// `POST /conversation`
    pub fn create_conversation_url(&self) -> String {
        format!("{}/conversation", self.http_base)
    }

    /// `POST /room/{mode}`
    pub fn create_room_url(&self, mode: ChatMode) -> String {
        format!("{}/room/{}", self.http_base, mode)
    }

    /// Socket of a single conversation (plain text both ways)
    pub fn conversation_socket_url(&self, conversation_id: &str) -> String {
        format!(
            "{}/ws/conversation/{}",
            self.ws_base,
            urlencoding::encode(conversation_id)
        )
    }

    /// Socket of one conversation inside a room (JSON frames inbound)
    pub fn room_socket_url(&self, mode: ChatMode, room_id: &str, conversation_id: &str) -> String {
        format!(
            "{}/ws/room/{}/{}/{}",
            self.ws_base,
            mode,
            urlencoding::encode(room_id),
            urlencoding::encode(conversation_id)
        )
    }
}
