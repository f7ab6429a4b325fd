//! Chat Protocol
//!
//! Data model and URL layout shared by the client platforms and the
//! development backend.
//!
//! ## REST
//! - `POST /conversation` → `{ "conversation_id": "..." }`
//! - `POST /room/{mode}` → `{ "id": "...", "conversations": [{ "id": "...", "model": "..." }] }`
//!
//! ## WebSocket
//! - `/ws/conversation/{conversation_id}` - plain text both ways
//! - `/ws/room/{mode}/{room_id}/{conversation_id}` - plain text out, `{ "response": "..." }` in

mod endpoints;
mod types;

pub use endpoints::{Endpoints, DEFAULT_HTTP_BASE};
pub use types::{ChatMode, ConversationEntry, InboundFrame, Role, RoomDescriptor};
