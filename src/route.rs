//! Page routing
//!
//! Maps a page path to the set of sockets the page should open.

use crate::protocol::ChatMode;

/// What a page path asks the client to bind to
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PageRoute {
    /// Any path that is not a conversation or room page
    Unbound,
    /// `/conversation/{id}`
    Conversation { id: String },
    /// `/room/{mode}/{room_id}`
    Room { mode: ChatMode, room_id: String },
}

impl PageRoute {
    /// Parse a location pathname.
    ///
    /// Only the exact shapes `/conversation/{id}` and `/room/{mode}/{room_id}`
    /// bind; a trailing slash, an empty id or an unknown mode do not.
    pub fn parse(path: &str) -> Self {
        let parts: Vec<&str> = path.split('/').collect();

        match parts.as_slice() {
            ["", "conversation", id] if !id.is_empty() => match decode(id) {
                Some(id) => PageRoute::Conversation { id },
                None => PageRoute::Unbound,
            },
            ["", "room", mode, room_id] if !room_id.is_empty() => {
                match (mode.parse::<ChatMode>(), decode(room_id)) {
                    (Ok(mode), Some(room_id)) => PageRoute::Room { mode, room_id },
                    _ => PageRoute::Unbound,
                }
            }
            _ => PageRoute::Unbound,
        }
    }

    /// Page path for this route, `None` when unbound
    pub fn path(&self) -> Option<String> {
        match self {
            PageRoute::Unbound => None,
            PageRoute::Conversation { id } => {
                Some(format!("/conversation/{}", urlencoding::encode(id)))
            }
            PageRoute::Room { mode, room_id } => {
                Some(format!("/room/{}/{}", mode, urlencoding::encode(room_id)))
            }
        }
    }

    pub fn is_bound(&self) -> bool {
        !matches!(self, PageRoute::Unbound)
    }
}

fn decode(segment: &str) -> Option<String> {
    urlencoding::decode(segment)
        .ok()
        .map(|s| s.into_owned())
        .filter(|s| !s.is_empty())
}
