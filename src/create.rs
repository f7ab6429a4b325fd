//! Room and conversation creation
//!
//! The POST itself is platform specific; this module turns its outcome into
//! a stored descriptor and a navigation. Any failure is logged and leaves
//! storage and location untouched.

use serde_json::Value;

use crate::error::ChatResult;
use crate::protocol::{ChatMode, Endpoints, RoomDescriptor};
use crate::route::PageRoute;
use crate::store::ClientStore;

/// Moves the page to another path
pub trait Navigator {
    fn navigate(&mut self, path: &str);
}

/// What to create
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CreateRequest {
    /// `POST /conversation`
    Conversation,
    /// `POST /room/{mode}`
    Room(ChatMode),
}

impl CreateRequest {
    /// URL the POST goes to
    pub fn url(&self, endpoints: &Endpoints) -> String {
        match self {
            CreateRequest::Conversation => endpoints.create_conversation_url(),
            CreateRequest::Room(mode) => endpoints.create_room_url(*mode),
        }
    }

    /// Page that shows the created resource
    pub fn route_for(&self, id: &str) -> PageRoute {
        match self {
            CreateRequest::Conversation => PageRoute::Conversation { id: id.to_string() },
            CreateRequest::Room(mode) => PageRoute::Room {
                mode: *mode,
                room_id: id.to_string(),
            },
        }
    }
}

/// Finish a creation request given the decoded response body.
///
/// On success the descriptor is saved and the navigator is sent to the new
/// page. Returns the route navigated to.
pub fn complete_creation<St, N>(
    request: CreateRequest,
    response: ChatResult<Value>,
    store: &mut St,
    navigator: &mut N,
) -> ChatResult<PageRoute>
where
    St: ClientStore + ?Sized,
    N: Navigator + ?Sized,
{
    let result = response
        .and_then(RoomDescriptor::from_response)
        .and_then(|descriptor| {
            store.save(&descriptor)?;
            Ok(descriptor)
        });

    match result {
        Ok(descriptor) => {
            tracing::info!(id = %descriptor.id(), request = ?request, "Created");
            let route = request.route_for(descriptor.id());
            if let Some(path) = route.path() {
                navigator.navigate(&path);
            }
            Ok(route)
        }
        Err(e) => {
            tracing::error!(request = ?request, error = %e, "Creation failed");
            Err(e)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ChatError;
    use crate::store::MemoryStore;
    use serde_json::json;

    #[derive(Default)]
    struct RecordingNavigator {
        visited: Vec<String>,
    }

    impl Navigator for RecordingNavigator {
        fn navigate(&mut self, path: &str) {
            self.visited.push(path.to_string());
        }
    }

    #[test]
    fn test_room_creation_persists_full_descriptor() {
        let body = json!({
            "id": "r1",
            "conversations": [
                {"id": "c1", "model": "small", "messages": []},
                {"id": "c2", "model": "large", "messages": []}
            ]
        });
        let mut store = MemoryStore::new();
        let mut navigator = RecordingNavigator::default();

        let route = complete_creation(
            CreateRequest::Room(ChatMode::Comparison),
            Ok(body.clone()),
            &mut store,
            &mut navigator,
        )
        .unwrap();

        assert_eq!(navigator.visited, vec!["/room/cm/r1".to_string()]);
        assert_eq!(route.path().as_deref(), Some("/room/cm/r1"));
        let stored: Value = serde_json::from_str(store.raw().unwrap()).unwrap();
        assert_eq!(stored, body);
    }

    #[test]
    fn test_conversation_creation_navigates() {
        let mut store = MemoryStore::new();
        let mut navigator = RecordingNavigator::default();

        let body = json!({"conversation_id": "abc123"});

        complete_creation(
            CreateRequest::Conversation,
            Ok(body.clone()),
            &mut store,
            &mut navigator,
        )
        .unwrap();

        assert_eq!(navigator.visited, vec!["/conversation/abc123".to_string()]);
        assert_eq!(store.load().unwrap().unwrap().id(), "abc123");
        let stored: Value = serde_json::from_str(store.raw().unwrap()).unwrap();
        assert_eq!(stored, body);
    }

    #[test]
    fn test_failures_leave_store_and_location_unchanged() {
        let previous = RoomDescriptor::new("old");
        let failures = vec![
            Err(ChatError::Network("connection refused".to_string())),
            Err(ChatError::Status {
                status: 500,
                body: "boom".to_string(),
            }),
            Ok(json!({"error": "Model is not configured"})),
            Ok(json!({"id": 7})),
        ];

        for response in failures {
            let mut store = MemoryStore::with_descriptor(&previous).unwrap();
            let mut navigator = RecordingNavigator::default();

            let result = complete_creation(
                CreateRequest::Room(ChatMode::Single),
                response,
                &mut store,
                &mut navigator,
            );

            assert!(result.is_err());
            assert!(navigator.visited.is_empty());
            assert_eq!(store.load().unwrap(), Some(previous.clone()));
        }
    }

    #[test]
    fn test_request_urls() {
        let endpoints = Endpoints::default();
        assert_eq!(
            CreateRequest::Conversation.url(&endpoints),
            "http://localhost:8000/conversation"
        );
        assert_eq!(
            CreateRequest::Room(ChatMode::Single).url(&endpoints),
            "http://localhost:8000/room/sm"
        );
    }
}
