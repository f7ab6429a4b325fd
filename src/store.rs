//! Client State Store
//!
//! Persists the descriptor of the last created room/conversation under a
//! single fixed key. Each save overwrites the previous value wholesale.

use crate::error::{ChatError, ChatResult};
use crate::protocol::RoomDescriptor;

/// Key the descriptor is stored under
pub const STORAGE_KEY: &str = "mmchat.room";

/// Client-side key-value storage holding one descriptor
pub trait ClientStore {
    /// Last saved descriptor, `None` if nothing was saved yet
    fn load(&self) -> ChatResult<Option<RoomDescriptor>>;

    /// Replace the stored descriptor
    fn save(&mut self, descriptor: &RoomDescriptor) -> ChatResult<()>;
}

/// Store that lives as long as the process, holding the serialized JSON
#[derive(Debug, Default, Clone)]
pub struct MemoryStore {
    value: Option<String>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store pre-seeded with a descriptor
    pub fn with_descriptor(descriptor: &RoomDescriptor) -> ChatResult<Self> {
        Ok(Self {
            value: Some(serde_json::to_string(descriptor)?),
        })
    }

    /// Raw stored JSON
    pub fn raw(&self) -> Option<&str> {
        self.value.as_deref()
    }
}

impl ClientStore for MemoryStore {
    fn load(&self) -> ChatResult<Option<RoomDescriptor>> {
        self.value
            .as_deref()
            .map(|json| serde_json::from_str(json).map_err(|e| ChatError::Storage(e.to_string())))
            .transpose()
    }

    fn save(&mut self, descriptor: &RoomDescriptor) -> ChatResult<()> {
        self.value = Some(serde_json::to_string(descriptor)?);
        Ok(())
    }
}

#[cfg(feature = "native")]
pub use file::FileStore;

#[cfg(feature = "native")]
mod file {
    use super::*;
    use serde_json::{Map, Value};
    use std::path::{Path, PathBuf};

    /// JSON file standing in for browser local storage.
    ///
    /// The file holds one object whose only key is [`STORAGE_KEY`].
    #[derive(Debug, Clone)]
    pub struct FileStore {
        path: PathBuf,
    }

    impl FileStore {
        pub fn new(path: impl Into<PathBuf>) -> Self {
            Self { path: path.into() }
        }

        pub fn path(&self) -> &Path {
            &self.path
        }
    }

    impl ClientStore for FileStore {
        fn load(&self) -> ChatResult<Option<RoomDescriptor>> {
            let content = match std::fs::read_to_string(&self.path) {
                Ok(content) => content,
                Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
                Err(e) => {
                    return Err(ChatError::Storage(format!(
                        "failed to read {:?}: {}",
                        self.path, e
                    )))
                }
            };

            let mut entries: Map<String, Value> = serde_json::from_str(&content)
                .map_err(|e| ChatError::Storage(format!("corrupt state file {:?}: {}", self.path, e)))?;

            entries
                .remove(STORAGE_KEY)
                .map(|value| {
                    serde_json::from_value(value).map_err(|e| ChatError::Storage(e.to_string()))
                })
                .transpose()
        }

        fn save(&mut self, descriptor: &RoomDescriptor) -> ChatResult<()> {
            if let Some(parent) = self.path.parent() {
                if !parent.as_os_str().is_empty() {
                    std::fs::create_dir_all(parent).map_err(|e| {
                        ChatError::Storage(format!("failed to create {:?}: {}", parent, e))
                    })?;
                }
            }

            let mut entries = Map::new();
            entries.insert(STORAGE_KEY.to_string(), serde_json::to_value(descriptor)?);
            let content = serde_json::to_string_pretty(&entries)?;

            std::fs::write(&self.path, content)
                .map_err(|e| ChatError::Storage(format!("failed to write {:?}: {}", self.path, e)))?;

            tracing::debug!(path = ?self.path, id = %descriptor.id(), "Client state saved");
            Ok(())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::protocol::ConversationEntry;

    fn room() -> RoomDescriptor {
        RoomDescriptor::new("r1")
            .conversation(ConversationEntry::new("c1", "small"))
            .conversation(ConversationEntry::new("c2", "large"))
    }

    #[test]
    fn test_memory_store_overwrites() {
        let mut store = MemoryStore::new();
        assert!(store.load().unwrap().is_none());

        store.save(&room()).unwrap();
        store.save(&RoomDescriptor::new("abc")).unwrap();

        let loaded = store.load().unwrap().unwrap();
        assert_eq!(loaded.id(), "abc");
        assert!(loaded.conversations().is_empty());
        assert_eq!(store.raw(), Some(r#"{"id":"abc"}"#));
    }

    #[cfg(feature = "native")]
    #[test]
    fn test_file_store_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let mut store = FileStore::new(dir.path().join("nested").join("state.json"));

        assert!(store.load().unwrap().is_none());
        store.save(&room()).unwrap();

        let reopened = FileStore::new(store.path().to_path_buf());
        assert_eq!(reopened.load().unwrap(), Some(room()));
    }

    #[cfg(feature = "native")]
    #[test]
    fn test_file_store_keeps_server_body() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("state.json");
        let body = serde_json::json!({"conversation_id": "abc123"});

        let mut store = FileStore::new(&path);
        store
            .save(&RoomDescriptor::from_response(body.clone()).unwrap())
            .unwrap();

        let content: serde_json::Value =
            serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(content[STORAGE_KEY], body);
        assert_eq!(store.load().unwrap().unwrap().id(), "abc123");
    }

    #[cfg(feature = "native")]
    #[test]
    fn test_file_store_corrupt_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("state.json");
        std::fs::write(&path, "not json").unwrap();

        let store = FileStore::new(path);
        assert!(matches!(store.load(), Err(ChatError::Storage(_))));
    }
}
