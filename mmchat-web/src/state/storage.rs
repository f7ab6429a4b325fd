//! `localStorage` client store.

use mmchat::error::{ChatError, ChatResult};
use mmchat::protocol::RoomDescriptor;
use mmchat::store::{ClientStore, STORAGE_KEY};
use wasm_bindgen::JsValue;

/// Keeps the descriptor in the browser's `localStorage`
#[derive(Debug, Default, Clone, Copy)]
pub struct LocalStorageStore;

pub(crate) fn local_storage() -> ChatResult<web_sys::Storage> {
    web_sys::window()
        .ok_or_else(|| ChatError::Storage("no window".to_string()))?
        .local_storage()
        .map_err(js_error)?
        .ok_or_else(|| ChatError::Storage("localStorage is unavailable".to_string()))
}

fn js_error(e: JsValue) -> ChatError {
    ChatError::Storage(format!("{:?}", e))
}

impl ClientStore for LocalStorageStore {
    fn load(&self) -> ChatResult<Option<RoomDescriptor>> {
        local_storage()?
            .get_item(STORAGE_KEY)
            .map_err(js_error)?
            .map(|json| serde_json::from_str(&json).map_err(|e| ChatError::Storage(e.to_string())))
            .transpose()
    }

    fn save(&mut self, descriptor: &RoomDescriptor) -> ChatResult<()> {
        let json = serde_json::to_string(descriptor)?;
        local_storage()?.set_item(STORAGE_KEY, &json).map_err(js_error)
    }
}

#[cfg(all(test, target_arch = "wasm32"))]
mod tests {
    use super::*;
    use mmchat::protocol::ConversationEntry;
    use wasm_bindgen_test::*;

    wasm_bindgen_test_configure!(run_in_browser);

    #[wasm_bindgen_test]
    fn test_save_then_load() {
        let mut store = LocalStorageStore;
        let room = RoomDescriptor::new("r1").conversation(ConversationEntry::new("c1", "small"));

        store.save(&room).unwrap();

        assert_eq!(store.load().unwrap(), Some(room));
    }

    #[wasm_bindgen_test]
    fn test_corrupt_value() {
        local_storage().unwrap().set_item(STORAGE_KEY, "{oops").unwrap();

        assert!(matches!(LocalStorageStore.load(), Err(ChatError::Storage(_))));
    }
}
