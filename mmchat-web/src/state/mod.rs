//! State Management
//!
//! Chat view state, the browser implementations of the core's seams and the
//! page controller tying them to a `Session`.

pub mod chat;
pub mod page;
pub mod socket;
pub mod storage;

pub use chat::{ChatState, SignalRenderer};
pub use page::{bind_page, endpoints, LocationNavigator, PageHandle};
pub use storage::LocalStorageStore;
