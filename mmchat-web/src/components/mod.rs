//! UI Components
//!
//! Header with the creation buttons, the chat panes and the input bar.

pub mod chat_pane;
pub mod header;
pub mod input_bar;

pub use chat_pane::ChatPanes;
pub use header::Header;
pub use input_bar::InputBar;
