//! App Root Component
//!
//! Binds the page on mount and lays out the header, panes and input.

use leptos::*;

use crate::components::{ChatPanes, Header, InputBar};
use crate::state::{bind_page, ChatState, SignalRenderer};

/// Root application component
#[component]
pub fn App() -> impl IntoView {
    let state = ChatState::new();
    let page = store_value(bind_page(SignalRenderer::new(state)));

    view! {
        <div class="app">
            <Header />
            <ChatPanes state=state />
            <InputBar state=state page=page />
        </div>
    }
}
