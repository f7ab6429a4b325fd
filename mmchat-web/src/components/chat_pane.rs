//! Chat Panes
//!
//! One pane per conversation. Each pane is redrawn whole when its messages
//! change.

use leptos::*;
use mmchat::render::{Container, ContainerKey, RenderedMessage};

use crate::state::ChatState;

/// All panes of the page, side by side
#[component]
pub fn ChatPanes(state: ChatState) -> impl IntoView {
    view! {
        <main class="chats">
            {move || {
                state.panes.get()
                    .into_iter()
                    .map(|pane| view! { <ChatPane pane=pane /> })
                    .collect_view()
            }}
        </main>
    }
}

#[component]
fn ChatPane(pane: Container) -> impl IntoView {
    let conversation_id = match &pane.key {
        ContainerKey::Conversation(id) => Some(id.clone()),
        ContainerKey::Single => None,
    };
    let heading = (!pane.label.is_empty()).then(|| view! { <h2>{pane.label.clone()}</h2> });

    view! {
        <section class="chat" data-conversation-id=conversation_id>
            {heading}
            {pane.messages.into_iter().map(message_node).collect_view()}
        </section>
    }
}

fn message_node(message: RenderedMessage) -> impl IntoView {
    let class = message.css_class();

    view! {
        <div class="msg-wrapper">
            <div class=class>{message.text}</div>
        </div>
    }
}
