//! Header Component
//!
//! Buttons creating a conversation or a room. A successful creation
//! navigates away from the page.

use leptos::*;
use mmchat::create::CreateRequest;
use mmchat::protocol::ChatMode;

use crate::api;

/// Header with the creation buttons
#[component]
pub fn Header() -> impl IntoView {
    let (creating, set_creating) = create_signal(false);

    let start = move |request: CreateRequest| {
        set_creating.set(true);
        spawn_local(async move {
            // Failure is logged by the creation flow
            if api::create(request).await.is_err() {
                set_creating.set(false);
            }
        });
    };

    view! {
        <header>
            <button
                id="new"
                disabled=creating
                on:click=move |_| start(CreateRequest::Conversation)
            >
                "New chat"
            </button>
            <button
                disabled=creating
                on:click=move |_| start(CreateRequest::Room(ChatMode::Single))
            >
                "Single model room"
            </button>
            <button
                disabled=creating
                on:click=move |_| start(CreateRequest::Room(ChatMode::Comparison))
            >
                "Compare models"
            </button>
        </header>
    }
}
