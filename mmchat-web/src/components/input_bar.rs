//! Input Bar
//!
//! Hidden until the page is bound to a conversation or room.

use leptos::*;

use crate::state::{ChatState, PageHandle};

/// Message input and send button
#[component]
pub fn InputBar(state: ChatState, page: StoredValue<PageHandle>) -> impl IntoView {
    let (message, set_message) = create_signal(String::new());

    let send = move || {
        let text = message.get_untracked();
        if page.with_value(|page| page.send(&text)) {
            set_message.set(String::new());
        }
    };

    view! {
        <div
            class="input-container"
            style:display=move || if state.input_visible.get() { "flex" } else { "none" }
        >
            <input
                id="message"
                type="text"
                placeholder="Type a message..."
                prop:value=message
                on:input=move |ev| set_message.set(event_target_value(&ev))
                on:keydown=move |ev: web_sys::KeyboardEvent| {
                    if ev.key() == "Enter" {
                        send();
                    }
                }
            />
            <button id="send" on:click=move |_| send()>
                "Send"
            </button>
        </div>
    }
}
