//! mmchat Web Client
//!
//! Browser page for the multi-model chat backend, built with Leptos (WASM).
//!
//! # Features
//!
//! - New conversation, single-model room and comparison room buttons
//! - One chat pane per conversation, side by side in comparison rooms
//! - One WebSocket per conversation, opened on page load
//!
//! # Architecture
//!
//! Client-side rendered (CSR) Leptos application. Routing, socket ownership
//! and message routing live in the `mmchat` core; this crate supplies the
//! browser side of its seams: a signal-backed renderer, `localStorage`,
//! `web_sys::WebSocket` and `window.location`.

use leptos::*;

mod api;
mod app;
mod components;
mod logging;
mod state;

fn main() {
    // Set up panic hook for better error messages in WASM
    console_error_panic_hook::set_once();
    logging::init_logging();

    // Mount the app to the document body
    mount_to_body(|| view! { <app::App /> });
}
