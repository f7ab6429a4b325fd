//! Browser WebSocket connector.
//!
//! Socket callbacks reach the page's session through a shared slot that the
//! page controller fills right after binding. The browser delivers events
//! only after the binding script returns, so the slot is always filled by
//! the time a callback runs.

use std::cell::RefCell;
use std::rc::Rc;
use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;
use web_sys::{CloseEvent, MessageEvent, WebSocket};

use mmchat::error::{ChatError, ChatResult};
use mmchat::session::{Connector, Session, SocketHandle};

use super::chat::SignalRenderer;

/// The page's session, shared between the input handler and socket callbacks
pub type SharedSession = Rc<RefCell<Session<BrowserSocket>>>;

/// Filled with the session once it is bound
pub type SessionSlot = Rc<RefCell<Option<SharedSession>>>;

/// A `web_sys::WebSocket`
#[derive(Debug)]
pub struct BrowserSocket {
    ws: WebSocket,
}

impl SocketHandle for BrowserSocket {
    fn is_open(&self) -> bool {
        self.ws.ready_state() == WebSocket::OPEN
    }

    fn send_text(&self, text: &str) -> ChatResult<()> {
        self.ws
            .send_with_str(text)
            .map_err(|e| ChatError::Socket(format!("{:?}", e)))
    }
}

/// Opens browser sockets whose events feed the session in `slot`
pub struct BrowserConnector {
    slot: SessionSlot,
    renderer: SignalRenderer,
}

impl BrowserConnector {
    pub fn new(slot: SessionSlot, renderer: SignalRenderer) -> Self {
        Self { slot, renderer }
    }

    /// Set up WebSocket event handlers
    fn setup_handlers(&self, ws: &WebSocket, conversation_id: &str) {
        // On open
        let slot = Rc::clone(&self.slot);
        let id = conversation_id.to_string();
        let on_open = Closure::wrap(Box::new(move |_: JsValue| {
            with_session(&slot, |session| session.opened(&id));
        }) as Box<dyn FnMut(JsValue)>);
        ws.set_onopen(Some(on_open.as_ref().unchecked_ref()));
        on_open.forget();

        // On message
        let slot = Rc::clone(&self.slot);
        let id = conversation_id.to_string();
        let mut renderer = self.renderer;
        let on_message = Closure::wrap(Box::new(move |event: MessageEvent| {
            match event.data().as_string() {
                Some(text) => with_session(&slot, |session| {
                    // Logged by the session
                    let _ = session.receive(&id, &text, &mut renderer);
                }),
                None => tracing::warn!(conversation_id = %id, "Non-text frame ignored"),
            }
        }) as Box<dyn FnMut(MessageEvent)>);
        ws.set_onmessage(Some(on_message.as_ref().unchecked_ref()));
        on_message.forget();

        // On close
        let slot = Rc::clone(&self.slot);
        let id = conversation_id.to_string();
        let on_close = Closure::wrap(Box::new(move |event: CloseEvent| {
            tracing::debug!(code = event.code(), reason = %event.reason(), "Close frame");
            with_session(&slot, |session| session.closed(&id));
        }) as Box<dyn FnMut(CloseEvent)>);
        ws.set_onclose(Some(on_close.as_ref().unchecked_ref()));
        on_close.forget();

        // On error
        let id = conversation_id.to_string();
        let on_error = Closure::wrap(Box::new(move |e: JsValue| {
            tracing::error!(conversation_id = %id, error = ?e, "WebSocket error");
        }) as Box<dyn FnMut(JsValue)>);
        ws.set_onerror(Some(on_error.as_ref().unchecked_ref()));
        on_error.forget();
    }
}

impl Connector for BrowserConnector {
    type Socket = BrowserSocket;

    fn connect(&mut self, url: &str, conversation_id: &str) -> ChatResult<BrowserSocket> {
        let ws = WebSocket::new(url).map_err(|e| ChatError::Socket(format!("{:?}", e)))?;
        self.setup_handlers(&ws, conversation_id);
        Ok(BrowserSocket { ws })
    }
}

fn with_session(slot: &SessionSlot, f: impl FnOnce(&mut Session<BrowserSocket>)) {
    let session = slot.borrow().clone();

    match session {
        Some(session) => match session.try_borrow_mut() {
            Ok(mut session) => f(&mut session),
            Err(_) => tracing::error!("Session busy, socket event dropped"),
        },
        None => tracing::warn!("Socket event before the page was bound"),
    }
}
