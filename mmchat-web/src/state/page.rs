//! Page Controller
//!
//! Binds the page at the current location once, on load, and owns the
//! resulting session for the page's lifetime.

use std::cell::RefCell;
use std::rc::Rc;

use mmchat::create::Navigator;
use mmchat::protocol::{Endpoints, DEFAULT_HTTP_BASE};
use mmchat::route::PageRoute;
use mmchat::session::Session;

use super::chat::SignalRenderer;
use super::socket::{BrowserConnector, SessionSlot, SharedSession};
use super::storage::{local_storage, LocalStorageStore};

/// Storage key overriding the backend URL
pub const API_URL_KEY: &str = "mmchat.api_url";

/// Backend URLs: the `mmchat.api_url` override, else the page's own origin
pub fn endpoints() -> Endpoints {
    let base = local_storage()
        .ok()
        .and_then(|storage| storage.get_item(API_URL_KEY).ok().flatten())
        .or_else(|| web_sys::window().and_then(|w| w.location().origin().ok()))
        .unwrap_or_else(|| DEFAULT_HTTP_BASE.to_string());

    Endpoints::from_http_base(&base)
}

/// Navigates by assigning `window.location.href`
#[derive(Debug, Default, Clone, Copy)]
pub struct LocationNavigator;

impl Navigator for LocationNavigator {
    fn navigate(&mut self, path: &str) {
        let result = web_sys::window()
            .map(|window| window.location().set_href(path))
            .unwrap_or(Ok(()));

        if let Err(e) = result {
            tracing::error!(path = %path, error = ?e, "Navigation failed");
        }
    }
}

/// The bound page
#[derive(Clone)]
pub struct PageHandle {
    session: SharedSession,
    renderer: SignalRenderer,
}

impl PageHandle {
    /// Send user input on every open socket. Returns whether it went out.
    pub fn send(&self, input: &str) -> bool {
        let mut renderer = self.renderer;

        match self.session.try_borrow_mut() {
            Ok(mut session) => session.send(input, &mut renderer).is_sent(),
            Err(_) => {
                tracing::error!("Session busy, message dropped");
                false
            }
        }
    }
}

/// Parse the current path and bind a session to it
pub fn bind_page(renderer: SignalRenderer) -> PageHandle {
    let path = web_sys::window()
        .and_then(|w| w.location().pathname().ok())
        .unwrap_or_default();
    let route = PageRoute::parse(&path);

    let slot: SessionSlot = Rc::new(RefCell::new(None));
    let mut connector = BrowserConnector::new(Rc::clone(&slot), renderer);
    let mut bind_renderer = renderer;

    let session = Session::bind(
        route,
        &endpoints(),
        &LocalStorageStore,
        &mut connector,
        &mut bind_renderer,
    );

    let session = Rc::new(RefCell::new(session));
    *slot.borrow_mut() = Some(Rc::clone(&session));

    PageHandle { session, renderer }
}
