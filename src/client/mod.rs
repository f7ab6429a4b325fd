//! Native Client
//!
//! The pieces a terminal page needs beyond the platform-neutral core:
//!
//! - [`ApiClient`]: creation requests over `reqwest`
//! - [`WsConnector`]: sockets over `tokio-tungstenite`
//! - [`PathNavigator`]: "navigation" for a page that has no address bar

mod http;
mod socket;

pub use http::ApiClient;
pub use socket::{SocketEvent, WsConnector, WsSocket};

use crate::create::Navigator;

/// Remembers where the page was sent
#[derive(Debug, Default, Clone)]
pub struct PathNavigator {
    location: Option<String>,
}

impl PathNavigator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Last path navigated to
    pub fn location(&self) -> Option<&str> {
        self.location.as_deref()
    }
}

impl Navigator for PathNavigator {
    fn navigate(&mut self, path: &str) {
        tracing::debug!(path = %path, "Navigating");
        self.location = Some(path.to_string());
    }
}
