//! # mmchat
//!
//! Minimal chat client for a multi-model chat backend. A page is either a
//! single conversation or a room of one or two conversations answered by
//! different models; the client opens one WebSocket per conversation and
//! renders every exchange into that conversation's container.
//!
//! ## Modules
//!
//! - [`protocol`]: wire types and backend URLs
//! - [`route`]: page path parsing
//! - [`session`]: socket ownership and message routing
//! - [`render`]: the display seam
//! - [`store`]: persisted room descriptor
//! - [`create`]: room/conversation creation flow
//!
//! With the `native` feature (default) the crate also carries the terminal
//! client ([`client`]), configuration, logging and a development
//! [`backend`].
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use mmchat::client::{ApiClient, PathNavigator, WsConnector};
//! use mmchat::create::CreateRequest;
//! use mmchat::protocol::{ChatMode, Endpoints};
//! use mmchat::render::TerminalRenderer;
//! use mmchat::route::PageRoute;
//! use mmchat::session::Session;
//! use mmchat::store::MemoryStore;
//! use std::time::Duration;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let endpoints = Endpoints::default();
//!     let api = ApiClient::new(endpoints.clone(), Duration::from_secs(30))?;
//!     let mut store = MemoryStore::new();
//!     let mut navigator = PathNavigator::new();
//!
//!     // Create a comparison room and open its page
//!     let route = api
//!         .create(CreateRequest::Room(ChatMode::Comparison), &mut store, &mut navigator)
//!         .await?;
//!
//!     let (mut connector, mut events) = WsConnector::new();
//!     let mut renderer = TerminalRenderer::new(std::io::stdout());
//!     let mut session = Session::bind(route, &endpoints, &store, &mut connector, &mut renderer);
//!
//!     // Wait for both sockets, then ask both models
//!     for _ in 0..2 {
//!         if let Some(event) = events.recv().await {
//!             event.dispatch(&mut session, &mut renderer);
//!         }
//!     }
//!     session.send("Hello", &mut renderer);
//!
//!     while let Some(event) = events.recv().await {
//!         event.dispatch(&mut session, &mut renderer);
//!     }
//!     Ok(())
//! }
//! ```

pub mod create;
pub mod error;
pub mod protocol;
pub mod render;
pub mod route;
pub mod session;
pub mod store;

#[cfg(feature = "native")]
pub mod backend;
#[cfg(feature = "native")]
pub mod client;
#[cfg(feature = "native")]
pub mod config;
#[cfg(feature = "native")]
pub mod logging;

// Re-export top-level types for convenience
pub use create::{complete_creation, CreateRequest, Navigator};
pub use error::{ChatError, ChatResult};
pub use protocol::{ChatMode, ConversationEntry, Endpoints, InboundFrame, Role, RoomDescriptor};
pub use render::{ContainerKey, MemoryRenderer, Renderer};
pub use route::PageRoute;
pub use session::{Connector, PageState, SendOutcome, Session, SocketHandle};
pub use store::{ClientStore, MemoryStore, STORAGE_KEY};

#[cfg(feature = "native")]
pub use config::Config;
