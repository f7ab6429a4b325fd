//! Page Session
//!
//! Owns the sockets a page opened and routes messages between them and the
//! [`Renderer`]. A session is bound once, on page load, and never rebinds:
//! there is no reconnect and no way back to [`PageState::Unbound`].
//!
//! Socket I/O is event driven. The platform glue calls [`Session::opened`],
//! [`Session::receive`] and [`Session::closed`] from its socket callbacks and
//! [`Session::send`] from the input handler, always on one thread.

use crate::error::{ChatError, ChatResult};
use crate::protocol::{Endpoints, InboundFrame, Role};
use crate::render::{ContainerKey, Renderer};
use crate::route::PageRoute;
use crate::store::ClientStore;

/// Handle to one open (or opening) socket
pub trait SocketHandle {
    /// True once the socket is open and until it closes
    fn is_open(&self) -> bool;

    /// Transmit one text frame
    fn send_text(&self, text: &str) -> ChatResult<()>;
}

/// Opens sockets.
///
/// `connect` must not wait for the handshake: it returns a handle right away
/// and reports the outcome through the platform's event callbacks, tagged
/// with `conversation_id`.
pub trait Connector {
    type Socket: SocketHandle;

    fn connect(&mut self, url: &str, conversation_id: &str) -> ChatResult<Self::Socket>;
}

/// Lifecycle of a page
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PageState {
    /// No conversation or room in the URL
    Unbound,
    /// Sockets opened and input shown
    Bound,
}

/// How inbound payloads are framed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Framing {
    /// `/ws/conversation/...`: the payload is the message
    PlainText,
    /// `/ws/room/...`: the payload is an [`InboundFrame`]
    Json,
}

/// One socket and the container its messages go to
#[derive(Debug)]
pub struct Connection<S> {
    pub conversation_id: String,
    pub model: Option<String>,
    pub key: ContainerKey,
    pub socket: S,
}

/// Result of a send attempt
#[derive(Debug)]
pub enum SendOutcome {
    /// Text went out; `failed` sockets rejected it
    Sent { delivered: usize, failed: usize },
    /// Nothing was sent and nothing rendered
    Dropped(ChatError),
}

impl SendOutcome {
    pub fn is_sent(&self) -> bool {
        matches!(self, SendOutcome::Sent { .. })
    }
}

/// Sockets and containers of one page
#[derive(Debug)]
pub struct Session<S> {
    route: PageRoute,
    state: PageState,
    framing: Framing,
    connections: Vec<Connection<S>>,
}

impl<S: SocketHandle> Session<S> {
    /// Session of a page that names no conversation
    pub fn unbound() -> Self {
        Self {
            route: PageRoute::Unbound,
            state: PageState::Unbound,
            framing: Framing::PlainText,
            connections: Vec::new(),
        }
    }

    /// Bind a page: open the sockets `route` asks for and reveal the input.
    ///
    /// A room route opens one socket per conversation of the stored
    /// descriptor. A missing descriptor, or one for another room, is logged
    /// and leaves the page bound with no sockets. A conversation listed more
    /// than once gets one socket. A socket that cannot even be created is
    /// logged and skipped.
    pub fn bind<C, St, R>(
        route: PageRoute,
        endpoints: &Endpoints,
        store: &St,
        connector: &mut C,
        renderer: &mut R,
    ) -> Self
    where
        C: Connector<Socket = S>,
        St: ClientStore + ?Sized,
        R: Renderer + ?Sized,
    {
        let mut session = Self::unbound();

        match &route {
            PageRoute::Unbound => {
                tracing::info!("Page is not a conversation or room, chat input stays hidden");
                renderer.set_input_visible(false);
                return session;
            }
            PageRoute::Conversation { id } => {
                tracing::info!(conversation_id = %id, "Initializing conversation page");
                let url = endpoints.conversation_socket_url(id);
                session.open(connector, renderer, &url, id, None, ContainerKey::Single);
            }
            PageRoute::Room { mode, room_id } => {
                tracing::info!(room_id = %room_id, mode = %mode, "Initializing room page");
                session.framing = Framing::Json;

                match store.load() {
                    Ok(Some(descriptor)) if descriptor.id() == room_id => {
                        let mut seen: Vec<&str> = Vec::new();
                        for conversation in descriptor.conversations() {
                            if seen.contains(&conversation.id.as_str()) {
                                tracing::warn!(
                                    conversation_id = %conversation.id,
                                    "Conversation listed twice in stored room, skipped"
                                );
                                continue;
                            }
                            seen.push(&conversation.id);

                            let url = endpoints.room_socket_url(*mode, room_id, &conversation.id);
                            session.open(
                                connector,
                                renderer,
                                &url,
                                &conversation.id,
                                Some(&conversation.model),
                                ContainerKey::Conversation(conversation.id.clone()),
                            );
                        }
                    }
                    Ok(Some(descriptor)) => {
                        tracing::error!(
                            room_id = %room_id,
                            stored_id = %descriptor.id(),
                            "Stored room does not match the page, no sockets opened"
                        );
                    }
                    Ok(None) => {
                        tracing::error!(room_id = %room_id, "No stored room, no sockets opened");
                    }
                    Err(e) => {
                        tracing::error!(room_id = %room_id, error = %e, "Failed to load stored room");
                    }
                }
            }
        }

        session.route = route;
        session.state = PageState::Bound;
        renderer.set_input_visible(true);
        session
    }

    fn open<C, R>(
        &mut self,
        connector: &mut C,
        renderer: &mut R,
        url: &str,
        conversation_id: &str,
        model: Option<&str>,
        key: ContainerKey,
    ) where
        C: Connector<Socket = S>,
        R: Renderer + ?Sized,
    {
        match connector.connect(url, conversation_id) {
            Ok(socket) => {
                tracing::debug!(url = %url, conversation_id = %conversation_id, "Socket opening");
                renderer.open_container(&key, model.unwrap_or_default());
                self.connections.push(Connection {
                    conversation_id: conversation_id.to_string(),
                    model: model.map(str::to_string),
                    key,
                    socket,
                });
            }
            Err(e) => {
                tracing::error!(url = %url, error = %e, "Failed to create socket");
            }
        }
    }

    pub fn state(&self) -> PageState {
        self.state
    }

    pub fn route(&self) -> &PageRoute {
        &self.route
    }

    pub fn connections(&self) -> &[Connection<S>] {
        &self.connections
    }

    /// Number of sockets currently open
    pub fn open_sockets(&self) -> usize {
        self.connections.iter().filter(|c| c.socket.is_open()).count()
    }

    /// Broadcast user input on every open socket and render it once per
    /// container.
    ///
    /// Empty input, or no open socket, drops the message: nothing is sent
    /// and nothing rendered. A failed send on one socket does not stop the
    /// others.
    pub fn send<R: Renderer + ?Sized>(&mut self, input: &str, renderer: &mut R) -> SendOutcome {
        if input.is_empty() {
            tracing::error!("Message is empty, nothing sent");
            return SendOutcome::Dropped(ChatError::EmptyMessage);
        }
        if self.open_sockets() == 0 {
            tracing::error!("WebSocket not connected, message dropped");
            return SendOutcome::Dropped(ChatError::NotConnected);
        }

        let mut delivered = 0;
        let mut failed = 0;
        for connection in self.connections.iter().filter(|c| c.socket.is_open()) {
            match connection.socket.send_text(input) {
                Ok(()) => delivered += 1,
                Err(e) => {
                    failed += 1;
                    tracing::error!(
                        conversation_id = %connection.conversation_id,
                        error = %e,
                        "Send failed"
                    );
                }
            }
        }
        tracing::info!(delivered, failed, "Sent to server");

        for connection in &self.connections {
            if let Err(e) = renderer.append_message(&connection.key, input, Role::User) {
                tracing::error!(error = %e, "Failed to render user message");
            }
        }

        SendOutcome::Sent { delivered, failed }
    }

    /// Render a payload received on the socket of `conversation_id`.
    pub fn receive<R: Renderer + ?Sized>(
        &mut self,
        conversation_id: &str,
        payload: &str,
        renderer: &mut R,
    ) -> ChatResult<()> {
        let result = self.deliver(conversation_id, payload, renderer);
        if let Err(e) = &result {
            tracing::error!(conversation_id = %conversation_id, error = %e, "Inbound message dropped");
        }
        result
    }

    fn deliver<R: Renderer + ?Sized>(
        &mut self,
        conversation_id: &str,
        payload: &str,
        renderer: &mut R,
    ) -> ChatResult<()> {
        let connection = self
            .connections
            .iter()
            .find(|c| c.conversation_id == conversation_id)
            .ok_or_else(|| ChatError::UnknownContainer(conversation_id.to_string()))?;

        let text = match self.framing {
            Framing::PlainText => payload.to_string(),
            Framing::Json => serde_json::from_str::<InboundFrame>(payload)?.response,
        };

        tracing::debug!(conversation_id = %conversation_id, "Message from server");
        renderer.append_message(&connection.key, &text, Role::Assistant)
    }

    /// Socket of `conversation_id` finished its handshake
    pub fn opened(&self, conversation_id: &str) {
        tracing::info!(conversation_id = %conversation_id, "Connected to WebSocket server");
    }

    /// Socket of `conversation_id` went away. It is not reopened.
    pub fn closed(&self, conversation_id: &str) {
        tracing::warn!(conversation_id = %conversation_id, "WebSocket closed");
    }
}
