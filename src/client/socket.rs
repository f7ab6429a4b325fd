//! Native WebSocket connector.
//!
//! Each socket runs in its own tokio task. Events from all sockets funnel
//! into one channel so the task owning the [`Session`] handles them one at
//! a time, the way a browser event loop would.

use futures_util::{SinkExt, StreamExt};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tokio::sync::mpsc;
use tokio_tungstenite::tungstenite::Message;

use crate::error::{ChatError, ChatResult};
use crate::render::Renderer;
use crate::session::{Connector, Session, SocketHandle};

/// Something that happened on one socket
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SocketEvent {
    Opened { conversation_id: String },
    Message { conversation_id: String, text: String },
    Closed { conversation_id: String },
}

impl SocketEvent {
    /// Hand the event to the session it belongs to
    pub fn dispatch<R: Renderer + ?Sized>(self, session: &mut Session<WsSocket>, renderer: &mut R) {
        match self {
            SocketEvent::Opened { conversation_id } => session.opened(&conversation_id),
            SocketEvent::Message {
                conversation_id,
                text,
            } => {
                // Logged by the session
                let _ = session.receive(&conversation_id, &text, renderer);
            }
            SocketEvent::Closed { conversation_id } => session.closed(&conversation_id),
        }
    }
}

/// Handle to a socket task
#[derive(Debug)]
pub struct WsSocket {
    outbound: mpsc::UnboundedSender<String>,
    open: Arc<AtomicBool>,
}

impl SocketHandle for WsSocket {
    fn is_open(&self) -> bool {
        self.open.load(Ordering::SeqCst)
    }

    fn send_text(&self, text: &str) -> ChatResult<()> {
        if !self.is_open() {
            return Err(ChatError::NotConnected);
        }
        self.outbound
            .send(text.to_string())
            .map_err(|_| ChatError::Socket("socket task has stopped".to_string()))
    }
}

/// Opens sockets on the current tokio runtime
#[derive(Clone)]
pub struct WsConnector {
    events: mpsc::UnboundedSender<SocketEvent>,
}

impl WsConnector {
    /// Create a connector and the receiving end of its event stream
    pub fn new() -> (Self, mpsc::UnboundedReceiver<SocketEvent>) {
        let (events, rx) = mpsc::unbounded_channel();
        (Self { events }, rx)
    }
}

impl Connector for WsConnector {
    type Socket = WsSocket;

    fn connect(&mut self, url: &str, conversation_id: &str) -> ChatResult<WsSocket> {
        let runtime = tokio::runtime::Handle::try_current()
            .map_err(|e| ChatError::Socket(format!("no async runtime: {}", e)))?;

        let (outbound, outbound_rx) = mpsc::unbounded_channel();
        let open = Arc::new(AtomicBool::new(false));

        runtime.spawn(run_socket(
            url.to_string(),
            conversation_id.to_string(),
            Arc::clone(&open),
            outbound_rx,
            self.events.clone(),
        ));

        Ok(WsSocket { outbound, open })
    }
}

/// Drive one socket until either side closes it
async fn run_socket(
    url: String,
    conversation_id: String,
    open: Arc<AtomicBool>,
    mut outbound: mpsc::UnboundedReceiver<String>,
    events: mpsc::UnboundedSender<SocketEvent>,
) {
    let stream = match tokio_tungstenite::connect_async(url.as_str()).await {
        Ok((stream, _)) => stream,
        Err(e) => {
            tracing::error!(url = %url, error = %e, "WebSocket connection failed");
            let _ = events.send(SocketEvent::Closed { conversation_id });
            return;
        }
    };

    let (mut sink, mut source) = stream.split();
    open.store(true, Ordering::SeqCst);
    let _ = events.send(SocketEvent::Opened {
        conversation_id: conversation_id.clone(),
    });

    loop {
        tokio::select! {
            text = outbound.recv() => {
                match text {
                    Some(text) => {
                        if let Err(e) = sink.send(Message::Text(text)).await {
                            tracing::debug!(conversation_id = %conversation_id, error = %e, "WebSocket send failed");
                            break;
                        }
                    }
                    None => {
                        // Session dropped its handle
                        let _ = sink.send(Message::Close(None)).await;
                        break;
                    }
                }
            }
            frame = source.next() => {
                match frame {
                    Some(Ok(Message::Text(text))) => {
                        let _ = events.send(SocketEvent::Message {
                            conversation_id: conversation_id.clone(),
                            text,
                        });
                    }
                    Some(Ok(Message::Close(_))) | None => break,
                    Some(Ok(_)) => {}
                    Some(Err(e)) => {
                        tracing::debug!(conversation_id = %conversation_id, error = %e, "WebSocket receive error");
                        break;
                    }
                }
            }
        }
    }

    open.store(false, Ordering::SeqCst);
    let _ = events.send(SocketEvent::Closed { conversation_id });
}
