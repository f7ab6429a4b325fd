//! Client against the development backend over real sockets.

#![cfg(feature = "native")]

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::mpsc::UnboundedReceiver;
use tokio::time::timeout;

use mmchat::backend::{build_router, BackendState, EchoResponder};
use mmchat::client::{ApiClient, PathNavigator, SocketEvent, WsConnector, WsSocket};
use mmchat::config::BackendConfig;
use mmchat::create::CreateRequest;
use mmchat::protocol::{ChatMode, Endpoints, Role};
use mmchat::render::MemoryRenderer;
use mmchat::route::PageRoute;
use mmchat::session::Session;
use mmchat::store::{ClientStore, FileStore, MemoryStore};

const WAIT: Duration = Duration::from_secs(5);

async fn start_backend() -> Endpoints {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let state = BackendState::new(BackendConfig::default(), Arc::new(EchoResponder));

    tokio::spawn(async move {
        axum::serve(listener, build_router(state)).await.unwrap();
    });

    Endpoints::from_http_base(&format!("http://{}", addr))
}

/// Dispatch events until `count` of them satisfy `wanted`
async fn pump(
    events: &mut UnboundedReceiver<SocketEvent>,
    session: &mut Session<WsSocket>,
    renderer: &mut MemoryRenderer,
    count: usize,
    wanted: fn(&SocketEvent) -> bool,
) {
    let mut seen = 0;
    while seen < count {
        let event = timeout(WAIT, events.recv())
            .await
            .expect("timed out waiting for socket event")
            .expect("event channel closed");
        if wanted(&event) {
            seen += 1;
        }
        event.dispatch(session, renderer);
    }
}

fn is_opened(event: &SocketEvent) -> bool {
    matches!(event, SocketEvent::Opened { .. })
}

fn is_message(event: &SocketEvent) -> bool {
    matches!(event, SocketEvent::Message { .. })
}

fn is_closed(event: &SocketEvent) -> bool {
    matches!(event, SocketEvent::Closed { .. })
}

#[tokio::test]
async fn test_comparison_room_round_trip() {
    let endpoints = start_backend().await;
    let api = ApiClient::new(endpoints.clone(), WAIT).unwrap();
    let mut store = MemoryStore::new();
    let mut navigator = PathNavigator::new();

    let route = api
        .create(CreateRequest::Room(ChatMode::Comparison), &mut store, &mut navigator)
        .await
        .unwrap();
    assert_eq!(navigator.location(), route.path().as_deref());
    assert_eq!(store.load().unwrap().unwrap().conversations().len(), 2);

    let (mut connector, mut events) = WsConnector::new();
    let mut renderer = MemoryRenderer::new();
    let mut session = Session::bind(route, &endpoints, &store, &mut connector, &mut renderer);
    assert_eq!(session.connections().len(), 2);
    assert!(renderer.input_visible());

    pump(&mut events, &mut session, &mut renderer, 2, is_opened).await;
    assert_eq!(session.open_sockets(), 2);

    assert!(session.send("hello both", &mut renderer).is_sent());
    pump(&mut events, &mut session, &mut renderer, 2, is_message).await;

    let models: Vec<&str> = renderer.containers().iter().map(|c| c.label.as_str()).collect();
    assert_eq!(models, vec!["echo-small", "echo-large"]);

    for connection in session.connections() {
        let messages = renderer.messages(&connection.key);
        assert_eq!(messages.len(), 2);
        assert_eq!(messages[0].role, Role::User);
        assert_eq!(messages[1].role, Role::Assistant);
        assert_eq!(messages[1].text, "hello both");
    }
}

#[tokio::test]
async fn test_conversation_round_trip_with_file_store() {
    let endpoints = start_backend().await;
    let dir = tempfile::tempdir().unwrap();
    let api = ApiClient::new(endpoints.clone(), WAIT).unwrap();
    let mut store = FileStore::new(dir.path().join("state.json"));
    let mut navigator = PathNavigator::new();

    let route = api
        .create(CreateRequest::Conversation, &mut store, &mut navigator)
        .await
        .unwrap();
    assert!(matches!(route, PageRoute::Conversation { .. }));

    // A fresh page only has the path to go on
    let route = PageRoute::parse(navigator.location().unwrap());
    let (mut connector, mut events) = WsConnector::new();
    let mut renderer = MemoryRenderer::new();
    let mut session = Session::bind(route, &endpoints, &store, &mut connector, &mut renderer);

    pump(&mut events, &mut session, &mut renderer, 1, is_opened).await;

    for text in ["first", "second"] {
        assert!(session.send(text, &mut renderer).is_sent());
        pump(&mut events, &mut session, &mut renderer, 1, is_message).await;
    }

    assert_eq!(renderer.count(Role::User), 2);
    assert_eq!(renderer.count(Role::Assistant), 2);
    let messages = renderer.messages(&session.connections()[0].key);
    assert_eq!(messages[3].text, "second");
}

#[tokio::test]
async fn test_unknown_conversation_is_closed_by_server() {
    let endpoints = start_backend().await;
    let (mut connector, mut events) = WsConnector::new();
    let mut renderer = MemoryRenderer::new();
    let mut session = Session::bind(
        PageRoute::parse("/conversation/does-not-exist"),
        &endpoints,
        &MemoryStore::new(),
        &mut connector,
        &mut renderer,
    );

    pump(&mut events, &mut session, &mut renderer, 1, is_opened).await;
    assert!(session.send("anyone?", &mut renderer).is_sent());
    pump(&mut events, &mut session, &mut renderer, 1, is_closed).await;

    assert_eq!(session.open_sockets(), 0);
    assert_eq!(renderer.count(Role::Assistant), 0);
    assert!(!session.send("still there?", &mut renderer).is_sent());
}
