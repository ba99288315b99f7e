//! Test fixtures for integration tests.
//!
//! Starts the full router in-process on an ephemeral port, backed by an
//! in-memory SQLite log.

#![allow(dead_code)]

use std::{net::SocketAddr, path::PathBuf, sync::Arc, time::Duration};

use futures_util::{SinkExt, StreamExt};
use heya_server::{
    config::SessionSettings,
    infrastructure::repository::{InMemoryRoomRegistry, SqliteMessageRepository},
    ui::{serve, state::AppState},
};
use tokio::{net::TcpListener, sync::oneshot};
use tokio_tungstenite::{MaybeTlsStream, WebSocketStream, connect_async, tungstenite::Message};

pub type WsClient = WebSocketStream<MaybeTlsStream<tokio::net::TcpStream>>;

/// How to start a [`TestServer`]
#[derive(Default)]
pub struct TestServerOptions {
    pub settings: SessionSettings,
    pub static_dir: Option<PathBuf>,
    /// Defaults to a fresh in-memory log
    pub repository: Option<Arc<SqliteMessageRepository>>,
}

/// In-process test server; shut down when dropped
pub struct TestServer {
    addr: SocketAddr,
    registry: Arc<InMemoryRoomRegistry>,
    shutdown: Option<oneshot::Sender<()>>,
}

/// Fresh in-memory message log
pub async fn open_log() -> Arc<SqliteMessageRepository> {
    Arc::new(
        SqliteMessageRepository::connect("sqlite::memory:")
            .await
            .expect("Failed to open in-memory message log"),
    )
}

impl TestServer {
    pub async fn start() -> Self {
        Self::start_with(TestServerOptions::default()).await
    }

    pub async fn start_with(options: TestServerOptions) -> Self {
        let repository = match options.repository {
            Some(repository) => repository,
            None => open_log().await,
        };
        let registry = Arc::new(InMemoryRoomRegistry::new());
        let state = Arc::new(AppState::new(
            registry.clone(),
            repository,
            options.settings,
        ));

        let listener = TcpListener::bind("127.0.0.1:0")
            .await
            .expect("Failed to bind test listener");
        let addr = listener.local_addr().expect("Failed to read local address");

        let (shutdown_tx, shutdown_rx) = oneshot::channel::<()>();
        let static_dir = options.static_dir;
        tokio::spawn(async move {
            let shutdown = async {
                let _ = shutdown_rx.await;
            };
            if let Err(e) = serve(listener, state, static_dir.as_deref(), shutdown).await {
                eprintln!("test server error: {e}");
            }
        });

        Self {
            addr,
            registry,
            shutdown: Some(shutdown_tx),
        }
    }

    /// Live membership of the server
    pub fn registry(&self) -> &Arc<InMemoryRoomRegistry> {
        &self.registry
    }

    pub fn base_url(&self) -> String {
        format!("http://{}", self.addr)
    }

    pub fn ws_url(&self, username: &str, room: &str) -> String {
        format!("ws://{}/ws?username={}&room={}", self.addr, username, room)
    }

    /// Connect and consume the welcome notice
    pub async fn connect(&self, username: &str, room: &str) -> WsClient {
        let (mut ws, _) = connect_async(self.ws_url(username, room))
            .await
            .expect("Failed to connect");
        let welcome = next_event(&mut ws).await;
        assert_eq!(welcome["type"], "system");
        ws
    }
}

impl Drop for TestServer {
    fn drop(&mut self) {
        if let Some(tx) = self.shutdown.take() {
            let _ = tx.send(());
        }
    }
}

/// Send a chat line
pub async fn send_text(ws: &mut WsClient, text: &str) {
    ws.send(Message::text(text))
        .await
        .expect("Failed to send message");
}

/// Next JSON event, skipping control frames; panics after 5 seconds
pub async fn next_event(ws: &mut WsClient) -> serde_json::Value {
    tokio::time::timeout(Duration::from_secs(5), async {
        loop {
            let frame = ws
                .next()
                .await
                .expect("Connection closed")
                .expect("Failed to read frame");
            if let Message::Text(text) = frame {
                return serde_json::from_str(text.as_str()).expect("Invalid JSON event");
            }
        }
    })
    .await
    .expect("Timed out waiting for event")
}

/// Asserts that nothing arrives within `wait`
pub async fn assert_silent(ws: &mut WsClient, wait: Duration) {
    if let Ok(Some(Ok(Message::Text(text)))) = tokio::time::timeout(wait, ws.next()).await {
        panic!("unexpected event: {text}");
    }
}
