//! In-process mock SyndrDB server for session and driver tests.
//!
//! `MockSyndrServer` binds to an OS-assigned port, answers the
//! authentication line with a fixed handshake and then replies to each query
//! line through a caller-supplied handler.

#![allow(dead_code)]

use parking_lot::Mutex;
use std::sync::Arc;
use std::time::Duration;
use syndr_core::models::ConnectionConfig;
use syndr_core::models::StatusNotification;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::net::{TcpListener, TcpStream};
use tokio::sync::broadcast;
use tokio::task::JoinHandle;

pub const WELCOME: &str = "Welcome to testdb\n";

const RECV_TIMEOUT: Duration = Duration::from_secs(2);

/// What the server does with one query line.
pub enum Reply {
    /// Write these bytes
    Send(String),
    /// Never answer
    Silent,
    /// Drop the connection
    Close,
}

impl Reply {
    /// A reply line terminated by `\n`.
    pub fn line(text: impl Into<String>) -> Self {
        let mut text = text.into();
        text.push('\n');
        Reply::Send(text)
    }
}

type Handler = dyn Fn(&str) -> Reply + Send + Sync;

/// A scripted server bound to 127.0.0.1.
pub struct MockSyndrServer {
    port: u16,
    received: Arc<Mutex<Vec<String>>>,
    accept_task: JoinHandle<()>,
}

impl MockSyndrServer {
    /// Start a server that greets with `handshake` after the auth line.
    ///
    /// An empty handshake means the server never answers the auth line.
    pub async fn start<H>(handshake: &str, handler: H) -> Self
    where
        H: Fn(&str) -> Reply + Send + Sync + 'static,
    {
        Self::spawn(handshake, Arc::new(handler), false).await
    }

    /// Start a server that sends `handshake` and then drops the connection.
    pub async fn hanging_up(handshake: &str) -> Self {
        Self::spawn(handshake, Arc::new(|_: &str| Reply::Close), true).await
    }

    async fn spawn(handshake: &str, handler: Arc<Handler>, hang_up: bool) -> Self {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let port = listener.local_addr().unwrap().port();
        let received = Arc::new(Mutex::new(Vec::new()));
        let handshake = handshake.to_string();

        let accept_task = tokio::spawn({
            let received = received.clone();
            async move {
                while let Ok((stream, _)) = listener.accept().await {
                    tokio::spawn(serve(
                        stream,
                        handshake.clone(),
                        handler.clone(),
                        received.clone(),
                        hang_up,
                    ));
                }
            }
        });

        Self { port, received, accept_task }
    }

    /// Start a server that welcomes every client.
    pub async fn welcoming<H>(handler: H) -> Self
    where
        H: Fn(&str) -> Reply + Send + Sync + 'static,
    {
        Self::start(WELCOME, handler).await
    }

    pub fn port(&self) -> u16 {
        self.port
    }

    /// Lines received so far, auth lines included.
    pub fn received(&self) -> Vec<String> {
        self.received.lock().clone()
    }

    /// Connection config pointing at this server with short timeouts.
    pub fn config(&self) -> ConnectionConfig {
        ConnectionConfig::builder()
            .name("mock")
            .hostname("127.0.0.1")
            .port(self.port)
            .database("testdb")
            .username("root")
            .password("pw")
            .auth_timeout(Duration::from_millis(500))
            .query_timeout(Duration::from_millis(300))
            .build()
            .unwrap()
    }
}

impl Drop for MockSyndrServer {
    fn drop(&mut self) {
        self.accept_task.abort();
    }
}

async fn serve(
    stream: TcpStream,
    handshake: String,
    handler: Arc<Handler>,
    received: Arc<Mutex<Vec<String>>>,
    hang_up: bool,
) {
    let (read_half, mut write_half) = stream.into_split();
    let mut lines = BufReader::new(read_half).lines();

    let Ok(Some(auth)) = lines.next_line().await else {
        return;
    };
    received.lock().push(auth);
    if !handshake.is_empty() && write_half.write_all(handshake.as_bytes()).await.is_err() {
        return;
    }
    if hang_up {
        let _ = write_half.flush().await;
        return;
    }

    while let Ok(Some(line)) = lines.next_line().await {
        received.lock().push(line.clone());
        match handler(&line) {
            Reply::Send(bytes) => {
                if write_half.write_all(bytes.as_bytes()).await.is_err() {
                    break;
                }
            }
            Reply::Silent => {}
            Reply::Close => break,
        }
    }
}

/// Wait for the next status notification.
pub async fn next_status(rx: &mut broadcast::Receiver<StatusNotification>) -> StatusNotification {
    tokio::time::timeout(RECV_TIMEOUT, rx.recv())
        .await
        .expect("status notification timed out")
        .expect("status channel closed")
}
