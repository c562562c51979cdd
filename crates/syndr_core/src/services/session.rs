//! One authenticated stream connection to a SyndrDB server.
//!
//! The socket is split: a reader task owns the read half and feeds every
//! received byte into the session's [`Correlator`]; callers write through the
//! write half. The wire carries no request ids, so a session serves one query
//! at a time. Concurrent callers queue on a FIFO lock.

use crate::error::{Result, SyndrError};
use crate::models::{
    ConnectionConfig, ConnectionId, QueryResult, SessionState, StatusNotification,
};
use crate::protocol::{
    auth_line, classify_handshake, is_frame_complete, parse, query_line, HandshakeReply,
};
use crate::services::registry::RegistryInner;

use chrono::{DateTime, Utc};
use std::io;
use std::sync::{Arc, Weak};
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::tcp::{OwnedReadHalf, OwnedWriteHalf};
use tokio::net::{lookup_host, TcpSocket, TcpStream};
use tokio::sync::oneshot;
use tokio::task::JoinHandle;
use tokio::time::Instant;

/// Read buffer size for the reader task.
const READ_CHUNK_SIZE: usize = 8 * 1024;

/// Unclaimed bytes kept while no query is waiting.
const MAX_STALE_BYTES: usize = 64 * 1024;

type FrameReply = Result<Vec<u8>>;

/// Matches received bytes to the single waiting caller.
#[derive(Default)]
struct Correlator {
    /// Bytes received since the current waiter was installed
    buffer: Vec<u8>,
    /// The caller waiting for the next complete frame
    waiter: Option<oneshot::Sender<FrameReply>>,
    /// Set once the socket is gone; no frame will ever arrive again
    closed: Option<String>,
}

impl Correlator {
    /// Install a waiter for the next complete frame.
    ///
    /// With `keep_carry` the bytes left over from the previous frame count
    /// towards this one; otherwise they are stale and dropped.
    fn await_frame(&mut self, keep_carry: bool) -> Result<oneshot::Receiver<FrameReply>> {
        if let Some(reason) = &self.closed {
            return Err(SyndrError::transport(reason.clone()));
        }
        if self.waiter.is_some() {
            return Err(SyndrError::Busy);
        }
        if !keep_carry && !self.buffer.is_empty() {
            tracing::trace!(bytes = self.buffer.len(), "Discarding unclaimed bytes");
            self.buffer.clear();
        }

        let (tx, rx) = oneshot::channel();
        self.waiter = Some(tx);
        self.try_deliver();
        Ok(rx)
    }

    fn on_bytes(&mut self, chunk: &[u8]) {
        self.buffer.extend_from_slice(chunk);
        if self.waiter.is_some() {
            self.try_deliver();
        } else if self.buffer.len() > MAX_STALE_BYTES {
            tracing::trace!(bytes = self.buffer.len(), "Dropping unclaimed bytes");
            self.buffer.clear();
        }
    }

    /// Hand everything up to the last line terminator to the waiter.
    fn try_deliver(&mut self) {
        if !is_frame_complete(&self.buffer) {
            return;
        }
        let Some(waiter) = self.waiter.take() else {
            return;
        };
        let end = self
            .buffer
            .iter()
            .rposition(|b| matches!(b, b'\n' | b'\r'))
            .map_or(self.buffer.len(), |pos| pos + 1);
        let frame: Vec<u8> = self.buffer.drain(..end).collect();
        // The receiver may have timed out already.
        let _ = waiter.send(Ok(frame));
    }

    fn cancel(&mut self) {
        self.waiter = None;
    }

    /// Fail the current waiter and refuse all later ones.
    fn fail(&mut self, reason: &str) {
        if let Some(waiter) = self.waiter.take() {
            let _ = waiter.send(Err(SyndrError::transport(reason)));
        }
        self.buffer.clear();
        self.closed.get_or_insert_with(|| reason.to_string());
    }
}

/// Where a registered session lives.
#[derive(Clone)]
pub(crate) struct Registration {
    pub(crate) id: ConnectionId,
    pub(crate) registry: Weak<RegistryInner>,
}

struct Lifecycle {
    state: SessionState,
    registration: Option<Registration>,
}

/// State shared between a session and its reader task.
pub(crate) struct SessionShared {
    lifecycle: parking_lot::Mutex<Lifecycle>,
    correlator: parking_lot::Mutex<Correlator>,
}

impl SessionShared {
    fn new() -> Self {
        Self {
            lifecycle: parking_lot::Mutex::new(Lifecycle {
                state: SessionState::Idle,
                registration: None,
            }),
            correlator: parking_lot::Mutex::new(Correlator::default()),
        }
    }

    pub(crate) fn state(&self) -> SessionState {
        self.lifecycle.lock().state
    }

    pub(crate) fn connection_id(&self) -> Option<ConnectionId> {
        self.lifecycle.lock().registration.as_ref().map(|r| r.id.clone())
    }

    /// Move to a non-terminal state. Returns false for illegal transitions.
    fn transition(&self, next: SessionState) -> bool {
        let mut lifecycle = self.lifecycle.lock();
        let current = lifecycle.state;
        if !current.can_transition_to(next) {
            tracing::warn!(from = %current, to = %next, "Ignoring illegal session transition");
            return false;
        }
        lifecycle.state = next;
        tracing::debug!(from = %current, to = %next, "Session transition");
        true
    }

    /// Move a ready session to `Closing`. Returns false in any other state.
    fn begin_close(&self) -> bool {
        let mut lifecycle = self.lifecycle.lock();
        if lifecycle.state != SessionState::Ready {
            return false;
        }
        tracing::debug!(from = %lifecycle.state, to = %SessionState::Closing, "Session transition");
        lifecycle.state = SessionState::Closing;
        true
    }

    /// Record the registry entry. Fails if the session already closed.
    ///
    /// Called with the registry's write lock held.
    pub(crate) fn attach(&self, registration: Registration) -> Result<()> {
        let mut lifecycle = self.lifecycle.lock();
        if lifecycle.state != SessionState::Ready {
            return Err(SyndrError::transport(format!(
                "Session is {} and cannot be registered",
                lifecycle.state
            )));
        }
        lifecycle.registration = Some(registration);
        Ok(())
    }

    /// Forget the registry entry after an explicit `remove`.
    pub(crate) fn detach(&self) {
        self.lifecycle.lock().registration = None;
    }

    fn set_terminal(&self, terminal: SessionState) -> bool {
        let mut lifecycle = self.lifecycle.lock();
        if lifecycle.state.is_terminal() {
            return false;
        }
        tracing::debug!(from = %lifecycle.state, to = %terminal, "Session transition");
        lifecycle.state = terminal;
        true
    }

    /// Enter a terminal state, removing the registry entry in the same
    /// critical section. Returns false if the session was already terminal.
    fn finish(&self, terminal: SessionState, error: Option<String>) -> bool {
        loop {
            let registration = {
                let lifecycle = self.lifecycle.lock();
                if lifecycle.state.is_terminal() {
                    return false;
                }
                lifecycle.registration.clone()
            };

            let Some(registration) = registration else {
                let mut lifecycle = self.lifecycle.lock();
                if lifecycle.registration.is_some() {
                    // Registered in the meantime; take the registry path.
                    continue;
                }
                if lifecycle.state.is_terminal() {
                    return false;
                }
                tracing::debug!(from = %lifecycle.state, to = %terminal, "Session transition");
                lifecycle.state = terminal;
                return true;
            };

            let Some(registry) = registration.registry.upgrade() else {
                return self.set_terminal(terminal);
            };

            let closed = registry.remove_with(&registration.id, || self.set_terminal(terminal));
            if closed {
                tracing::info!(connection_id = %registration.id, error = ?error, "Session closed");
                registry.notify(StatusNotification::disconnected(registration.id, error));
            }
            return closed;
        }
    }

    /// Reader-side reaction to EOF or a socket error.
    fn on_socket_closed(&self, error: Option<String>) {
        let state = self.state();
        let (terminal, error) = match state {
            SessionState::Connecting | SessionState::Authenticating => (
                SessionState::Errored,
                Some(error.unwrap_or_else(|| "Connection closed during handshake".to_string())),
            ),
            // Our own shutdown; not a failure.
            SessionState::Closing => (SessionState::Closed, None),
            _ => (
                SessionState::Closed,
                Some(error.unwrap_or_else(|| "Connection closed by server".to_string())),
            ),
        };

        let message = error.clone().unwrap_or_else(|| "Connection closed".to_string());
        self.correlator.lock().fail(&message);
        self.finish(terminal, error);
    }
}

async fn read_loop(mut reader: OwnedReadHalf, shared: Arc<SessionShared>) {
    let mut chunk = vec![0u8; READ_CHUNK_SIZE];
    loop {
        match reader.read(&mut chunk).await {
            Ok(0) => {
                tracing::debug!("Server closed the stream");
                shared.on_socket_closed(None);
                break;
            }
            Ok(n) => shared.correlator.lock().on_bytes(&chunk[..n]),
            Err(e) => {
                tracing::warn!(error = %e, "Socket read failed");
                shared.on_socket_closed(Some(e.to_string()));
                break;
            }
        }
    }
}

/// Resolve `hostname` and open a keep-alive TCP stream to the first address
/// that accepts.
async fn dial(hostname: &str, port: u16) -> io::Result<TcpStream> {
    let mut last_error = None;
    for addr in lookup_host((hostname, port)).await? {
        let socket = if addr.is_ipv4() { TcpSocket::new_v4()? } else { TcpSocket::new_v6()? };
        socket.set_keepalive(true)?;
        match socket.connect(addr).await {
            Ok(stream) => return Ok(stream),
            Err(e) => last_error = Some(e),
        }
    }
    Err(last_error.unwrap_or_else(|| {
        io::Error::new(io::ErrorKind::NotFound, "hostname resolved to no addresses")
    }))
}

/// A live connection to a SyndrDB server.
pub struct Session {
    shared: Arc<SessionShared>,
    writer: tokio::sync::Mutex<OwnedWriteHalf>,
    /// Serializes queries; tokio's mutex is FIFO.
    query_lock: tokio::sync::Mutex<()>,
    reader: parking_lot::Mutex<Option<JoinHandle<()>>>,
    config: Arc<ConnectionConfig>,
    welcome_message: String,
    connected_at: DateTime<Utc>,
}

impl Session {
    /// Open a stream socket and run the authentication handshake.
    ///
    /// On success the session is `Ready`; it is not registered anywhere yet.
    pub async fn connect(config: ConnectionConfig) -> Result<Self> {
        config.validate().map_err(SyndrError::config)?;

        let shared = Arc::new(SessionShared::new());
        shared.transition(SessionState::Connecting);

        let options = &config.options;
        let dialing = dial(&config.hostname, config.port);
        let stream = match tokio::time::timeout(options.connect_timeout, dialing).await {
            Ok(Ok(stream)) => stream,
            Ok(Err(e)) => {
                shared.set_terminal(SessionState::Errored);
                tracing::warn!(
                    hostname = %config.hostname,
                    port = config.port,
                    error = %e,
                    "Connection failed"
                );
                return Err(SyndrError::transport_with_source(
                    format!("Failed to connect to {}:{}", config.hostname, config.port),
                    e,
                ));
            }
            Err(_) => {
                shared.set_terminal(SessionState::Errored);
                tracing::warn!(
                    hostname = %config.hostname,
                    port = config.port,
                    "Connection timed out"
                );
                return Err(SyndrError::transport(format!(
                    "Connection to {}:{} timed out after {}s",
                    config.hostname,
                    config.port,
                    options.connect_timeout.as_secs()
                )));
            }
        };
        if let Err(e) = stream.set_nodelay(true) {
            tracing::debug!(error = %e, "Could not disable send coalescing");
        }

        let (read_half, write_half) = stream.into_split();
        let reader = tokio::spawn(read_loop(read_half, shared.clone()));

        let mut session = Self {
            shared,
            writer: tokio::sync::Mutex::new(write_half),
            query_lock: tokio::sync::Mutex::new(()),
            reader: parking_lot::Mutex::new(Some(reader)),
            config: Arc::new(config),
            welcome_message: String::new(),
            connected_at: Utc::now(),
        };

        if !session.shared.transition(SessionState::Authenticating) {
            session.teardown(SessionState::Errored, None).await;
            return Err(SyndrError::transport("Connection closed during handshake"));
        }
        match session.authenticate().await {
            Ok(welcome) if session.shared.transition(SessionState::Ready) => {
                tracing::info!(
                    hostname = %session.config.hostname,
                    database = %session.config.database,
                    "Authenticated with SyndrDB server"
                );
                session.welcome_message = welcome;
                session.connected_at = Utc::now();
                Ok(session)
            }
            Ok(_) => Err(SyndrError::transport("Connection closed during handshake")),
            Err(e) => {
                tracing::warn!(hostname = %session.config.hostname, error = %e, "Handshake failed");
                session.teardown(SessionState::Errored, Some(e.to_string())).await;
                Err(e)
            }
        }
    }

    async fn authenticate(&self) -> Result<String> {
        let deadline = Instant::now() + self.config.options.auth_timeout;

        let mut reply = self.shared.correlator.lock().await_frame(false)?;
        self.write_line(&auth_line(&self.config))
            .await
            .map_err(|e| {
                SyndrError::transport_with_source("Failed to send authentication line", e)
            })?;

        loop {
            let frame = match tokio::time::timeout_at(deadline, reply).await {
                Ok(Ok(frame)) => frame?,
                Ok(Err(_)) => {
                    return Err(SyndrError::transport("Connection closed during handshake"))
                }
                Err(_) => {
                    self.shared.correlator.lock().cancel();
                    return Err(SyndrError::authentication_with_hint(
                        format!(
                            "No handshake reply within {}s",
                            self.config.options.auth_timeout.as_secs()
                        ),
                        "Check that the port belongs to a SyndrDB server",
                    ));
                }
            };

            let text = String::from_utf8_lossy(&frame);
            for line in text.split(['\n', '\r']).filter(|l| !l.trim().is_empty()) {
                match classify_handshake(line) {
                    HandshakeReply::Welcome(welcome) => return Ok(welcome),
                    HandshakeReply::Rejected(reason) => {
                        return Err(SyndrError::authentication(reason))
                    }
                    HandshakeReply::Noise => tracing::trace!(line, "Ignoring handshake noise"),
                }
            }

            reply = self.shared.correlator.lock().await_frame(true)?;
        }
    }

    async fn write_line(&self, line: &str) -> io::Result<()> {
        let mut writer = self.writer.lock().await;
        writer.write_all(line.as_bytes()).await?;
        writer.flush().await
    }

    /// Send one query and wait for its reply line.
    ///
    /// Calls on the same session are served one at a time in arrival order.
    /// A timeout fails only this call; the session stays `Ready`.
    ///
    /// The wire has no request ids. A reply that arrives after its query
    /// timed out is dropped only if it lands before the next query is sent;
    /// once the next query is waiting, the late reply is taken as its answer.
    pub async fn execute(&self, query: &str) -> Result<QueryResult> {
        let _turn = self.query_lock.lock().await;
        if !self.state().is_ready() {
            return Err(SyndrError::NotConnected);
        }

        let started = Instant::now();
        let reply = self.shared.correlator.lock().await_frame(false)?;

        if let Err(e) = self.write_line(&query_line(query)).await {
            tracing::warn!(
                connection_id = ?self.connection_id(),
                error = %e,
                "Failed to send query"
            );
            self.shared.correlator.lock().cancel();
            self.shared.finish(SessionState::Closed, Some(e.to_string()));
            return Err(SyndrError::transport_with_source("Failed to send query", e));
        }

        let timeout = self.config.options.query_timeout;
        let frame = match tokio::time::timeout(timeout, reply).await {
            Ok(Ok(frame)) => frame?,
            Ok(Err(_)) => {
                return Err(SyndrError::transport("Connection closed while waiting for response"))
            }
            Err(_) => {
                self.shared.correlator.lock().cancel();
                tracing::warn!(
                    connection_id = ?self.connection_id(),
                    timeout_ms = timeout.as_millis() as u64,
                    "Query timed out"
                );
                return Err(SyndrError::query_timeout(timeout));
            }
        };

        let elapsed_ms = started.elapsed().as_secs_f64() * 1000.0;
        let result = parse(&frame).with_execution_time(elapsed_ms);
        tracing::debug!(
            connection_id = ?self.connection_id(),
            success = result.success,
            records = result.row_count(),
            elapsed_ms,
            "Query completed"
        );
        Ok(result)
    }

    /// Close the session. Idempotent.
    pub async fn disconnect(&self) {
        if !self.shared.begin_close() {
            return;
        }
        self.teardown(SessionState::Closed, None).await;
    }

    async fn teardown(&self, terminal: SessionState, error: Option<String>) {
        self.shared.correlator.lock().fail("Connection closed");

        if let Err(e) = self.writer.lock().await.shutdown().await {
            tracing::debug!(error = %e, "Socket shutdown failed");
        }
        if let Some(reader) = self.reader.lock().take() {
            reader.abort();
        }
        self.shared.finish(terminal, error);
    }

    pub(crate) fn shared(&self) -> &SessionShared {
        &self.shared
    }

    /// Get the current lifecycle state.
    pub fn state(&self) -> SessionState {
        self.shared.state()
    }

    /// Get the registry identifier, once registered.
    pub fn connection_id(&self) -> Option<ConnectionId> {
        self.shared.connection_id()
    }

    /// Get the connection configuration.
    pub fn config(&self) -> &ConnectionConfig {
        &self.config
    }

    /// Get the welcome text the server sent during the handshake.
    pub fn welcome_message(&self) -> &str {
        &self.welcome_message
    }

    /// Get when the session became ready.
    pub fn connected_at(&self) -> DateTime<Utc> {
        self.connected_at
    }
}

impl Drop for Session {
    fn drop(&mut self) {
        if let Some(reader) = self.reader.get_mut().take() {
            reader.abort();
        }
    }
}

impl std::fmt::Debug for Session {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Session")
            .field("connection_id", &self.connection_id())
            .field("state", &self.state())
            .field("url", &self.config.display_url())
            .field("connected_at", &self.connected_at)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_correlator_delivers_on_first_terminator() {
        let mut correlator = Correlator::default();
        let mut rx = correlator.await_frame(false).unwrap();

        correlator.on_bytes(b"{\"success\":");
        assert!(rx.try_recv().is_err());

        correlator.on_bytes(b"true}\n");
        let frame = rx.try_recv().unwrap().unwrap();
        assert_eq!(frame, b"{\"success\":true}\n");
        assert!(correlator.buffer.is_empty());
    }

    #[test]
    fn test_correlator_rejects_second_waiter() {
        let mut correlator = Correlator::default();
        let _rx = correlator.await_frame(false).unwrap();
        assert!(matches!(correlator.await_frame(false), Err(SyndrError::Busy)));
    }

    #[test]
    fn test_stale_bytes_dropped_for_new_query() {
        let mut correlator = Correlator::default();
        correlator.on_bytes(b"late reply\n");

        let mut rx = correlator.await_frame(false).unwrap();
        assert!(rx.try_recv().is_err());

        correlator.on_bytes(b"fresh\n");
        assert_eq!(rx.try_recv().unwrap().unwrap(), b"fresh\n");
    }

    #[test]
    fn test_carry_kept_for_handshake_continuation() {
        let mut correlator = Correlator::default();
        let mut rx = correlator.await_frame(false).unwrap();
        correlator.on_bytes(b"banner\nWel");
        assert_eq!(rx.try_recv().unwrap().unwrap(), b"banner\n");

        let mut rx = correlator.await_frame(true).unwrap();
        correlator.on_bytes(b"come\n");
        assert_eq!(rx.try_recv().unwrap().unwrap(), b"Welcome\n");
    }

    #[test]
    fn test_fail_reaches_waiter() {
        let mut correlator = Correlator::default();
        let mut rx = correlator.await_frame(false).unwrap();
        correlator.fail("reset");
        assert!(matches!(rx.try_recv().unwrap(), Err(SyndrError::Transport { .. })));
    }

    #[test]
    fn test_late_reply_reaches_next_waiter() {
        let mut correlator = Correlator::default();
        let _timed_out = correlator.await_frame(false).unwrap();
        correlator.cancel();

        let mut next = correlator.await_frame(false).unwrap();
        correlator.on_bytes(b"reply to the first query\n");
        assert_eq!(next.try_recv().unwrap().unwrap(), b"reply to the first query\n");
    }

    #[test]
    fn test_closed_correlator_refuses_new_waiters() {
        let mut correlator = Correlator::default();
        correlator.fail("Connection closed by server");

        let err = correlator.await_frame(true).unwrap_err();
        assert!(matches!(err, SyndrError::Transport { .. }));
        assert!(err.to_string().contains("Connection closed by server"));
    }

    #[test]
    fn test_cancelled_waiter_leaves_bytes_unclaimed() {
        let mut correlator = Correlator::default();
        let _rx = correlator.await_frame(false).unwrap();
        correlator.cancel();
        correlator.on_bytes(b"too late\n");
        assert!(correlator.waiter.is_none());
        assert_eq!(correlator.buffer, b"too late\n");
    }

    #[test]
    fn test_unregistered_finish_sets_terminal_once() {
        let shared = SessionShared::new();
        assert!(shared.transition(SessionState::Connecting));
        assert!(shared.finish(SessionState::Errored, None));
        assert!(!shared.finish(SessionState::Closed, None));
        assert_eq!(shared.state(), SessionState::Errored);
    }

    #[test]
    fn test_attach_requires_ready() {
        let shared = SessionShared::new();
        let registration = Registration { id: ConnectionId::mint(), registry: Weak::new() };
        assert!(shared.attach(registration).is_err());
    }
}
