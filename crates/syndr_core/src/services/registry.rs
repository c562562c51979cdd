//! Connection registry: the identifier-to-session map shared across the app.
//!
//! Every status change of a registered session is broadcast to subscribers.
//! A closing session removes its own entry in the same critical section
//! that moves it to a terminal state, so a lookup never returns a session
//! that is already closed.

use crate::error::Result;
use crate::models::{ConnectionConfig, ConnectionId, StatusNotification};
use crate::services::session::{Registration, Session};

use parking_lot::RwLock;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::broadcast;

/// Buffered notifications per subscriber before the oldest are dropped.
const STATUS_CHANNEL_CAPACITY: usize = 64;

pub(crate) struct RegistryInner {
    sessions: RwLock<HashMap<ConnectionId, Arc<Session>>>,
    status_tx: broadcast::Sender<StatusNotification>,
}

impl RegistryInner {
    /// Run `close` under the map's write lock and drop the entry if it
    /// reports a transition.
    pub(crate) fn remove_with(&self, id: &ConnectionId, close: impl FnOnce() -> bool) -> bool {
        let mut sessions = self.sessions.write();
        let closed = close();
        if closed {
            sessions.remove(id);
        }
        closed
    }

    pub(crate) fn notify(&self, notification: StatusNotification) {
        tracing::debug!(
            connection_id = %notification.connection_id,
            status = ?notification.status,
            "Status notification"
        );
        // No subscribers is fine.
        let _ = self.status_tx.send(notification);
    }
}

/// Registry of live sessions keyed by [`ConnectionId`].
///
/// Cheap to clone; clones share the same map and status channel.
#[derive(Clone)]
pub struct ConnectionRegistry {
    inner: Arc<RegistryInner>,
}

impl ConnectionRegistry {
    pub fn new() -> Self {
        let (status_tx, _) = broadcast::channel(STATUS_CHANNEL_CAPACITY);
        Self {
            inner: Arc::new(RegistryInner { sessions: RwLock::new(HashMap::new()), status_tx }),
        }
    }

    /// Subscribe to connection status notifications.
    pub fn subscribe(&self) -> broadcast::Receiver<StatusNotification> {
        self.inner.status_tx.subscribe()
    }

    /// Register a ready session under a fresh identifier.
    ///
    /// Emits a "connected" notification carrying the welcome text.
    pub fn register(&self, session: Session) -> Result<ConnectionId> {
        let id = ConnectionId::mint();
        let session = Arc::new(session);
        {
            let mut sessions = self.inner.sessions.write();
            session.shared().attach(Registration {
                id: id.clone(),
                registry: Arc::downgrade(&self.inner),
            })?;
            sessions.insert(id.clone(), session.clone());
        }

        tracing::info!(
            connection_id = %id,
            url = %session.config().display_url(),
            "Session registered"
        );
        self.inner
            .notify(StatusNotification::connected(id.clone(), session.welcome_message()));
        Ok(id)
    }

    /// Look up a live session.
    pub fn lookup(&self, id: &ConnectionId) -> Option<Arc<Session>> {
        self.inner.sessions.read().get(id).cloned()
    }

    /// Drop an entry without closing its session. Returns the session if
    /// it was registered.
    pub fn remove(&self, id: &ConnectionId) -> Option<Arc<Session>> {
        let removed = self.inner.sessions.write().remove(id);
        if let Some(session) = &removed {
            session.shared().detach();
        }
        removed
    }

    /// Identifiers of all live sessions.
    pub fn ids(&self) -> Vec<ConnectionId> {
        self.inner.sessions.read().keys().cloned().collect()
    }

    pub fn len(&self) -> usize {
        self.inner.sessions.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.sessions.read().is_empty()
    }

    /// Open, authenticate and register a session.
    pub async fn connect(&self, config: ConnectionConfig) -> Result<ConnectionId> {
        let session = Session::connect(config).await?;
        self.register(session)
    }

    /// Close a registered session. Returns false if the id is unknown.
    pub async fn disconnect(&self, id: &ConnectionId) -> bool {
        match self.lookup(id) {
            Some(session) => {
                session.disconnect().await;
                true
            }
            None => false,
        }
    }

    /// Close every registered session.
    pub async fn disconnect_all(&self) {
        let sessions: Vec<Arc<Session>> = self.inner.sessions.read().values().cloned().collect();
        for session in sessions {
            session.disconnect().await;
        }
    }
}

impl Default for ConnectionRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for ConnectionRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ConnectionRegistry").field("sessions", &self.len()).finish()
    }
}
