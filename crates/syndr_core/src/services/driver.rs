//! Driver facade: the four operations test procedures and the shell use.

use crate::error::{Result, SyndrError};
use crate::models::{ConnectionConfig, ConnectionId, QueryResult};
use crate::services::registry::ConnectionRegistry;
use crate::services::session::Session;

use async_trait::async_trait;
use std::sync::Arc;

/// Database access as seen by test procedures.
///
/// `SyndrDriver` is the production implementation; test doubles implement
/// the same trait.
#[async_trait]
pub trait DatabaseDriver: Send + Sync {
    /// Open and authenticate a session.
    ///
    /// Returns `Ok(false)` when the server could not be reached or rejected
    /// the credentials.
    async fn connect(&self, config: ConnectionConfig) -> Result<bool>;

    /// Close the active session, if any.
    async fn disconnect(&self);

    /// Execute a query on the active session.
    async fn execute_query(&self, query: &str) -> Result<QueryResult>;

    /// Connect, authenticate and immediately close without keeping state.
    async fn test_connection(&self, config: ConnectionConfig) -> bool;
}

struct ActiveConnection {
    id: ConnectionId,
    config: ConnectionConfig,
}

/// Driver bound to one session held in a [`ConnectionRegistry`].
pub struct SyndrDriver {
    registry: ConnectionRegistry,
    active: tokio::sync::Mutex<Option<ActiveConnection>>,
}

impl SyndrDriver {
    pub fn new(registry: ConnectionRegistry) -> Self {
        Self { registry, active: tokio::sync::Mutex::new(None) }
    }

    /// Get the registry this driver registers its session in.
    pub fn registry(&self) -> &ConnectionRegistry {
        &self.registry
    }

    /// Check if the active session is still live.
    pub async fn is_connected(&self) -> bool {
        self.session().await.is_ok()
    }

    /// Get the identifier of the active session.
    pub async fn connection_id(&self) -> Option<ConnectionId> {
        let active = self.active.lock().await;
        active
            .as_ref()
            .filter(|a| self.registry.lookup(&a.id).is_some())
            .map(|a| a.id.clone())
    }

    /// Get the configuration of the active session.
    pub async fn config(&self) -> Option<ConnectionConfig> {
        let active = self.active.lock().await;
        active
            .as_ref()
            .filter(|a| self.registry.lookup(&a.id).is_some())
            .map(|a| a.config.clone())
    }

    /// Resolve the active session, forgetting it if it has closed.
    async fn session(&self) -> Result<Arc<Session>> {
        let mut active = self.active.lock().await;
        let Some(current) = active.as_ref() else {
            return Err(SyndrError::NotConnected);
        };
        match self.registry.lookup(&current.id) {
            Some(session) => Ok(session),
            None => {
                tracing::debug!(connection_id = %current.id, "Active session is gone");
                *active = None;
                Err(SyndrError::NotConnected)
            }
        }
    }
}

#[async_trait]
impl DatabaseDriver for SyndrDriver {
    async fn connect(&self, config: ConnectionConfig) -> Result<bool> {
        let mut active = self.active.lock().await;
        if let Some(current) = active.as_ref() {
            if self.registry.lookup(&current.id).is_some() {
                return Err(SyndrError::AlreadyConnected);
            }
            *active = None;
        }

        match self.registry.connect(config.clone()).await {
            Ok(id) => {
                *active = Some(ActiveConnection { id, config });
                Ok(true)
            }
            Err(e) if e.is_session_fatal() => {
                tracing::warn!(
                    hostname = %config.hostname,
                    port = config.port,
                    error = %e,
                    "Connect failed"
                );
                Ok(false)
            }
            Err(e) => Err(e),
        }
    }

    async fn disconnect(&self) {
        let taken = self.active.lock().await.take();
        if let Some(active) = taken {
            self.registry.disconnect(&active.id).await;
        }
    }

    async fn execute_query(&self, query: &str) -> Result<QueryResult> {
        let session = self.session().await?;
        session.execute(query).await
    }

    async fn test_connection(&self, config: ConnectionConfig) -> bool {
        let hostname = config.hostname.clone();
        match Session::connect(config).await {
            Ok(session) => {
                session.disconnect().await;
                true
            }
            Err(e) => {
                tracing::info!(hostname = %hostname, error = %e, "Connection test failed");
                false
            }
        }
    }
}

impl std::fmt::Debug for SyndrDriver {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SyndrDriver").field("registry", &self.registry).finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_execute_without_session_is_not_connected() {
        let driver = SyndrDriver::new(ConnectionRegistry::new());
        let err = driver.execute_query("SELECT DOCUMENTS FROM \"Authors\";").await.unwrap_err();
        assert!(matches!(err, SyndrError::NotConnected));
        assert!(!driver.is_connected().await);
        assert!(driver.connection_id().await.is_none());
    }

    #[tokio::test]
    async fn test_invalid_config_is_an_error_not_false() {
        let driver = SyndrDriver::new(ConnectionRegistry::new());
        let config = ConnectionConfig::new("bad", "", 1776, "testdb", "root", "pw");
        let err = driver.connect(config).await.unwrap_err();
        assert!(matches!(err, SyndrError::Config { .. }));
    }

    #[tokio::test]
    async fn test_disconnect_without_session_is_a_no_op() {
        let driver = SyndrDriver::new(ConnectionRegistry::new());
        driver.disconnect().await;
        assert!(driver.registry().is_empty());
    }
}
