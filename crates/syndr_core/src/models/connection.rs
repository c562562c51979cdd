//! Connection configuration, session lifecycle and status models.

use chrono::Utc;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::Duration;
use uuid::Uuid;

/// Delimiter between fields of the authentication line.
pub const AUTH_FIELD_DELIMITER: char = ':';

/// Terminating marker of the authentication line (before the newline).
pub const AUTH_TERMINATOR: char = ';';

/// Lifecycle state of a connection session.
///
/// `Idle → Connecting → Authenticating → Ready → Closing → Closed`, with
/// `Errored` reachable from `Connecting` or `Authenticating`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SessionState {
    /// Not yet started
    #[default]
    Idle,
    /// Opening the stream socket
    Connecting,
    /// Authentication line sent, waiting for the verdict
    Authenticating,
    /// Authenticated, accepting queries
    Ready,
    /// Disconnect requested
    Closing,
    /// Socket released
    Closed,
    /// Connect or handshake failed
    Errored,
}

impl SessionState {
    /// Check whether moving from `self` to `next` is a legal transition.
    pub fn can_transition_to(self, next: SessionState) -> bool {
        use SessionState::*;
        match (self, next) {
            (Idle, Connecting) => true,
            (Connecting, Authenticating) => true,
            (Connecting | Authenticating, Errored) => true,
            (Authenticating, Ready) => true,
            (Ready, Closing) => true,
            (Closed | Errored, _) => false,
            (_, Closed) => true,
            _ => false,
        }
    }

    /// Check if the state is terminal.
    pub fn is_terminal(self) -> bool {
        matches!(self, Self::Closed | Self::Errored)
    }

    /// Check if the session can carry queries.
    pub fn is_ready(self) -> bool {
        matches!(self, Self::Ready)
    }

    /// Convert to string representation for logging.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Idle => "idle",
            Self::Connecting => "connecting",
            Self::Authenticating => "authenticating",
            Self::Ready => "ready",
            Self::Closing => "closing",
            Self::Closed => "closed",
            Self::Errored => "errored",
        }
    }
}

impl fmt::Display for SessionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Opaque handle for a registered session.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ConnectionId(String);

impl ConnectionId {
    /// Mint a fresh identifier from the current timestamp and a random suffix.
    pub fn mint() -> Self {
        let suffix = Uuid::new_v4().simple().to_string();
        Self(format!("conn_{}_{}", Utc::now().timestamp_millis(), &suffix[..8]))
    }

    /// Get the identifier as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ConnectionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<String> for ConnectionId {
    fn from(value: String) -> Self {
        Self(value)
    }
}

impl From<&str> for ConnectionId {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

/// Timeouts and wire options for a session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionOptions {
    /// Time allowed to open the stream socket
    pub connect_timeout: Duration,
    /// Time allowed for the server to accept or reject the handshake
    pub auth_timeout: Duration,
    /// Time allowed from query submission to the first line terminator
    pub query_timeout: Duration,
    /// URL scheme prefixed to the authentication line
    pub scheme: String,
}

impl Default for SessionOptions {
    fn default() -> Self {
        Self {
            connect_timeout: Duration::from_secs(30),
            auth_timeout: Duration::from_secs(10),
            query_timeout: Duration::from_secs(30),
            scheme: "syndrdb".to_string(),
        }
    }
}

/// Configuration for a SyndrDB connection.
///
/// Never persisted by the core. `Debug` output redacts the password.
///
/// The auth line is `:`-delimited, so IPv6 literals cannot be used as the
/// hostname; give a DNS name that resolves to the IPv6 address instead.
#[derive(Clone, Serialize, Deserialize)]
pub struct ConnectionConfig {
    /// Display name
    pub name: String,
    /// Server hostname or IP
    pub hostname: String,
    /// Server port
    pub port: u16,
    /// Database to authenticate against
    pub database: String,
    /// Login username
    pub username: String,
    /// Login password
    pub password: String,
    /// Session timeouts and wire options
    #[serde(default)]
    pub options: SessionOptions,
}

impl ConnectionConfig {
    /// Create a new connection configuration with required fields.
    pub fn new(
        name: impl Into<String>,
        hostname: impl Into<String>,
        port: u16,
        database: impl Into<String>,
        username: impl Into<String>,
        password: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            hostname: hostname.into(),
            port,
            database: database.into(),
            username: username.into(),
            password: password.into(),
            options: SessionOptions::default(),
        }
    }

    /// Create a builder for complex configurations.
    pub fn builder() -> ConnectionConfigBuilder {
        ConnectionConfigBuilder::default()
    }

    /// Validate the configuration.
    ///
    /// The five wire fields must not contain the auth-line delimiters, or the
    /// server would split them differently than they were entered.
    pub fn validate(&self) -> Result<(), String> {
        if self.hostname.is_empty() {
            return Err("Hostname is required".to_string());
        }
        if self.port == 0 {
            return Err("Port must be non-zero".to_string());
        }
        if self.database.is_empty() {
            return Err("Database is required".to_string());
        }
        if self.username.is_empty() {
            return Err("Username is required".to_string());
        }
        if self.hostname.parse::<std::net::Ipv6Addr>().is_ok() || self.hostname.starts_with('[') {
            return Err(format!(
                "IPv6 address '{}' cannot be sent in the ':'-delimited auth line; use a hostname",
                self.hostname
            ));
        }
        let fields = [
            ("Hostname", self.hostname.as_str()),
            ("Database", self.database.as_str()),
            ("Username", self.username.as_str()),
            ("Password", self.password.as_str()),
        ];
        for (label, value) in fields {
            if value.contains(AUTH_FIELD_DELIMITER) || value.contains(AUTH_TERMINATOR) {
                return Err(format!("{label} must not contain ':' or ';'"));
            }
            if value.contains(['\n', '\r']) {
                return Err(format!("{label} must not contain line breaks"));
            }
        }
        Ok(())
    }

    /// Get the display connection string (without password).
    pub fn display_url(&self) -> String {
        format!(
            "{}://{}@{}:{}/{}",
            self.options.scheme, self.username, self.hostname, self.port, self.database
        )
    }
}

impl fmt::Debug for ConnectionConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConnectionConfig")
            .field("name", &self.name)
            .field("hostname", &self.hostname)
            .field("port", &self.port)
            .field("database", &self.database)
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .field("options", &self.options)
            .finish()
    }
}

/// Builder for ConnectionConfig.
#[derive(Debug, Default)]
pub struct ConnectionConfigBuilder {
    name: Option<String>,
    hostname: Option<String>,
    port: u16,
    database: Option<String>,
    username: Option<String>,
    password: Option<String>,
    options: SessionOptions,
}

impl ConnectionConfigBuilder {
    /// Set the connection name.
    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Set the hostname.
    pub fn hostname(mut self, hostname: impl Into<String>) -> Self {
        self.hostname = Some(hostname.into());
        self
    }

    /// Set the port.
    pub fn port(mut self, port: u16) -> Self {
        self.port = port;
        self
    }

    /// Set the database name.
    pub fn database(mut self, database: impl Into<String>) -> Self {
        self.database = Some(database.into());
        self
    }

    /// Set the username.
    pub fn username(mut self, username: impl Into<String>) -> Self {
        self.username = Some(username.into());
        self
    }

    /// Set the password.
    pub fn password(mut self, password: impl Into<String>) -> Self {
        self.password = Some(password.into());
        self
    }

    /// Set session options.
    pub fn options(mut self, options: SessionOptions) -> Self {
        self.options = options;
        self
    }

    /// Set the connection timeout.
    pub fn connect_timeout(mut self, timeout: Duration) -> Self {
        self.options.connect_timeout = timeout;
        self
    }

    /// Set the handshake timeout.
    pub fn auth_timeout(mut self, timeout: Duration) -> Self {
        self.options.auth_timeout = timeout;
        self
    }

    /// Set the query timeout.
    pub fn query_timeout(mut self, timeout: Duration) -> Self {
        self.options.query_timeout = timeout;
        self
    }

    /// Build the configuration.
    pub fn build(self) -> Result<ConnectionConfig, String> {
        let hostname = self.hostname.ok_or("Hostname is required")?;
        let config = ConnectionConfig {
            name: self.name.unwrap_or_else(|| hostname.clone()),
            hostname,
            port: self.port,
            database: self.database.ok_or("Database is required")?,
            username: self.username.ok_or("Username is required")?,
            password: self.password.unwrap_or_default(),
            options: self.options,
        };
        config.validate()?;
        Ok(config)
    }
}

/// Connectivity status carried by a notification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ConnectionStatus {
    /// Session authenticated and registered
    Connected,
    /// Session closed
    Disconnected,
}

/// Fire-and-forget notification sent to the presentation layer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StatusNotification {
    /// Session the notification refers to
    pub connection_id: ConnectionId,
    /// New connectivity status
    pub status: ConnectionStatus,
    /// Error text when the close was caused by a failure
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    /// Welcome text received during the handshake
    #[serde(skip_serializing_if = "Option::is_none")]
    pub welcome_message: Option<String>,
}

impl StatusNotification {
    /// Notification for a session that reached `Ready`.
    pub fn connected(connection_id: ConnectionId, welcome_message: impl Into<String>) -> Self {
        Self {
            connection_id,
            status: ConnectionStatus::Connected,
            error: None,
            welcome_message: Some(welcome_message.into()),
        }
    }

    /// Notification for a session that reached `Closed`.
    pub fn disconnected(connection_id: ConnectionId, error: Option<String>) -> Self {
        Self { connection_id, status: ConnectionStatus::Disconnected, error, welcome_message: None }
    }

    /// Check if the close was caused by an error.
    pub fn is_error(&self) -> bool {
        self.error.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> ConnectionConfig {
        ConnectionConfig::new("local", "127.0.0.1", 1776, "testdb", "root", "secret")
    }

    #[test]
    fn test_happy_path_transitions() {
        use SessionState::*;
        let path = [Idle, Connecting, Authenticating, Ready, Closing, Closed];
        for pair in path.windows(2) {
            assert!(pair[0].can_transition_to(pair[1]), "{} -> {}", pair[0], pair[1]);
        }
    }

    #[test]
    fn test_errored_is_absorbing() {
        use SessionState::*;
        assert!(Connecting.can_transition_to(Errored));
        assert!(Authenticating.can_transition_to(Errored));
        assert!(!Ready.can_transition_to(Errored));
        assert!(!Errored.can_transition_to(Closed));
        assert!(!Closed.can_transition_to(Ready));
        assert!(Ready.can_transition_to(Closed));
    }

    #[test]
    fn test_connection_ids_are_unique() {
        let a = ConnectionId::mint();
        let b = ConnectionId::mint();
        assert_ne!(a, b);
        assert!(a.as_str().starts_with("conn_"));
    }

    #[test]
    fn test_validate_rejects_delimiters() {
        let mut config = sample();
        assert!(config.validate().is_ok());

        config.password = "pa:ss".to_string();
        assert!(config.validate().is_err());

        config.password = "pass;".to_string();
        assert!(config.validate().is_err());

        let mut config = sample();
        config.port = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validate_names_ipv6_literals() {
        let mut config = sample();
        for hostname in ["::1", "fe80::1", "[::1]"] {
            config.hostname = hostname.to_string();
            let err = config.validate().unwrap_err();
            assert!(err.contains("IPv6"), "unexpected message: {err}");
        }

        config.hostname = "db.example.com".to_string();
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_builder_defaults_name_to_hostname() {
        let config = ConnectionConfig::builder()
            .hostname("db.local")
            .port(1776)
            .database("testdb")
            .username("root")
            .query_timeout(Duration::from_secs(5))
            .build()
            .unwrap();
        assert_eq!(config.name, "db.local");
        assert_eq!(config.options.query_timeout, Duration::from_secs(5));
        assert_eq!(config.options.auth_timeout, Duration::from_secs(10));
    }

    #[test]
    fn test_debug_redacts_password() {
        let debug = format!("{:?}", sample());
        assert!(!debug.contains("secret"));
        assert!(debug.contains("<redacted>"));
    }

    #[test]
    fn test_status_notification_serializes_camel_case() {
        let note = StatusNotification::connected("conn_1".into(), "Welcome to testdb");
        let json = serde_json::to_value(&note).unwrap();
        assert_eq!(json["connectionId"], "conn_1");
        assert_eq!(json["status"], "connected");
        assert_eq!(json["welcomeMessage"], "Welcome to testdb");
        assert!(json.get("error").is_none());
    }
}
