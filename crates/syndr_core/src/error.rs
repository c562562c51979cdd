//! Error types for the SyndrDB client core.
//!
//! Session-fatal errors (`Transport`, `Authentication`) tear the session down;
//! everything else is local to the call that produced it.

use serde::Serialize;
use std::fmt;
use std::time::Duration;
use thiserror::Error;

/// Convenience alias used throughout the crate.
pub type Result<T> = std::result::Result<T, SyndrError>;

/// Why a test procedure could not be dispatched.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DispatchErrorKind {
    /// No procedure is registered under the name.
    NotFound,
    /// The name is declared but has no implementation yet.
    NotCallable,
    /// The procedure ran but returned an ill-formed result.
    MalformedResult,
}

impl fmt::Display for DispatchErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            Self::NotFound => "not found",
            Self::NotCallable => "is not callable",
            Self::MalformedResult => "did not return a valid TestResult",
        };
        f.write_str(text)
    }
}

/// Main error type for the SyndrDB client core.
#[derive(Debug, Error)]
pub enum SyndrError {
    /// Socket connect, read or write failure.
    #[error("Transport error: {message}")]
    Transport {
        /// Human-readable error message.
        message: String,
        /// Optional underlying error source.
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// The server rejected the handshake or never answered it.
    #[error("Authentication error: {message}")]
    Authentication {
        /// Human-readable error message.
        message: String,
        /// Actionable hint for the user.
        hint: Option<String>,
    },

    /// No response line arrived within the query timeout.
    #[error("Query timed out after {}ms", timeout.as_millis())]
    QueryTimeout {
        /// The timeout that elapsed.
        timeout: Duration,
    },

    /// A query was issued while another one was still in flight.
    #[error("Connection busy: a query is already in flight")]
    Busy,

    /// Test procedure lookup or result validation failed.
    #[error("Test procedure '{name}' {kind}")]
    Dispatch {
        /// Requested procedure name.
        name: String,
        /// Failure classification.
        kind: DispatchErrorKind,
    },

    /// An operation that requires a live session was attempted without one.
    #[error("Not connected to SyndrDB server")]
    NotConnected,

    /// `connect` was called while a session is already held.
    #[error("Already connected")]
    AlreadyConnected,

    /// Invalid connection configuration or settings.
    #[error("Config error: {message}")]
    Config {
        /// Human-readable error message.
        message: String,
    },

    /// Test-definition file could not be read or decoded.
    #[error("Catalog error: {message}")]
    Catalog {
        /// Human-readable error message.
        message: String,
        /// Optional underlying error source.
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },
}

impl SyndrError {
    // ========== Constructors ==========

    /// Create a new transport error.
    pub fn transport(message: impl Into<String>) -> Self {
        Self::Transport { message: message.into(), source: None }
    }

    /// Create a new transport error with source.
    pub fn transport_with_source(
        message: impl Into<String>,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        Self::Transport { message: message.into(), source: Some(Box::new(source)) }
    }

    /// Create a new authentication error.
    pub fn authentication(message: impl Into<String>) -> Self {
        Self::Authentication {
            message: message.into(),
            hint: Some("Check username, password and database name".to_string()),
        }
    }

    /// Create a new authentication error with custom hint.
    pub fn authentication_with_hint(message: impl Into<String>, hint: impl Into<String>) -> Self {
        Self::Authentication { message: message.into(), hint: Some(hint.into()) }
    }

    /// Create a query timeout error.
    pub fn query_timeout(timeout: Duration) -> Self {
        Self::QueryTimeout { timeout }
    }

    /// Create a dispatch error.
    pub fn dispatch(name: impl Into<String>, kind: DispatchErrorKind) -> Self {
        Self::Dispatch { name: name.into(), kind }
    }

    /// Create a new config error.
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config { message: message.into() }
    }

    /// Create a new catalog error with source.
    pub fn catalog_with_source(
        message: impl Into<String>,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        Self::Catalog { message: message.into(), source: Some(Box::new(source)) }
    }

    // ========== Methods ==========

    /// Check if this error ends the session it occurred on.
    pub fn is_session_fatal(&self) -> bool {
        matches!(self, Self::Transport { .. } | Self::Authentication { .. })
    }

    /// Check if this error is a query timeout.
    pub fn is_timeout(&self) -> bool {
        matches!(self, Self::QueryTimeout { .. })
    }

    /// Get the dispatch failure kind (if applicable).
    pub fn dispatch_kind(&self) -> Option<DispatchErrorKind> {
        match self {
            Self::Dispatch { kind, .. } => Some(*kind),
            _ => None,
        }
    }

    /// Get the error category name.
    pub fn category(&self) -> &'static str {
        match self {
            Self::Transport { .. } => "Transport",
            Self::Authentication { .. } => "Authentication",
            Self::QueryTimeout { .. } => "Query",
            Self::Busy => "Query",
            Self::Dispatch { .. } => "Dispatch",
            Self::NotConnected => "Connection",
            Self::AlreadyConnected => "Connection",
            Self::Config { .. } => "Config",
            Self::Catalog { .. } => "Catalog",
        }
    }

    /// Get actionable hint for the user.
    pub fn hint(&self) -> Option<&str> {
        match self {
            Self::Transport { .. } => {
                Some("Check that the SyndrDB server is running and reachable")
            }
            Self::Authentication { hint, .. } => hint.as_deref(),
            Self::QueryTimeout { .. } => {
                Some("The server did not answer; the connection is still open")
            }
            Self::Busy => None,
            Self::Dispatch { kind: DispatchErrorKind::NotFound, .. } => {
                Some("Check the runAllCommand name in the test definition file")
            }
            Self::Dispatch { .. } => Some("The test procedure may be unimplemented"),
            Self::NotConnected => Some("Connect to a server first"),
            Self::AlreadyConnected => Some("Disconnect before opening a new connection"),
            Self::Config { .. } => None,
            Self::Catalog { .. } => Some("Check the test definition directory"),
        }
    }

    /// Convert to user-displayable error info.
    pub fn to_error_info(&self) -> ErrorInfo {
        let technical_detail = match self {
            Self::Transport { source: Some(source), .. }
            | Self::Catalog { source: Some(source), .. } => Some(source.to_string()),
            Self::QueryTimeout { timeout } => Some(format!("Timeout: {}ms", timeout.as_millis())),
            _ => None,
        };

        ErrorInfo {
            error_type: format!("{} Error", self.category()),
            message: self.to_string(),
            hint: self.hint().map(String::from),
            technical_detail,
        }
    }
}

/// User-displayable error information.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ErrorInfo {
    /// Category name (e.g., "Transport Error").
    pub error_type: String,
    /// User-friendly message.
    pub message: String,
    /// Actionable suggestion.
    pub hint: Option<String>,
    /// Technical detail for "Show Details" expansion.
    pub technical_detail: Option<String>,
}

// ========== Error Conversions ==========

/// Socket-level failures map to the transport category.
impl From<std::io::Error> for SyndrError {
    fn from(err: std::io::Error) -> Self {
        SyndrError::Transport { message: err.to_string(), source: Some(Box::new(err)) }
    }
}

/// JSON failures only occur when decoding test-definition files.
impl From<serde_json::Error> for SyndrError {
    fn from(err: serde_json::Error) -> Self {
        SyndrError::Catalog { message: format!("JSON error: {err}"), source: Some(Box::new(err)) }
    }
}
