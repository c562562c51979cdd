//! Core types and services for the SyndrDB client.
//!
//! This crate provides the protocol layer and the end-to-end test engine:
//!
//! - **error**: Error handling with session-fatal and call-local categories
//! - **models**: Connection configuration, query results, test results
//! - **protocol**: Line framing and reply parsing
//! - **services**: Sessions, the connection registry, the driver facade, the test catalog
//! - **test_engine**: Named test procedures and the runner
//! - **state**: Application context
//! - **logging**: Structured logging setup

pub mod error;
pub mod logging;
pub mod models;
pub mod protocol;
pub mod services;
pub mod state;
pub mod test_engine;

pub use error::{DispatchErrorKind, SyndrError};
pub use models::{
    ConnectionConfig, ConnectionId, ConnectionStatus, QueryResult, SessionOptions, SessionState,
    StatusNotification, TestEntry, TestResult, TestSummary,
};
pub use services::{ConnectionRegistry, DatabaseDriver, Session, SyndrDriver, TestCatalog};
pub use state::{SyndrSettings, SyndrState};
pub use test_engine::{ProcedureRegistry, TestRunner};
