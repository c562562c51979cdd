//! Data models for the SyndrDB client core.
//!
//! - `connection` - ConnectionConfig, SessionOptions, SessionState, ConnectionId,
//!   StatusNotification
//! - `query` - QueryResult, Document
//! - `test_result` - TestResult, TestSummary
//! - `catalog` - TestEntry, TestDefinitionFile

pub mod catalog;
pub mod connection;
pub mod query;
pub mod test_result;

pub use catalog::{TestDefinitionFile, TestEntry};
pub use connection::{
    ConnectionConfig, ConnectionConfigBuilder, ConnectionId, ConnectionStatus, SessionOptions,
    SessionState, StatusNotification,
};
pub use query::{Document, QueryResult};
pub use test_result::{TestResult, TestSummary};
