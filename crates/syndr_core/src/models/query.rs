//! Query result model.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// A loosely-typed record: field name to value.
pub type Document = Map<String, Value>;

/// Outcome of one query round-trip.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QueryResult {
    /// Whether the server reported success
    pub success: bool,
    /// Returned records, in server order
    #[serde(default)]
    pub data: Vec<Document>,
    /// Error text when `success` is false
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    /// Round-trip time in milliseconds
    #[serde(default)]
    pub execution_time_ms: f64,
    /// Number of documents returned or affected, when known
    #[serde(skip_serializing_if = "Option::is_none")]
    pub document_count: Option<u64>,
}

impl QueryResult {
    /// Successful result over `data`.
    pub fn success(data: Vec<Document>, document_count: Option<u64>) -> Self {
        Self { success: true, data, error: None, execution_time_ms: 0.0, document_count }
    }

    /// Failed result carrying `error`.
    pub fn failure(error: impl Into<String>) -> Self {
        Self {
            success: false,
            data: Vec::new(),
            error: Some(error.into()),
            execution_time_ms: 0.0,
            document_count: None,
        }
    }

    /// Stamp the measured execution time.
    pub fn with_execution_time(mut self, execution_time_ms: f64) -> Self {
        self.execution_time_ms = execution_time_ms;
        self
    }

    /// Get the number of records returned.
    pub fn row_count(&self) -> usize {
        self.data.len()
    }

    /// Check if the result carries no records.
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Get a field of the first record.
    pub fn first_field(&self, field: &str) -> Option<&Value> {
        self.data.first().and_then(|doc| doc.get(field))
    }

    /// Get a nested field of the first record by path, e.g. `["Result", "Count"]`.
    pub fn first_path(&self, path: &[&str]) -> Option<&Value> {
        let (head, rest) = path.split_first()?;
        let mut value = self.first_field(head)?;
        for key in rest {
            value = value.get(key)?;
        }
        Some(value)
    }
}
