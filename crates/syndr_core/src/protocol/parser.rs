//! Classification of raw server replies into [`QueryResult`]s.
//!
//! The server answers with one of three textual shapes for the same kind of
//! query, so classification is an ordered fallback chain:
//!
//! 1. error keywords anywhere in the text mean failure
//! 2. strict JSON
//! 3. pipe- or tab-delimited rows
//! 4. free-text status message, optionally carrying an affected-rows count
//!
//! [`parse`] is total: every input yields a well-formed result.

use crate::models::{Document, QueryResult};

use regex::Regex;
use serde_json::{Map, Value};
use std::sync::OnceLock;

/// Lowercase substrings that classify a reply as failed.
const FAILURE_MARKERS: [&str; 3] = ["error", "failed", "invalid"];

/// Field name for delimited rows.
pub const VALUES_FIELD: &str = "values";

/// Field name for status messages.
pub const MESSAGE_FIELD: &str = "message";

/// Field name for non-object JSON values.
pub const VALUE_FIELD: &str = "value";

fn affected_rows_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r"(?i)(\d+)\s+(?:documents?|records?|rows?)\s+(?:inserted|updated|deleted|affected)")
            .expect("affected-rows pattern is valid")
    })
}

/// Parse a raw server reply.
pub fn parse(raw: &[u8]) -> QueryResult {
    let text = String::from_utf8_lossy(raw);
    let text = text.trim_end();

    let lower = text.to_lowercase();
    if FAILURE_MARKERS.iter().any(|marker| lower.contains(marker)) {
        return QueryResult::failure(text);
    }

    if let Ok(value) = serde_json::from_str::<Value>(text) {
        return from_json(value);
    }

    if let Some(delimiter) = detect_delimiter(text) {
        return from_delimited(text, delimiter);
    }

    from_message(text)
}

fn from_json(value: Value) -> QueryResult {
    match value {
        Value::Object(map) if is_envelope(&map) => from_envelope(map),
        other => {
            let data = into_documents(other);
            let count = data.len() as u64;
            QueryResult::success(data, Some(count))
        }
    }
}

/// The server's own `{"success": bool, "data": ...}` result envelope.
fn is_envelope(map: &Map<String, Value>) -> bool {
    matches!(map.get("success"), Some(Value::Bool(_))) && map.contains_key("data")
}

fn from_envelope(mut map: Map<String, Value>) -> QueryResult {
    let success = map.get("success").and_then(Value::as_bool).unwrap_or(false);
    let document_count = map.get("documentCount").and_then(Value::as_u64);
    let data = match map.remove("data") {
        Some(Value::Null) | None => Vec::new(),
        Some(value) => into_documents(value),
    };

    if success {
        return QueryResult::success(data, document_count);
    }

    let error = ["error", "message"]
        .iter()
        .find_map(|key| map.get(*key).and_then(Value::as_str))
        .unwrap_or("Server reported failure")
        .to_string();
    QueryResult { data, document_count, ..QueryResult::failure(error) }
}

fn into_documents(value: Value) -> Vec<Document> {
    match value {
        Value::Array(items) => items.into_iter().map(into_document).collect(),
        other => vec![into_document(other)],
    }
}

fn into_document(value: Value) -> Document {
    match value {
        Value::Object(map) => map,
        other => {
            let mut doc = Document::new();
            doc.insert(VALUE_FIELD.to_string(), other);
            doc
        }
    }
}

fn detect_delimiter(text: &str) -> Option<char> {
    if text.lines().any(|line| line.contains('|')) {
        Some('|')
    } else if text.lines().any(|line| line.contains('\t')) {
        Some('\t')
    } else {
        None
    }
}

fn from_delimited(text: &str, delimiter: char) -> QueryResult {
    let data: Vec<Document> = text
        .lines()
        .filter(|line| !line.trim().is_empty())
        .map(|line| {
            let values = line
                .split(delimiter)
                .map(|field| Value::String(field.to_string()))
                .collect();
            let mut doc = Document::new();
            doc.insert(VALUES_FIELD.to_string(), Value::Array(values));
            doc
        })
        .collect();
    let count = data.len() as u64;
    QueryResult::success(data, Some(count))
}

fn from_message(text: &str) -> QueryResult {
    let count = affected_rows_pattern()
        .captures(text)
        .and_then(|caps| caps.get(1))
        .and_then(|m| m.as_str().parse::<u64>().ok())
        .unwrap_or(0);

    let mut doc = Document::new();
    doc.insert(MESSAGE_FIELD.to_string(), Value::String(text.to_string()));
    QueryResult::success(vec![doc], Some(count))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_empty_input_is_an_empty_message() {
        let result = parse(b"");
        assert!(result.success);
        assert_eq!(result.data.len(), 1);
        assert_eq!(result.data[0][MESSAGE_FIELD], json!(""));
        assert_eq!(result.document_count, Some(0));
        assert!(result.error.is_none());
    }

    #[test]
    fn test_error_keywords_take_precedence() {
        let inputs: [&[u8]; 5] = [
            b"ERROR: bundle not found\n",
            b"{\"status\":\"Error\",\"rows\":[1,2]}",
            b"a|b|error\n",
            b"Query FAILED",
            b"invalid syntax near SELECT",
        ];
        for input in inputs {
            let result = parse(input);
            assert!(!result.success, "{:?}", String::from_utf8_lossy(input));
            assert!(result.data.is_empty());
            assert_eq!(result.error.as_deref(), Some(String::from_utf8_lossy(input).trim_end()));
        }
    }

    #[test]
    fn test_single_object_becomes_one_record() {
        let result = parse(b"{\"name\":\"Bob\",\"age\":25}\n");
        assert!(result.success);
        assert_eq!(result.document_count, Some(1));
        assert_eq!(result.data[0]["name"], json!("Bob"));
    }

    #[test]
    fn test_array_is_used_directly() {
        let result = parse(b"[{\"a\":1},{\"a\":2},3]");
        assert!(result.success);
        assert_eq!(result.document_count, Some(3));
        assert_eq!(result.data[1]["a"], json!(2));
        assert_eq!(result.data[2][VALUE_FIELD], json!(3));
    }

    #[test]
    fn test_envelope_is_unwrapped() {
        let result = parse(b"{\"success\":true,\"data\":[{\"ResultCount\":2}]}\n");
        assert!(result.success);
        assert_eq!(result.document_count, None);
        assert_eq!(result.first_field("ResultCount"), Some(&json!(2)));

        let result = parse(b"{\"success\":true,\"data\":{\"x\":1},\"documentCount\":7}");
        assert_eq!(result.data.len(), 1);
        assert_eq!(result.document_count, Some(7));
    }

    #[test]
    fn test_failed_envelope_keeps_message() {
        let result = parse(b"{\"success\":false,\"data\":null,\"message\":\"bundle missing\"}");
        assert!(!result.success);
        assert_eq!(result.error.as_deref(), Some("bundle missing"));
        assert!(result.data.is_empty());
    }

    #[test]
    fn test_object_without_envelope_shape_is_a_record() {
        let result = parse(b"{\"success\":\"yes\",\"data\":1}");
        assert!(result.success);
        assert_eq!(result.document_count, Some(1));
        assert_eq!(result.data[0]["success"], json!("yes"));
    }

    #[test]
    fn test_pipe_delimited_rows() {
        let result = parse(b"id|name\n1|Bob\n\n2|Ann\n");
        assert!(result.success);
        assert_eq!(result.document_count, Some(3));
        assert_eq!(result.data[1][VALUES_FIELD], json!(["1", "Bob"]));
    }

    #[test]
    fn test_tab_delimited_rows() {
        let result = parse(b"1\tBob\t25");
        assert_eq!(result.document_count, Some(1));
        assert_eq!(result.data[0][VALUES_FIELD], json!(["1", "Bob", "25"]));
    }

    #[test]
    fn test_json_is_not_mistaken_for_tabular() {
        let result = parse(b"{\"expr\":\"a|b\"}");
        assert_eq!(result.data[0]["expr"], json!("a|b"));
        assert!(result.data[0].get(VALUES_FIELD).is_none());
    }

    #[test]
    fn test_status_message_extracts_affected_count() {
        let result = parse(b"3 documents inserted\n");
        assert!(result.success);
        assert_eq!(result.document_count, Some(3));
        assert_eq!(result.data[0][MESSAGE_FIELD], json!("3 documents inserted"));

        assert_eq!(parse(b"OK: 1 Row Updated").document_count, Some(1));
        assert_eq!(parse(b"12 records affected").document_count, Some(12));
        assert_eq!(parse(b"Database changed to testdb").document_count, Some(0));
    }

    #[test]
    fn test_invalid_utf8_is_tolerated() {
        let result = parse(&[0xff, 0xfe, b'o', b'k']);
        assert!(result.success);
        assert_eq!(result.data.len(), 1);
    }
}
