//! Test-definition file models.

use serde::{Deserialize, Serialize};

/// One selectable test in a definition file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TestEntry {
    /// Category the test belongs to
    pub category: String,
    /// Human-readable description
    pub description: String,
    /// Procedure name dispatched by the runner
    pub run_all_command: String,
}

/// A loaded `E2E-<group>-tests.json` file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TestDefinitionFile {
    /// Display name, e.g. `select-documents`
    pub file_name: String,
    /// Entries in file order
    #[serde(default)]
    pub tests: Vec<TestEntry>,
}

impl TestDefinitionFile {
    /// Procedure names in file order.
    pub fn commands(&self) -> impl Iterator<Item = &str> {
        self.tests.iter().map(|t| t.run_all_command.as_str())
    }
}
