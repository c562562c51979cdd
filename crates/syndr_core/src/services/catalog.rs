//! Test-definition catalog loaded from `E2E-<group>-tests.json` files.

use crate::error::{Result, SyndrError};
use crate::models::{TestDefinitionFile, TestEntry};

use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};

const FILE_PREFIX: &str = "E2E-";
const FILE_SUFFIX: &str = "-tests.json";

#[derive(Deserialize)]
struct RawDefinitionFile {
    #[serde(default)]
    tests: Vec<TestEntry>,
}

/// Turn `E2E-select-documents-tests.json` into `select-documents`.
pub fn display_name(file_name: &str) -> String {
    file_name.replace(".json", "").replace(FILE_PREFIX, "").replace("-tests", "")
}

fn is_definition_file(file_name: &str) -> bool {
    file_name.starts_with(FILE_PREFIX) && file_name.ends_with(FILE_SUFFIX)
}

/// Ordered collection of test-definition files.
#[derive(Debug, Clone, Default)]
pub struct TestCatalog {
    files: Vec<TestDefinitionFile>,
}

impl TestCatalog {
    /// Load every definition file in `dir`, ordered by file name.
    ///
    /// Files that cannot be read or decoded are skipped with a warning.
    /// A missing directory is an error.
    pub fn load_dir(dir: impl AsRef<Path>) -> Result<Self> {
        let dir = dir.as_ref();
        let entries = fs::read_dir(dir).map_err(|e| {
            SyndrError::catalog_with_source(
                format!("Cannot read test definition directory {}", dir.display()),
                e,
            )
        })?;

        let mut paths: Vec<(String, PathBuf)> = entries
            .filter_map(|entry| entry.ok())
            .filter_map(|entry| {
                let name = entry.file_name().to_str()?.to_string();
                is_definition_file(&name).then(|| (name, entry.path()))
            })
            .collect();
        paths.sort_by(|a, b| a.0.cmp(&b.0));

        let mut files = Vec::with_capacity(paths.len());
        for (name, path) in paths {
            match Self::load_file(&name, &path) {
                Ok(file) => files.push(file),
                Err(e) => tracing::warn!(
                    file = %path.display(),
                    error = %e,
                    "Skipping test definition file"
                ),
            }
        }

        tracing::debug!(dir = %dir.display(), files = files.len(), "Loaded test catalog");
        Ok(Self { files })
    }

    fn load_file(name: &str, path: &Path) -> Result<TestDefinitionFile> {
        let contents = fs::read_to_string(path)?;
        let raw: RawDefinitionFile = serde_json::from_str(&contents)?;
        Ok(TestDefinitionFile { file_name: display_name(name), tests: raw.tests })
    }

    pub fn files(&self) -> &[TestDefinitionFile] {
        &self.files
    }

    /// All entries across files, in file order.
    pub fn entries(&self) -> impl Iterator<Item = &TestEntry> {
        self.files.iter().flat_map(|f| f.tests.iter())
    }

    /// Entries whose category matches, ignoring case.
    pub fn entries_in_category<'a>(
        &'a self,
        category: &'a str,
    ) -> impl Iterator<Item = &'a TestEntry> {
        self.entries().filter(move |e| e.category.eq_ignore_ascii_case(category))
    }

    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    const SELECT_TESTS: &str = r#"{
        "tests": [
            {"category": "Select", "description": "Simple select", "runAllCommand": "run_e2e_simple_selects"},
            {"category": "Select", "description": "Count", "runAllCommand": "run_e2e_selects_count"}
        ]
    }"#;

    #[test]
    fn test_display_name_strips_decorations() {
        assert_eq!(display_name("E2E-select-documents-tests.json"), "select-documents");
        assert_eq!(display_name("E2E-add-bundle-tests.json"), "add-bundle");
    }

    #[test]
    fn test_load_dir_orders_and_filters() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("E2E-select-documents-tests.json"), SELECT_TESTS).unwrap();
        fs::write(
            dir.path().join("E2E-add-documents-tests.json"),
            r#"{"tests":[{"category":"Add","description":"Add one","runAllCommand":"run_e2e_simple_adds"}]}"#,
        )
        .unwrap();
        fs::write(dir.path().join("notes.json"), "{}").unwrap();

        let catalog = TestCatalog::load_dir(dir.path()).unwrap();
        let names: Vec<&str> = catalog.files().iter().map(|f| f.file_name.as_str()).collect();
        assert_eq!(names, ["add-documents", "select-documents"]);
        assert_eq!(catalog.entries().count(), 3);
        assert_eq!(catalog.entries_in_category("select").count(), 2);
        assert_eq!(
            catalog.files()[1].commands().collect::<Vec<_>>(),
            ["run_e2e_simple_selects", "run_e2e_selects_count"]
        );
    }

    #[test]
    fn test_broken_file_is_skipped() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("E2E-broken-tests.json"), "{not json").unwrap();
        fs::write(dir.path().join("E2E-select-documents-tests.json"), SELECT_TESTS).unwrap();

        let catalog = TestCatalog::load_dir(dir.path()).unwrap();
        assert_eq!(catalog.files().len(), 1);
    }

    #[test]
    fn test_missing_directory_is_an_error() {
        let dir = TempDir::new().unwrap();
        let err = TestCatalog::load_dir(dir.path().join("absent")).unwrap_err();
        assert!(matches!(err, SyndrError::Catalog { .. }));
    }
}
