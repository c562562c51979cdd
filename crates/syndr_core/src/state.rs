//! Application context.
//!
//! One explicitly constructed [`SyndrState`] owns the connection registry,
//! the shared driver and the procedure registry. Call sites receive it by
//! reference instead of reaching for a global.

use crate::error::Result;
use crate::models::SessionOptions;
use crate::services::{ConnectionRegistry, DatabaseDriver, SyndrDriver, TestCatalog};
use crate::test_engine::{ProcedureRegistry, TestRunner};

use std::path::PathBuf;
use std::sync::Arc;

/// Database selected before any test runs.
pub const DEFAULT_TEST_DATABASE: &str = "testdb";

/// Get the application data directory.
pub fn default_data_dir() -> PathBuf {
    #[cfg(debug_assertions)]
    {
        PathBuf::from("./syndr_data")
    }

    #[cfg(not(debug_assertions))]
    {
        dirs::data_dir()
            .map(|d| d.join("syndr"))
            .unwrap_or_else(|| PathBuf::from("./syndr_data"))
    }
}

/// Settings for the application context.
#[derive(Debug, Clone)]
pub struct SyndrSettings {
    /// Database selected by the one-time test setup
    pub test_database: String,
    /// Directory holding `E2E-*-tests.json` files
    pub tests_dir: PathBuf,
    /// Timeouts and scheme for new sessions
    pub session: SessionOptions,
}

impl Default for SyndrSettings {
    fn default() -> Self {
        Self {
            test_database: DEFAULT_TEST_DATABASE.to_string(),
            tests_dir: PathBuf::from("./data"),
            session: SessionOptions::default(),
        }
    }
}

/// Central application context.
pub struct SyndrState {
    registry: ConnectionRegistry,
    driver: Arc<SyndrDriver>,
    procedures: Arc<ProcedureRegistry>,
    settings: SyndrSettings,
}

impl SyndrState {
    /// Create the context with the end-to-end procedure suite.
    pub fn new(settings: SyndrSettings) -> Self {
        let registry = ConnectionRegistry::new();
        let driver = Arc::new(SyndrDriver::new(registry.clone()));
        let shared: Arc<dyn DatabaseDriver> = driver.clone();
        let procedures = Arc::new(ProcedureRegistry::e2e(shared, settings.test_database.clone()));

        tracing::debug!(test_database = %settings.test_database, "SyndrState initialized");

        Self { registry, driver, procedures, settings }
    }

    // ========== Accessors ==========

    pub fn registry(&self) -> &ConnectionRegistry {
        &self.registry
    }

    /// Get the driver shared by the shell and the procedures.
    pub fn driver(&self) -> Arc<SyndrDriver> {
        self.driver.clone()
    }

    pub fn procedures(&self) -> Arc<ProcedureRegistry> {
        self.procedures.clone()
    }

    pub fn settings(&self) -> &SyndrSettings {
        &self.settings
    }

    // ========== Convenience Methods ==========

    /// Create a runner over the shared procedure registry.
    pub fn runner(&self) -> TestRunner {
        TestRunner::new(self.procedures.clone())
    }

    /// Load the test-definition files from the configured directory.
    pub fn load_catalog(&self) -> Result<TestCatalog> {
        TestCatalog::load_dir(&self.settings.tests_dir)
    }

    /// Close the driver's session and anything else still registered.
    pub async fn shutdown(&self) {
        self.driver.disconnect().await;
        self.registry.disconnect_all().await;
        tracing::debug!("SyndrState shut down");
    }
}

impl Default for SyndrState {
    fn default() -> Self {
        Self::new(SyndrSettings::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{DispatchErrorKind, SyndrError};
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_runner_shares_the_state_driver() {
        let state = SyndrState::default();
        let runner = state.runner();

        let err = runner.run_by_name("nonexistent_test").await.unwrap_err();
        assert_eq!(err.dispatch_kind(), Some(DispatchErrorKind::NotFound));

        // Implemented procedures reach the driver, which has no session.
        let err = runner.run_by_name("run_e2e_simple_selects").await.unwrap_err();
        assert!(matches!(err, SyndrError::NotConnected));
        assert!(!state.procedures().is_setup());
    }

    #[test]
    fn test_catalog_comes_from_settings() {
        let dir = TempDir::new().unwrap();
        std::fs::write(
            dir.path().join("E2E-select-documents-tests.json"),
            r#"{"tests":[{"category":"Select","description":"Simple","runAllCommand":"run_e2e_simple_selects"}]}"#,
        )
        .unwrap();

        let settings = SyndrSettings { tests_dir: dir.path().to_path_buf(), ..Default::default() };
        let state = SyndrState::new(settings);
        let catalog = state.load_catalog().unwrap();

        assert_eq!(catalog.entries().count(), 1);
        assert!(state.procedures().contains("run_e2e_simple_selects"));
        assert_eq!(state.procedures().database(), DEFAULT_TEST_DATABASE);
    }

    #[tokio::test]
    async fn test_shutdown_without_sessions() {
        let state = SyndrState::default();
        state.shutdown().await;
        assert!(state.registry().is_empty());
    }
}
