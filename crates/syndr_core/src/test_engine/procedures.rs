//! Named test procedures and the one-time test database setup.
//!
//! Procedures are registered in an explicit name-to-handler map. A name can
//! also be declared without an implementation so that definition files
//! referencing planned tests resolve to "not callable" rather than "not found".

use crate::error::{DispatchErrorKind, Result, SyndrError};
use crate::models::{QueryResult, TestResult};
use crate::services::DatabaseDriver;
use crate::test_engine::planned::PLANNED_PROCEDURES;

use futures_util::future::{BoxFuture, FutureExt};
use serde_json::Value;
use std::collections::BTreeMap;
use std::future::Future;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use tokio::sync::OnceCell;

/// A runnable test procedure.
pub type Procedure =
    Arc<dyn Fn(Arc<dyn DatabaseDriver>) -> BoxFuture<'static, Result<TestResult>> + Send + Sync>;

enum ProcedureSlot {
    Implemented(Procedure),
    Declared,
}

struct ProcedureEntry {
    description: Option<String>,
    slot: ProcedureSlot,
}

/// Listing entry for a registered name.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProcedureInfo {
    pub name: String,
    pub description: Option<String>,
    pub implemented: bool,
}

/// Name-to-procedure map bound to one driver.
pub struct ProcedureRegistry {
    driver: Arc<dyn DatabaseDriver>,
    database: String,
    procedures: BTreeMap<String, ProcedureEntry>,
    setup: OnceCell<()>,
    setup_attempts: AtomicUsize,
}

impl ProcedureRegistry {
    /// Create an empty registry.
    pub fn new(driver: Arc<dyn DatabaseDriver>, database: impl Into<String>) -> Self {
        Self {
            driver,
            database: database.into(),
            procedures: BTreeMap::new(),
            setup: OnceCell::new(),
            setup_attempts: AtomicUsize::new(0),
        }
    }

    /// Create a registry holding the end-to-end suite.
    pub fn e2e(driver: Arc<dyn DatabaseDriver>, database: impl Into<String>) -> Self {
        let mut registry = Self::new(driver, database);

        for (name, description) in PLANNED_PROCEDURES {
            let description = (!description.is_empty()).then_some(*description);
            registry.declare(*name, description);
        }

        registry.register("run_e2e_simple_adds", Some("Simple ADD queries"), run_simple_adds);
        for check in SELECT_CHECKS {
            registry.register(check.name, Some(check.description), move |driver| {
                run_select_check(driver, check)
            });
        }

        registry
    }

    /// Register an implemented procedure, replacing any earlier entry.
    pub fn register<F, Fut>(
        &mut self,
        name: impl Into<String>,
        description: Option<&str>,
        procedure: F,
    ) where
        F: Fn(Arc<dyn DatabaseDriver>) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<TestResult>> + Send + 'static,
    {
        let procedure: Procedure = Arc::new(move |driver| procedure(driver).boxed());
        self.procedures.insert(
            name.into(),
            ProcedureEntry {
                description: description.map(String::from),
                slot: ProcedureSlot::Implemented(procedure),
            },
        );
    }

    /// Declare a name with no implementation.
    pub fn declare(&mut self, name: impl Into<String>, description: Option<&str>) {
        self.procedures.insert(
            name.into(),
            ProcedureEntry {
                description: description.map(String::from),
                slot: ProcedureSlot::Declared,
            },
        );
    }

    /// Look up a callable procedure without running anything.
    pub fn resolve(&self, name: &str) -> Result<Procedure> {
        match self.procedures.get(name) {
            Some(ProcedureEntry { slot: ProcedureSlot::Implemented(procedure), .. }) => {
                Ok(procedure.clone())
            }
            Some(ProcedureEntry { slot: ProcedureSlot::Declared, .. }) => {
                Err(SyndrError::dispatch(name, DispatchErrorKind::NotCallable))
            }
            None => Err(SyndrError::dispatch(name, DispatchErrorKind::NotFound)),
        }
    }

    /// Registered names in sorted order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.procedures.keys().map(String::as_str)
    }

    /// Registered names with descriptions, sorted by name.
    pub fn list(&self) -> Vec<ProcedureInfo> {
        self.procedures
            .iter()
            .map(|(name, entry)| ProcedureInfo {
                name: name.clone(),
                description: entry.description.clone(),
                implemented: matches!(entry.slot, ProcedureSlot::Implemented(_)),
            })
            .collect()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.procedures.contains_key(name)
    }

    pub fn driver(&self) -> Arc<dyn DatabaseDriver> {
        self.driver.clone()
    }

    pub fn database(&self) -> &str {
        &self.database
    }

    /// Select the test database once per registry.
    ///
    /// Concurrent callers wait for the same attempt. A failed attempt is not
    /// remembered; the next call tries again.
    pub async fn ensure_setup(&self) -> Result<()> {
        self.setup
            .get_or_try_init(|| async {
                self.setup_attempts.fetch_add(1, Ordering::SeqCst);
                let statement = format!("USE \"{}\";", self.database);
                let result = self.driver.execute_query(&statement).await?;
                if result.success {
                    tracing::info!(database = %self.database, "Test database selected");
                } else {
                    tracing::warn!(
                        database = %self.database,
                        error = ?result.error,
                        "Server did not confirm the test database"
                    );
                }
                Ok::<(), SyndrError>(())
            })
            .await
            .map(|_| ())
    }

    /// Check if setup has completed.
    pub fn is_setup(&self) -> bool {
        self.setup.initialized()
    }

    /// Number of setup attempts made so far.
    pub fn setup_attempts(&self) -> usize {
        self.setup_attempts.load(Ordering::SeqCst)
    }
}

impl std::fmt::Debug for ProcedureRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ProcedureRegistry")
            .field("database", &self.database)
            .field("procedures", &self.procedures.len())
            .field("is_setup", &self.is_setup())
            .finish()
    }
}

// ========== End-to-end procedures ==========

const ADD_AUTHOR: &str = r#"ADD DOCUMENT TO BUNDLE "Authors" WITH  ( {"SomeField"="Bob Ross"}, {"Age" = 25},{"Salary" = 10000}, {"Country" = "USA"});"#;

async fn run_simple_adds(driver: Arc<dyn DatabaseDriver>) -> Result<TestResult> {
    let result = driver.execute_query(ADD_AUTHOR).await?;
    let message = if result.success { "Test succeeded" } else { "Test failed" };
    Ok(with_query_error(TestResult::new("Simple ADD", result.success, message), &result))
}

/// Carry the server's failure text into the test result.
fn with_query_error(test: TestResult, result: &QueryResult) -> TestResult {
    match &result.error {
        Some(error) => test.with_error(error.clone()),
        None => test,
    }
}

/// A select statement and what its reply must contain.
struct SelectCheck {
    name: &'static str,
    description: &'static str,
    test_name: &'static str,
    statement: &'static str,
    /// Expected `data[0].ResultCount`
    result_count: Option<u64>,
    /// Expected `data[0].Result.Count`
    count: Option<u64>,
}

static SELECT_CHECKS: &[SelectCheck] = &[
    SelectCheck {
        name: "run_e2e_simple_selects",
        description: "Simple SELECT queries",
        test_name: "Simple Select from Authors",
        statement: r#"SELECT DOCUMENTS FROM "Authors";"#,
        result_count: None,
        count: None,
    },
    SelectCheck {
        name: "run_e2e_simple_selects_with_single_filters",
        description: "Simple SELECT queries with single filters",
        test_name: "Simple Select Single Filter",
        statement: r#"SELECT DOCUMENTS FROM "Authors" WHERE "AuthorName" == "Test Tester";"#,
        result_count: None,
        count: None,
    },
    SelectCheck {
        name: "run_e2e_simple_selects_with_multiple_filters",
        description: "Simple SELECT queries with multiple filters",
        test_name: "Simple Select Multiple Filters",
        statement: r#"SELECT DOCUMENTS FROM "Authors" WHERE "AuthorName" == "Test Tester" AND "Age" > 9 AND "Age" < 16;"#,
        result_count: None,
        count: None,
    },
    SelectCheck {
        name: "run_e2e_simple_selects_with_joins",
        description: "Simple Selects with Joins",
        test_name: "Simple Select With Joins",
        statement: r#"SELECT DOCUMENTS FROM "Authors" JOIN "Books" ON "Authors"."DocumentID" == "Books"."AuthorsID";"#,
        result_count: None,
        count: None,
    },
    SelectCheck {
        name: "run_e2e_selects_with_joins_and_single_filters",
        description: "Selects with joins and single filters",
        test_name: "Simple Select With Joins & Single Filters",
        statement: r#"SELECT DOCUMENTS FROM "Authors" JOIN "Books" ON "Authors"."DocumentID" == "Books"."AuthorsID" WHERE "Authors"."AuthorName" == "Test Tester";"#,
        result_count: None,
        count: None,
    },
    SelectCheck {
        name: "run_e2e_selects_with_joins_and_multiple_filters",
        description: "Selects with joins and multiple filters",
        test_name: "Simple Select With Joins & Multiple Filters",
        statement: r#"SELECT DOCUMENTS FROM "Authors" JOIN "Books" ON "Authors"."DocumentID" == "Books"."AuthorsID" WHERE "Authors"."AuthorName" == "Test Tester" AND "Authors"."Age" > 9 AND "Authors"."Age" < 16;"#,
        result_count: None,
        count: None,
    },
    SelectCheck {
        name: "run_e2e_select_top_n_queries",
        description: "Select TOP N queries",
        test_name: "Simple Select TOP 5 from Authors",
        statement: r#"SELECT TOP 5 DOCUMENTS FROM "Authors";"#,
        result_count: Some(5),
        count: None,
    },
    SelectCheck {
        name: "run_e2e_selects_top_n_with_joins",
        description: "Selects TOP N with joins",
        test_name: "Simple Select TOP 5 With Joins",
        statement: r#"SELECT TOP 5 DOCUMENTS FROM "Authors" JOIN "Books" ON "Authors"."DocumentID" == "Books"."AuthorsID";"#,
        result_count: Some(5),
        count: None,
    },
    SelectCheck {
        name: "run_e2e_selects_top_n_with_joins_and_single_filters",
        description: "Selects TOP N with joins and single filters",
        test_name: "Simple Select TOP 2 With Joins & Single Filter",
        statement: r#"SELECT TOP 2 DOCUMENTS FROM "Authors" JOIN "Books" ON "Authors"."DocumentID" == "Books"."AuthorsID" WHERE "Authors"."AuthorName" == "Test Tester";"#,
        result_count: Some(2),
        count: None,
    },
    SelectCheck {
        name: "run_e2e_selects_top_n_with_joins_and_multiple_filters",
        description: "Selects TOP N with joins and multiple filters",
        test_name: "Simple Select TOP 2 With Joins & Multiple Filters",
        statement: r#"SELECT TOP 2 DOCUMENTS FROM "Authors" JOIN "Books" ON "Authors"."DocumentID" == "Books"."AuthorsID" WHERE "Authors"."AuthorName" == "Test Tester" AND "Authors"."Country" == "USA";"#,
        result_count: Some(2),
        count: None,
    },
    SelectCheck {
        name: "run_e2e_selects_count",
        description: "Selects COUNT(*)",
        test_name: "Simple Select COUNT(*) from Authors",
        statement: r#"SELECT count(*) FROM "Authors";"#,
        result_count: None,
        count: None,
    },
    SelectCheck {
        name: "run_e2e_selects_count_with_single_filter",
        description: "Selects COUNT(*) with single filter",
        test_name: "Simple Select COUNT(*) With Single Filter",
        statement: r#"SELECT count(*) FROM "Authors" WHERE "Authors"."AuthorName" == "Test Tester";"#,
        result_count: None,
        count: Some(5),
    },
    SelectCheck {
        name: "run_e2e_selects_count_with_multiple_filters",
        description: "Selects COUNT(*) with multiple filters",
        test_name: "Simple Select COUNT(*) With Multiple Filters",
        statement: r#"SELECT count(*) FROM "Authors" WHERE "Authors"."AuthorName" == "Test Tester" AND "Authors"."Country" == "USA";"#,
        result_count: None,
        count: Some(3),
    },
];

fn first_u64(result: &QueryResult, path: &[&str]) -> u64 {
    result.first_path(path).and_then(Value::as_u64).unwrap_or(0)
}

async fn run_select_check(
    driver: Arc<dyn DatabaseDriver>,
    check: &'static SelectCheck,
) -> Result<TestResult> {
    let result = driver.execute_query(check.statement).await?;

    let result_count = first_u64(&result, &["ResultCount"]);
    let mut success = result.success;
    if let Some(expected) = check.result_count {
        success &= result_count == expected;
    }
    if let Some(expected) = check.count {
        success &= first_u64(&result, &["Result", "Count"]) == expected;
    }

    let message = if result.is_empty() {
        "No data returned".to_string()
    } else {
        format!("Query executed successfully. Result Count: {result_count}")
    };
    let server_time_ms = result
        .first_field("ExecutionTimeMS")
        .and_then(Value::as_f64)
        .unwrap_or(0.0);

    let test =
        TestResult::new(check.test_name, success, message).with_execution_time(server_time_ms);
    Ok(with_query_error(test, &result))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::ConnectionConfig;
    use async_trait::async_trait;
    use parking_lot::Mutex;
    use serde_json::json;

    /// Driver double that records statements and replies from a script.
    #[derive(Default)]
    struct ScriptedDriver {
        statements: Mutex<Vec<String>>,
        reply: Mutex<Option<serde_json::Value>>,
    }

    impl ScriptedDriver {
        fn replying(reply: serde_json::Value) -> Arc<Self> {
            Arc::new(Self { reply: Mutex::new(Some(reply)), ..Default::default() })
        }
    }

    #[async_trait]
    impl DatabaseDriver for ScriptedDriver {
        async fn connect(&self, _config: ConnectionConfig) -> Result<bool> {
            Ok(true)
        }

        async fn disconnect(&self) {}

        async fn execute_query(&self, query: &str) -> Result<QueryResult> {
            self.statements.lock().push(query.to_string());
            let reply = self
                .reply
                .lock()
                .clone()
                .unwrap_or_else(|| json!({"success": true, "data": []}));
            Ok(crate::protocol::parse(reply.to_string().as_bytes()))
        }

        async fn test_connection(&self, _config: ConnectionConfig) -> bool {
            true
        }
    }

    async fn run(
        registry: &ProcedureRegistry,
        name: &str,
        driver: Arc<ScriptedDriver>,
    ) -> TestResult {
        let procedure = registry.resolve(name).unwrap();
        procedure(driver).await.unwrap()
    }

    #[test]
    fn test_e2e_registry_lists_suite() {
        let registry = ProcedureRegistry::e2e(ScriptedDriver::replying(json!({})), "testdb");
        let listed = registry.list();
        assert_eq!(listed.len(), PLANNED_PROCEDURES.len() + 1 + SELECT_CHECKS.len());
        assert_eq!(listed.iter().filter(|p| p.implemented).count(), 14);

        let names: Vec<&str> = registry.names().collect();
        let mut sorted = names.clone();
        sorted.sort_unstable();
        assert_eq!(names, sorted);
    }

    #[test]
    fn test_resolve_distinguishes_missing_and_declared() {
        let registry = ProcedureRegistry::e2e(ScriptedDriver::replying(json!({})), "testdb");
        assert!(registry.resolve("run_e2e_simple_selects").is_ok());

        let declared = registry.resolve("run_e2e_selects_count_with_joins").err().unwrap();
        assert_eq!(declared.dispatch_kind(), Some(DispatchErrorKind::NotCallable));

        let missing = registry.resolve("nonexistent_test").err().unwrap();
        assert_eq!(missing.dispatch_kind(), Some(DispatchErrorKind::NotFound));
    }

    #[tokio::test]
    async fn test_setup_uses_configured_database() {
        let driver = ScriptedDriver::replying(json!("Database changed"));
        let registry = ProcedureRegistry::new(driver.clone(), "testdb");

        registry.ensure_setup().await.unwrap();
        registry.ensure_setup().await.unwrap();

        assert!(registry.is_setup());
        assert_eq!(registry.setup_attempts(), 1);
        assert_eq!(*driver.statements.lock(), vec![r#"USE "testdb";"#.to_string()]);
    }

    #[tokio::test]
    async fn test_select_reports_result_count_and_server_time() {
        let driver = ScriptedDriver::replying(json!({
            "success": true,
            "data": [{"ResultCount": 2, "ExecutionTimeMS": 1.5}]
        }));
        let registry = ProcedureRegistry::e2e(driver.clone(), "testdb");

        let procedure = registry.resolve("run_e2e_simple_selects").unwrap();
        let result = procedure(driver.clone()).await.unwrap();

        assert!(result.success);
        assert_eq!(result.test_name, "Simple Select from Authors");
        assert_eq!(result.response_message, "Query executed successfully. Result Count: 2");
        assert_eq!(result.execution_time_ms, 1.5);
        assert_eq!(driver.statements.lock()[0], r#"SELECT DOCUMENTS FROM "Authors";"#);
    }

    #[tokio::test]
    async fn test_top_n_checks_result_count() {
        let reply = json!({"success": true, "data": [{"ResultCount": 3}]});
        let driver = ScriptedDriver::replying(reply);
        let registry = ProcedureRegistry::e2e(driver.clone(), "testdb");

        let result = run(&registry, "run_e2e_select_top_n_queries", driver).await;
        assert!(!result.success);
        assert_eq!(result.test_name, "Simple Select TOP 5 from Authors");
    }

    #[tokio::test]
    async fn test_count_with_filter_checks_nested_count() {
        let reply = json!({"success": true, "data": [{"Result": {"Count": 5}}]});
        let driver = ScriptedDriver::replying(reply);
        let registry = ProcedureRegistry::e2e(driver.clone(), "testdb");

        let passed =
            run(&registry, "run_e2e_selects_count_with_single_filter", driver.clone()).await;
        assert!(passed.success);

        let failed = run(&registry, "run_e2e_selects_count_with_multiple_filters", driver).await;
        assert!(!failed.success);
    }

    #[tokio::test]
    async fn test_empty_data_and_server_failure() {
        let reply = json!({"success": false, "data": [], "message": "no such bundle"});
        let driver = ScriptedDriver::replying(reply);
        let registry = ProcedureRegistry::e2e(driver.clone(), "testdb");

        let result = run(&registry, "run_e2e_selects_count", driver).await;
        assert!(!result.success);
        assert_eq!(result.response_message, "No data returned");
        assert_eq!(result.error_message.as_deref(), Some("no such bundle"));
    }

    #[tokio::test]
    async fn test_simple_add_sends_add_statement() {
        let driver = ScriptedDriver::replying(json!("1 document inserted"));
        let registry = ProcedureRegistry::e2e(driver.clone(), "testdb");

        let result = run(&registry, "run_e2e_simple_adds", driver.clone()).await;
        assert!(result.success);
        assert_eq!(result.response_message, "Test succeeded");
        assert!(driver.statements.lock()[0].starts_with("ADD DOCUMENT TO BUNDLE \"Authors\""));
    }
}
