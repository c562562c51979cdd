//! Test runner: dispatch by name, normalize results and keep totals.

use crate::error::{DispatchErrorKind, Result, SyndrError};
use crate::models::{TestResult, TestSummary};
use crate::test_engine::procedures::ProcedureRegistry;

use std::sync::Arc;
use std::time::Instant;

/// Runs procedures from a [`ProcedureRegistry`] and accumulates results.
#[derive(Debug)]
pub struct TestRunner {
    procedures: Arc<ProcedureRegistry>,
    results: Vec<TestResult>,
}

impl TestRunner {
    pub fn new(procedures: Arc<ProcedureRegistry>) -> Self {
        Self { procedures, results: Vec::new() }
    }

    /// Run one procedure after making sure the test database is selected.
    ///
    /// Unknown or unimplemented names fail before setup runs.
    pub async fn run_by_name(&self, name: &str) -> Result<TestResult> {
        let procedure = self.procedures.resolve(name)?;
        self.procedures.ensure_setup().await?;

        let started = Instant::now();
        let result = procedure(self.procedures.driver()).await?;
        let elapsed_ms = started.elapsed().as_secs_f64() * 1000.0;

        // Procedures without server timing report zero.
        let result = if result.execution_time_ms == 0.0 {
            result.with_execution_time(elapsed_ms)
        } else {
            result
        };

        if !result.is_well_formed() {
            tracing::warn!(test_name = name, "Procedure returned a malformed result");
            return Err(SyndrError::dispatch(name, DispatchErrorKind::MalformedResult));
        }

        tracing::info!(
            test_name = name,
            success = result.success,
            elapsed_ms = result.execution_time_ms,
            "Test finished"
        );
        Ok(result)
    }

    /// Run `names` in order, recording one result per name.
    ///
    /// Errors become failed results. Returns the summary of this batch.
    pub async fn run_selected<S>(&mut self, category: &str, names: &[S]) -> TestSummary
    where
        S: AsRef<str>,
    {
        let start = self.results.len();
        for name in names {
            let name = name.as_ref();
            let result = match self.run_by_name(name).await {
                Ok(result) => result,
                Err(e) => {
                    tracing::warn!(test_name = name, error = %e, "Test did not complete");
                    TestResult::errored(name, e.to_string())
                }
            };
            self.results.push(result);
        }

        let summary = TestSummary::from_results(category, self.results[start..].iter().map(Some));
        tracing::info!(
            category,
            total = summary.total_tests,
            passed = summary.total_passed,
            failed = summary.total_failed,
            "Batch finished"
        );
        summary
    }

    /// Totals over every result recorded so far.
    pub fn summary(&self, category: &str) -> TestSummary {
        TestSummary::from_results(category, self.results.iter().map(Some))
    }

    pub fn results(&self) -> &[TestResult] {
        &self.results
    }

    pub fn clear(&mut self) {
        self.results.clear();
    }

    pub fn procedures(&self) -> &ProcedureRegistry {
        &self.procedures
    }
}
