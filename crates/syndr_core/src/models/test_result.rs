//! Test outcome and summary models.

use serde::{Deserialize, Serialize};

/// Canonical output of a test procedure.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TestResult {
    /// Display name of the test
    pub test_name: String,
    /// Whether every check passed
    pub success: bool,
    /// Human-readable description of what the server answered
    pub response_message: String,
    /// Failure detail, when the test could not run or the query failed
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error_message: Option<String>,
    /// Execution time in milliseconds
    pub execution_time_ms: f64,
}

impl TestResult {
    /// Create a result with the given verdict.
    pub fn new(
        test_name: impl Into<String>,
        success: bool,
        response_message: impl Into<String>,
    ) -> Self {
        Self {
            test_name: test_name.into(),
            success,
            response_message: response_message.into(),
            error_message: None,
            execution_time_ms: 0.0,
        }
    }

    /// Create a failed result for a test that could not complete.
    pub fn errored(test_name: impl Into<String>, error: impl Into<String>) -> Self {
        let error = error.into();
        Self {
            test_name: test_name.into(),
            success: false,
            response_message: "Test did not complete".to_string(),
            error_message: Some(error),
            execution_time_ms: 0.0,
        }
    }

    /// Set the execution time.
    pub fn with_execution_time(mut self, execution_time_ms: f64) -> Self {
        self.execution_time_ms = execution_time_ms;
        self
    }

    /// Set the error message.
    pub fn with_error(mut self, error: impl Into<String>) -> Self {
        self.error_message = Some(error.into());
        self
    }

    /// Check that the result is complete enough to report.
    pub fn is_well_formed(&self) -> bool {
        !self.test_name.trim().is_empty()
            && self.execution_time_ms.is_finite()
            && self.execution_time_ms >= 0.0
    }
}

/// Pass/fail totals for one category of tests.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TestSummary {
    /// Category name
    pub category: String,
    /// Number of results counted
    pub total_tests: usize,
    /// Results with `success == true`
    pub total_passed: usize,
    /// Results with `success == false`
    pub total_failed: usize,
}

impl TestSummary {
    /// Recompute totals over `results`, skipping missing entries.
    pub fn from_results<'a, I>(category: impl Into<String>, results: I) -> Self
    where
        I: IntoIterator<Item = Option<&'a TestResult>>,
    {
        let (total_passed, total_failed) = results
            .into_iter()
            .flatten()
            .fold((0, 0), |(passed, failed), result| {
                if result.success {
                    (passed + 1, failed)
                } else {
                    (passed, failed + 1)
                }
            });

        Self {
            category: category.into(),
            total_tests: total_passed + total_failed,
            total_passed,
            total_failed,
        }
    }

    /// Check if every counted test passed.
    pub fn all_passed(&self) -> bool {
        self.total_failed == 0
    }
}
