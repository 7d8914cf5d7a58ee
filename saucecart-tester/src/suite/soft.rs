use std::fmt::Debug;

use crate::error::{AssertionMismatch, TestError, TestResult};

/// Collects failed checks so one test can report all of them at once.
#[derive(Debug, Default)]
pub struct SoftAssert {
    failures: Vec<AssertionMismatch>,
}

impl SoftAssert {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn assert_eq<T>(&mut self, actual: T, expected: T, message: &str)
    where
        T: PartialEq + Debug,
    {
        if actual != expected {
            self.record(message, format!("{expected:?}"), format!("{actual:?}"));
        }
    }

    pub fn assert_true(&mut self, condition: bool, message: &str) {
        if !condition {
            self.record(message, "true".into(), "false".into());
        }
    }

    pub fn assert_false(&mut self, condition: bool, message: &str) {
        if condition {
            self.record(message, "false".into(), "true".into());
        }
    }

    fn record(&mut self, message: &str, expected: String, actual: String) {
        log::warn!("Soft assertion failed: {message}");
        self.failures.push(AssertionMismatch {
            message: message.to_string(),
            expected,
            actual,
        });
    }

    #[must_use]
    pub fn failures(&self) -> &[AssertionMismatch] {
        &self.failures
    }

    /// Raises every collected mismatch, or passes when none were recorded.
    pub fn assert_all(self) -> TestResult<()> {
        if self.failures.is_empty() {
            Ok(())
        } else {
            Err(TestError::Assertions(self.failures))
        }
    }
}
