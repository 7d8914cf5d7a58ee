use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use async_trait::async_trait;
use chrono::{DateTime, Local};
use serde::Serialize;

use crate::browser::Driver;

/// Identity of one concurrently executing test-class worker.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ExecutionId(u64);

impl ExecutionId {
    pub fn next() -> Self {
        static NEXT: AtomicU64 = AtomicU64::new(1);
        Self(NEXT.fetch_add(1, Ordering::Relaxed))
    }

    #[must_use]
    pub const fn get(self) -> u64 {
        self.0
    }
}

#[derive(Debug, Clone)]
pub struct SuiteInfo {
    pub name: String,
    pub browser: String,
    pub base_url: String,
    pub started_at: DateTime<Local>,
}

/// One attempt of one invocation of a test method.
#[derive(Debug, Clone)]
pub struct TestInvocation {
    pub context: ExecutionId,
    pub class: &'static str,
    pub method: &'static str,
    pub browser: String,
    pub invocation: u32,
    pub invocations: u32,
    pub attempt: u32,
}

impl TestInvocation {
    #[must_use]
    pub fn display_name(&self) -> String {
        if self.invocations > 1 {
            format!("{} ({}/{})", self.method, self.invocation, self.invocations)
        } else {
            self.method.to_string()
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FailureDetail {
    pub message: String,
    pub stack: String,
}

impl FailureDetail {
    #[must_use]
    pub fn from_error(err: &anyhow::Error) -> Self {
        Self {
            message: err.to_string(),
            stack: format!("{err:?}"),
        }
    }
}

/// Lifecycle hooks fired by the suite runner.
#[async_trait]
pub trait TestListener: Send + Sync {
    async fn on_suite_start(&self, _suite: &SuiteInfo) {}

    async fn on_test_start(&self, _test: &TestInvocation) {}

    async fn on_test_pass(&self, _test: &TestInvocation) {}

    /// Final failure of an invocation. `driver` is the session the test ran on.
    async fn on_test_fail(
        &self,
        _test: &TestInvocation,
        _failure: &FailureDetail,
        _driver: Option<&dyn Driver>,
    ) {
    }

    /// A failed attempt that the retry policy is about to re-run.
    async fn on_test_retry(&self, _test: &TestInvocation, _failure: &FailureDetail) {}

    async fn on_test_skip(&self, _test: &TestInvocation, _reason: &str) {}

    async fn on_test_fail_within_threshold(
        &self,
        _test: &TestInvocation,
        _failure: &FailureDetail,
    ) {
    }

    async fn on_suite_finish(&self, _suite: &SuiteInfo) {}
}

/// Fans every hook out to each listener in registration order.
#[derive(Clone, Default)]
pub struct Listeners(Vec<Arc<dyn TestListener>>);

impl Listeners {
    #[must_use]
    pub fn new(listeners: Vec<Arc<dyn TestListener>>) -> Self {
        Self(listeners)
    }
}

#[async_trait]
impl TestListener for Listeners {
    async fn on_suite_start(&self, suite: &SuiteInfo) {
        for listener in &self.0 {
            listener.on_suite_start(suite).await;
        }
    }

    async fn on_test_start(&self, test: &TestInvocation) {
        for listener in &self.0 {
            listener.on_test_start(test).await;
        }
    }

    async fn on_test_pass(&self, test: &TestInvocation) {
        for listener in &self.0 {
            listener.on_test_pass(test).await;
        }
    }

    async fn on_test_fail(
        &self,
        test: &TestInvocation,
        failure: &FailureDetail,
        driver: Option<&dyn Driver>,
    ) {
        for listener in &self.0 {
            listener.on_test_fail(test, failure, driver).await;
        }
    }

    async fn on_test_retry(&self, test: &TestInvocation, failure: &FailureDetail) {
        for listener in &self.0 {
            listener.on_test_retry(test, failure).await;
        }
    }

    async fn on_test_skip(&self, test: &TestInvocation, reason: &str) {
        for listener in &self.0 {
            listener.on_test_skip(test, reason).await;
        }
    }

    async fn on_test_fail_within_threshold(&self, test: &TestInvocation, failure: &FailureDetail) {
        for listener in &self.0 {
            listener.on_test_fail_within_threshold(test, failure).await;
        }
    }

    async fn on_suite_finish(&self, suite: &SuiteInfo) {
        for listener in &self.0 {
            listener.on_suite_finish(suite).await;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn execution_ids_are_unique() {
        let a = ExecutionId::next();
        let b = ExecutionId::next();
        assert_ne!(a, b);
        assert!(b.get() > a.get());
    }

    #[test]
    fn display_name_mentions_invocation_only_when_repeated() {
        let mut test = TestInvocation {
            context: ExecutionId::next(),
            class: "login",
            method: "valid_user_login",
            browser: "chrome".into(),
            invocation: 1,
            invocations: 1,
            attempt: 1,
        };
        assert_eq!(test.display_name(), "valid_user_login");
        test.invocations = 3;
        test.invocation = 2;
        assert_eq!(test.display_name(), "valid_user_login (2/3)");
    }

    #[test]
    fn failure_detail_keeps_cause_chain_in_stack() {
        let err = anyhow::anyhow!("root cause").context("outer failure");
        let detail = FailureDetail::from_error(&err);
        assert_eq!(detail.message, "outer failure");
        assert!(detail.stack.contains("root cause"));
    }
}
