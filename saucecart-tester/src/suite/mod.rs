//! Test classes, their test methods and the catalog the CLI selects from.

pub mod dashboard;
pub mod login;
mod soft;

pub use soft::SoftAssert;

use std::sync::Arc;

use anyhow::Result;
use async_trait::async_trait;

use crate::config::SuiteConfig;
use crate::fixture::Interactor;

/// What a test body sees: the class's live session and the suite parameters.
#[derive(Clone, Copy)]
pub struct TestCtx<'a> {
    pub ui: &'a Interactor,
    pub suite: &'a SuiteConfig,
    pub verbose: bool,
}

/// One test method.
#[async_trait]
pub trait BrowserTest: Send + Sync {
    fn name(&self) -> &'static str;

    /// Lower runs first; ties are broken by name.
    fn priority(&self) -> i32 {
        0
    }

    /// How many times the method is invoked per run.
    fn invocations(&self) -> u32 {
        1
    }

    /// Share of invocations that must pass for failures to be tolerated.
    fn success_percentage(&self) -> u32 {
        100
    }

    async fn run(&self, ctx: &TestCtx<'_>) -> Result<()>;
}

/// A group of test methods sharing one browser session.
#[async_trait]
pub trait TestClass: Send + Sync {
    fn name(&self) -> &'static str;

    fn description(&self) -> &'static str;

    fn tests(&self) -> Vec<Arc<dyn BrowserTest>>;

    /// Runs after the fixture has reset the session to the base URL.
    async fn before_each(&self, _ctx: &TestCtx<'_>) -> Result<()> {
        Ok(())
    }

    async fn after_each(&self, _ctx: &TestCtx<'_>) -> Result<()> {
        Ok(())
    }
}

/// Execution order of a class's methods: `(priority, name)`.
#[must_use]
pub fn ordered(class: &dyn TestClass) -> Vec<Arc<dyn BrowserTest>> {
    let mut tests = class.tests();
    tests.sort_by(|a, b| {
        a.priority()
            .cmp(&b.priority())
            .then_with(|| a.name().cmp(b.name()))
    });
    tests
}

pub fn get_class(name: &str) -> Option<Arc<dyn TestClass>> {
    match name.trim().to_lowercase().as_str() {
        "login" => Some(Arc::new(login::LoginTests)),
        "dashboard" | "inventory" => Some(Arc::new(dashboard::DashboardTests)),
        _ => None,
    }
}

pub fn list_classes() -> Vec<(&'static str, &'static str)> {
    [login::LoginTests.name(), dashboard::DashboardTests.name()]
        .into_iter()
        .filter_map(get_class)
        .map(|class| (class.name(), class.description()))
        .collect()
}
