//! Suite lifecycle: one fixture per test class, ordered methods, retries and
//! listener notifications.

mod retry;

pub use retry::{RetryDecision, RetryPolicy};

use std::sync::Arc;
use std::time::{Duration, Instant};

use chrono::Local;
use tokio::task::JoinSet;

use crate::browser::SessionFactory;
use crate::config::{SuiteConfig, WaitConfig};
use crate::error::TestResult;
use crate::fixture::Fixture;
use crate::report::{
    ExecutionId, FailureDetail, Outcome, SuiteInfo, TestInvocation, TestListener, TestRecord,
};
use crate::suite::{self, BrowserTest, TestClass, TestCtx};

/// Failed invocations a method can absorb and still meet `success_percentage`.
#[must_use]
pub fn allowed_failures(invocations: u32, success_percentage: u32) -> u32 {
    let required = invocations
        .saturating_mul(success_percentage.min(100))
        .div_ceil(100);
    invocations.saturating_sub(required)
}

#[derive(Debug, Clone)]
pub struct SuiteOutcome {
    pub suite: SuiteInfo,
    pub records: Vec<TestRecord>,
}

impl SuiteOutcome {
    #[must_use]
    pub fn has_failures(&self) -> bool {
        self.records.iter().any(TestRecord::is_failure)
    }
}

enum Attempt {
    Passed,
    /// A setup step failed before the test body ran.
    Skipped(String),
    Failed(anyhow::Error),
}

fn invocation_of(
    context: ExecutionId,
    class: &dyn TestClass,
    test: &dyn BrowserTest,
    browser: &str,
    invocation: u32,
) -> TestInvocation {
    TestInvocation {
        context,
        class: class.name(),
        method: test.name(),
        browser: browser.to_string(),
        invocation,
        invocations: test.invocations().max(1),
        attempt: 1,
    }
}

fn record(
    test: &TestInvocation,
    outcome: Outcome,
    duration: Duration,
    failure: Option<String>,
) -> TestRecord {
    TestRecord {
        class: test.class.to_string(),
        name: test.display_name(),
        browser: test.browser.clone(),
        outcome,
        attempts: test.attempt,
        duration,
        failure,
    }
}

/// Runs test classes for one `(browser, base_url)` suite.
#[derive(Clone)]
pub struct SuiteRunner {
    factory: Arc<dyn SessionFactory>,
    listener: Arc<dyn TestListener>,
    waits: WaitConfig,
    retry: RetryPolicy,
    parallel: bool,
    verbose: bool,
}

impl SuiteRunner {
    pub fn new(factory: Arc<dyn SessionFactory>, listener: Arc<dyn TestListener>) -> Self {
        Self {
            factory,
            listener,
            waits: WaitConfig::default(),
            retry: RetryPolicy::default(),
            parallel: false,
            verbose: false,
        }
    }

    #[must_use]
    pub const fn with_waits(mut self, waits: WaitConfig) -> Self {
        self.waits = waits;
        self
    }

    #[must_use]
    pub const fn with_retry(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    /// Run test classes concurrently, each on its own session.
    #[must_use]
    pub const fn parallel(mut self, parallel: bool) -> Self {
        self.parallel = parallel;
        self
    }

    #[must_use]
    pub const fn verbose(mut self, verbose: bool) -> Self {
        self.verbose = verbose;
        self
    }

    /// Fails only when a class hits a fatal setup error. The listener sees
    /// `on_suite_finish` either way.
    pub async fn run_suite(
        &self,
        config: &SuiteConfig,
        classes: &[Arc<dyn TestClass>],
    ) -> TestResult<SuiteOutcome> {
        let info = SuiteInfo {
            name: config.name(),
            browser: config.browser().to_string(),
            base_url: config.base_url().to_string(),
            started_at: Local::now(),
        };
        log::info!("Starting Test Suite: {}", info.name);
        self.listener.on_suite_start(&info).await;

        let result = if self.parallel {
            self.run_parallel(config, classes).await
        } else {
            self.run_sequential(config, classes).await
        };

        self.listener.on_suite_finish(&info).await;
        log::info!("Ending Test Suite: {}", info.name);
        result.map(|records| SuiteOutcome {
            suite: info,
            records,
        })
    }

    async fn run_sequential(
        &self,
        config: &SuiteConfig,
        classes: &[Arc<dyn TestClass>],
    ) -> TestResult<Vec<TestRecord>> {
        let mut records = Vec::new();
        for class in classes {
            records.extend(self.run_class(config.clone(), Arc::clone(class)).await?);
        }
        Ok(records)
    }

    async fn run_parallel(
        &self,
        config: &SuiteConfig,
        classes: &[Arc<dyn TestClass>],
    ) -> TestResult<Vec<TestRecord>> {
        let mut workers = JoinSet::new();
        for (index, class) in classes.iter().enumerate() {
            let runner = self.clone();
            let config = config.clone();
            let class = Arc::clone(class);
            workers.spawn(async move { (index, runner.run_class(config, class).await) });
        }

        let mut finished = Vec::with_capacity(classes.len());
        let mut fatal = None;
        while let Some(joined) = workers.join_next().await {
            match joined {
                Ok((index, Ok(records))) => finished.push((index, records)),
                Ok((_, Err(err))) => {
                    fatal.get_or_insert(err);
                }
                Err(err) => log::error!("Test class worker stopped unexpectedly: {err}"),
            }
        }
        if let Some(err) = fatal {
            return Err(err);
        }
        finished.sort_by_key(|(index, _)| *index);
        Ok(finished
            .into_iter()
            .flat_map(|(_, records)| records)
            .collect())
    }

    async fn run_class(
        &self,
        config: SuiteConfig,
        class: Arc<dyn TestClass>,
    ) -> TestResult<Vec<TestRecord>> {
        let context = ExecutionId::next();
        let tests = suite::ordered(class.as_ref());
        let mut fixture = Fixture::new(Arc::clone(&self.factory), config, self.waits);
        let browser = fixture.suite().browser().to_string();
        log::info!(
            "Setting up class {} on {} (context {})",
            class.name(),
            browser,
            context.get()
        );

        let mut records = Vec::new();
        if let Err(err) = fixture.set_up().await {
            fixture.tear_down().await;
            if err.is_fatal() {
                log::error!("Aborting suite: {err}");
                return Err(err);
            }
            let reason = format!("Class setup failed: {err}");
            log::warn!("Skipping every test of {}: {reason}", class.name());
            for test in &tests {
                records.extend(
                    self.skip_method(context, class.as_ref(), test.as_ref(), &browser, &reason)
                        .await,
                );
            }
            return Ok(records);
        }

        for test in &tests {
            records.extend(
                self.run_method(&mut fixture, context, class.as_ref(), test.as_ref())
                    .await,
            );
        }
        fixture.tear_down().await;
        log::info!("Driver shut down for class {}", class.name());
        Ok(records)
    }

    async fn skip_method(
        &self,
        context: ExecutionId,
        class: &dyn TestClass,
        test: &dyn BrowserTest,
        browser: &str,
        reason: &str,
    ) -> Vec<TestRecord> {
        let mut records = Vec::new();
        for invocation in 1..=test.invocations().max(1) {
            let current = invocation_of(context, class, test, browser, invocation);
            self.listener.on_test_start(&current).await;
            self.listener.on_test_skip(&current, reason).await;
            records.push(record(
                &current,
                Outcome::Skip,
                Duration::ZERO,
                Some(reason.to_string()),
            ));
        }
        records
    }

    async fn run_method(
        &self,
        fixture: &mut Fixture,
        context: ExecutionId,
        class: &dyn TestClass,
        test: &dyn BrowserTest,
    ) -> Vec<TestRecord> {
        let browser = fixture.suite().browser().to_string();
        let invocations = test.invocations().max(1);
        let allowed = allowed_failures(invocations, test.success_percentage());
        let mut failures = 0;
        let mut records = Vec::new();

        for invocation in 1..=invocations {
            let mut current = invocation_of(context, class, test, &browser, invocation);
            let mut counter = self.retry.counter();
            let started = Instant::now();

            let (outcome, failure) = loop {
                log::info!("Starting Test: {}::{}", class.name(), current.display_name());
                self.listener.on_test_start(&current).await;

                match self.attempt(fixture, class, test).await {
                    Attempt::Passed => {
                        self.listener.on_test_pass(&current).await;
                        self.after_hooks(fixture, class).await;
                        break (Outcome::Pass, None);
                    }
                    Attempt::Skipped(reason) => {
                        self.listener.on_test_skip(&current, &reason).await;
                        break (Outcome::Skip, Some(reason));
                    }
                    Attempt::Failed(err) => {
                        let detail = FailureDetail::from_error(&err);
                        match self.retry.intercept(&mut counter, fixture).await {
                            RetryDecision::Retry { attempt } => {
                                self.listener.on_test_retry(&current, &detail).await;
                                current.attempt = attempt;
                            }
                            RetryDecision::GiveUp => {
                                failures += 1;
                                let outcome = if failures <= allowed {
                                    self.listener
                                        .on_test_fail_within_threshold(&current, &detail)
                                        .await;
                                    Outcome::FailWithinThreshold
                                } else {
                                    let driver = fixture.driver();
                                    self.listener
                                        .on_test_fail(&current, &detail, driver.as_deref())
                                        .await;
                                    Outcome::Fail
                                };
                                self.after_hooks(fixture, class).await;
                                break (outcome, Some(detail.message));
                            }
                        }
                    }
                }
            };

            records.push(record(&current, outcome, started.elapsed(), failure));
        }
        records
    }

    /// Navigation reset, the class's before-each hook, then the test body.
    async fn attempt(
        &self,
        fixture: &mut Fixture,
        class: &dyn TestClass,
        test: &dyn BrowserTest,
    ) -> Attempt {
        if let Err(err) = fixture.before_method().await {
            fixture.after_method();
            return Attempt::Skipped(format!("Navigation to base URL failed: {err}"));
        }
        let ui = match fixture.ui() {
            Ok(ui) => ui,
            Err(err) => return Attempt::Skipped(err.to_string()),
        };
        let ctx = TestCtx {
            ui,
            suite: fixture.suite(),
            verbose: self.verbose,
        };
        if let Err(err) = class.before_each(&ctx).await {
            let reason = format!("Before-each hook failed: {err:#}");
            fixture.after_method();
            return Attempt::Skipped(reason);
        }
        match test.run(&ctx).await {
            Ok(()) => Attempt::Passed,
            Err(err) => {
                log::warn!("{} failed: {err:#}", test.name());
                Attempt::Failed(err)
            }
        }
    }

    async fn after_hooks(&self, fixture: &mut Fixture, class: &dyn TestClass) {
        if let Ok(ui) = fixture.ui() {
            let ctx = TestCtx {
                ui,
                suite: fixture.suite(),
                verbose: self.verbose,
            };
            if let Err(err) = class.after_each(&ctx).await {
                log::warn!("After-each hook of {} failed: {err:#}", class.name());
            }
        }
        fixture.after_method();
    }
}
