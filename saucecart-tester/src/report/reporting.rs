use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use async_trait::async_trait;
use chrono::Local;
use parking_lot::{Mutex, RwLock};

use super::html::render_html;
use super::screenshot::capture_screenshot;
use super::{
    ExecutionId, FailureDetail, Outcome, ReportDocument, ReportEntry, SuiteInfo, TestInvocation,
    TestListener,
};
use crate::browser::Driver;
use crate::error::TestResult;

/// Builds the HTML report of one suite run and attaches failure screenshots.
///
/// Open entries live in a map keyed by [`ExecutionId`], one per running
/// test-class worker, so concurrently running tests never write into each
/// other's entry. Each open entry carries its own lock; the map lock is only
/// taken to open or finalize an entry.
pub struct ReportingListener {
    report_dir: PathBuf,
    screenshots_dir: PathBuf,
    document: Mutex<Option<ReportDocument>>,
    open_entries: RwLock<HashMap<ExecutionId, Arc<Mutex<ReportEntry>>>>,
    report_path: Mutex<Option<PathBuf>>,
    finished: Mutex<Option<ReportDocument>>,
}

impl ReportingListener {
    pub fn new(report_dir: impl Into<PathBuf>, screenshots_dir: impl Into<PathBuf>) -> Self {
        Self {
            report_dir: report_dir.into(),
            screenshots_dir: screenshots_dir.into(),
            document: Mutex::new(None),
            open_entries: RwLock::new(HashMap::new()),
            report_path: Mutex::new(None),
            finished: Mutex::new(None),
        }
    }

    /// Path of the HTML artifact, known once the suite has started.
    pub fn report_path(&self) -> Option<PathBuf> {
        self.report_path.lock().clone()
    }

    /// The flushed document, available after `on_suite_finish`.
    pub fn finished_document(&self) -> Option<ReportDocument> {
        self.finished.lock().clone()
    }

    fn open_entry(&self, context: ExecutionId) -> Option<Arc<Mutex<ReportEntry>>> {
        self.open_entries.read().get(&context).cloned()
    }

    fn finalize(&self, test: &TestInvocation, apply: impl FnOnce(&mut ReportEntry)) {
        let Some(entry) = self.open_entries.write().remove(&test.context) else {
            log::error!(
                "Failed to log result of {}; no report entry is open",
                test.display_name()
            );
            return;
        };
        let mut entry = entry.lock().clone();
        apply(&mut entry);
        entry.finished_at = Some(Local::now());

        match self.document.lock().as_mut() {
            Some(document) => document.entries.push(entry),
            None => log::error!("Report entry {} finished outside a suite", entry.name),
        }
    }

    fn write_artifacts(&self, document: &ReportDocument, html_path: &Path) -> TestResult<()> {
        fs::create_dir_all(&self.report_dir)?;
        fs::write(html_path, render_html(document))?;
        fs::write(
            html_path.with_extension("json"),
            serde_json::to_vec_pretty(document)?,
        )?;
        Ok(())
    }
}

#[async_trait]
impl TestListener for ReportingListener {
    async fn on_suite_start(&self, suite: &SuiteInfo) {
        let stamp = suite.started_at.format("%Y%m%d_%H%M%S");
        // One file per suite run; suites for different browsers can start in the same second.
        let path = self
            .report_dir
            .join(format!("report_{}_{stamp}.html", suite.browser));
        log::info!("Report for suite {} initialized at: {}", suite.name, path.display());
        *self.report_path.lock() = Some(path);
        *self.document.lock() = Some(ReportDocument::new(suite));
        *self.finished.lock() = None;
    }

    async fn on_test_start(&self, test: &TestInvocation) {
        if test.attempt > 1
            && let Some(entry) = self.open_entry(test.context)
        {
            entry.lock().attempts = test.attempt;
            return;
        }
        self.open_entries
            .write()
            .insert(test.context, Arc::new(Mutex::new(ReportEntry::open(test))));
    }

    async fn on_test_pass(&self, test: &TestInvocation) {
        self.finalize(test, |entry| {
            entry.outcome = Some(Outcome::Pass);
            entry.failure = None;
            entry.screenshot = None;
        });
    }

    async fn on_test_fail(
        &self,
        test: &TestInvocation,
        failure: &FailureDetail,
        driver: Option<&dyn Driver>,
    ) {
        let screenshot = match driver {
            Some(driver) => {
                capture_screenshot(driver, &self.screenshots_dir, &test.display_name()).await
            }
            None => {
                log::warn!(
                    "No session to capture a screenshot of {} from",
                    test.display_name()
                );
                None
            }
        };
        self.finalize(test, |entry| {
            entry.outcome = Some(Outcome::Fail);
            entry.failure = Some(failure.clone());
            entry.screenshot = screenshot;
        });
    }

    async fn on_test_retry(&self, test: &TestInvocation, failure: &FailureDetail) {
        log::warn!(
            "Attempt {} of {} failed, retrying: {}",
            test.attempt,
            test.display_name(),
            failure.message
        );
        match self.open_entry(test.context) {
            Some(entry) => entry
                .lock()
                .attempt_log
                .push(format!("attempt {} failed: {}", test.attempt, failure.message)),
            None => log::error!("No open report entry for retried {}", test.display_name()),
        }
    }

    async fn on_test_skip(&self, test: &TestInvocation, reason: &str) {
        self.finalize(test, |entry| {
            entry.outcome = Some(Outcome::Skip);
            entry.skip_reason = Some(reason.to_string());
        });
    }

    async fn on_test_fail_within_threshold(&self, test: &TestInvocation, failure: &FailureDetail) {
        self.finalize(test, |entry| {
            entry.outcome = Some(Outcome::FailWithinThreshold);
            entry.failure = Some(failure.clone());
        });
    }

    async fn on_suite_finish(&self, suite: &SuiteInfo) {
        let leftovers: Vec<_> = self.open_entries.write().drain().collect();
        for (_, entry) in leftovers {
            log::warn!("Dropping unfinished report entry {}", entry.lock().name);
        }

        let Some(mut document) = self.document.lock().take() else {
            log::error!("Suite {} finished without being started", suite.name);
            return;
        };
        document.finished_at = Some(Local::now());

        if let Some(path) = self.report_path() {
            match self.write_artifacts(&document, &path) {
                Ok(()) => log::info!("Report generated successfully at: {}", path.display()),
                Err(err) => log::error!("Failed to generate report: {err}"),
            }
        }
        *self.finished.lock() = Some(document);
    }
}
