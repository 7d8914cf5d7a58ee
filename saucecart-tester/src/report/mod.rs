//! Test lifecycle listeners and the persisted suite report.

mod console;
mod html;
mod listener;
mod reporting;
pub mod screenshot;
pub mod summary;

pub use console::ConsoleListener;
pub use listener::{
    ExecutionId, FailureDetail, Listeners, SuiteInfo, TestInvocation, TestListener,
};
pub use reporting::ReportingListener;
pub use summary::TestRecord;

use std::fmt;
use std::path::PathBuf;

use chrono::{DateTime, Local};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Outcome {
    Pass,
    Fail,
    Skip,
    FailWithinThreshold,
}

impl Outcome {
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Pass => "PASS",
            Self::Fail => "FAIL",
            Self::Skip => "SKIP",
            Self::FailWithinThreshold => "FAIL_WITHIN_THRESHOLD",
        }
    }
}

impl fmt::Display for Outcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// One test's recorded outcome and diagnostic attachments.
#[derive(Debug, Clone, Serialize)]
pub struct ReportEntry {
    pub name: String,
    pub class: String,
    pub browser: String,
    /// `None` while the test is still running.
    pub outcome: Option<Outcome>,
    pub attempts: u32,
    /// Diagnostics of failed attempts that were retried.
    pub attempt_log: Vec<String>,
    pub failure: Option<FailureDetail>,
    pub skip_reason: Option<String>,
    pub screenshot: Option<PathBuf>,
    pub started_at: DateTime<Local>,
    pub finished_at: Option<DateTime<Local>>,
}

impl ReportEntry {
    #[must_use]
    pub fn open(test: &TestInvocation) -> Self {
        Self {
            name: test.display_name(),
            class: test.class.to_string(),
            browser: test.browser.clone(),
            outcome: None,
            attempts: test.attempt,
            attempt_log: Vec::new(),
            failure: None,
            skip_reason: None,
            screenshot: None,
            started_at: Local::now(),
            finished_at: None,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct ReportDocument {
    pub title: String,
    pub report_name: String,
    pub suite: String,
    pub browser: String,
    pub base_url: String,
    pub started_at: DateTime<Local>,
    pub finished_at: Option<DateTime<Local>>,
    pub entries: Vec<ReportEntry>,
}

impl ReportDocument {
    #[must_use]
    pub fn new(suite: &SuiteInfo) -> Self {
        Self {
            title: "Test Report".to_string(),
            report_name: "Saucecart Report".to_string(),
            suite: suite.name.clone(),
            browser: suite.browser.clone(),
            base_url: suite.base_url.clone(),
            started_at: suite.started_at,
            finished_at: None,
            entries: Vec::new(),
        }
    }

    #[must_use]
    pub fn count(&self, outcome: Outcome) -> usize {
        self.entries
            .iter()
            .filter(|entry| entry.outcome == Some(outcome))
            .count()
    }

    pub fn entry(&self, name: &str) -> Option<&ReportEntry> {
        self.entries.iter().rev().find(|entry| entry.name == name)
    }
}
