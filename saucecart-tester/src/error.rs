use std::fmt;
use std::time::Duration;

use thiserror::Error;

/// One failed check collected by a soft assertion.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AssertionMismatch {
    pub message: String,
    pub expected: String,
    pub actual: String,
}

impl fmt::Display for AssertionMismatch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} expected [{}] but found [{}]",
            self.message, self.expected, self.actual
        )
    }
}

fn render_mismatches(mismatches: &[AssertionMismatch]) -> String {
    let lines: Vec<String> = mismatches.iter().map(ToString::to_string).collect();
    format!(
        "The following asserts failed:\n\t{}",
        lines.join(",\n\t")
    )
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WaitCondition {
    Visible,
    Clickable,
    PageLoaded,
}

impl fmt::Display for WaitCondition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::Visible => "visible",
            Self::Clickable => "clickable",
            Self::PageLoaded => "fully loaded",
        };
        f.write_str(label)
    }
}

#[derive(Debug, Error)]
pub enum TestError {
    #[error("Browser {0} not supported")]
    UnsupportedBrowser(String),

    #[error("Timed out after {waited:?} waiting for {target} to be {condition}")]
    Timeout {
        target: String,
        condition: WaitCondition,
        waited: Duration,
    },

    #[error("Cannot locate option with text '{option}' in {locator}")]
    NoSuchOption { locator: String, option: String },

    #[error("{}", render_mismatches(.0))]
    Assertions(Vec<AssertionMismatch>),

    #[error("Screenshot capture failed: {0}")]
    Screenshot(String),

    #[error("Session setup failed: {0}")]
    Setup(String),

    #[error("No live browser session")]
    NoSession,

    #[error("Driver error: {0}")]
    Driver(String),

    #[error("WebDriver error: {0}")]
    WebDriver(#[from] thirtyfour::error::WebDriverError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl TestError {
    /// Unsupported browsers abort the whole suite; everything else stays local to one test.
    #[must_use]
    pub const fn is_fatal(&self) -> bool {
        matches!(self, Self::UnsupportedBrowser(_))
    }
}

pub type TestResult<T> = Result<T, TestError>;
