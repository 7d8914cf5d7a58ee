use std::time::Duration;

use url::Url;

use crate::error::{TestError, TestResult};

pub const DEFAULT_BASE_URL: &str = "https://www.saucedemo.com/";

/// The two externally supplied parameters of one suite run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SuiteConfig {
    browser: String,
    base_url: Url,
}

impl SuiteConfig {
    pub fn new(browser: impl Into<String>, base_url: &str) -> TestResult<Self> {
        let parsed = Url::parse(base_url)
            .map_err(|err| TestError::Setup(format!("invalid base URL '{base_url}': {err}")))?;
        if !matches!(parsed.scheme(), "http" | "https") {
            return Err(TestError::Setup(format!(
                "base URL '{base_url}' must be an absolute http(s) URL"
            )));
        }
        Ok(Self {
            browser: browser.into(),
            base_url: parsed,
        })
    }

    #[must_use]
    pub fn browser(&self) -> &str {
        &self.browser
    }

    #[must_use]
    pub fn base_url(&self) -> &str {
        self.base_url.as_str()
    }

    /// Absolute URL of a page relative to the base URL.
    #[must_use]
    pub fn page_url(&self, path: &str) -> String {
        self.base_url
            .join(path)
            .map_or_else(|_| self.base_url.to_string(), |url| url.to_string())
    }

    #[must_use]
    pub fn name(&self) -> String {
        format!("{} @ {}", self.browser, self.base_url)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WaitConfig {
    /// Budget for clickability and visibility waits issued by page objects.
    pub interaction: Duration,
    /// Budget for the shared wait: typing, reading text, dropdowns, page load.
    pub shared: Duration,
    pub poll: Duration,
}

impl Default for WaitConfig {
    fn default() -> Self {
        Self {
            interaction: Duration::from_secs(10),
            shared: Duration::from_secs(30),
            poll: Duration::from_millis(250),
        }
    }
}
