use async_trait::async_trait;

use super::{BrowserKind, Locator};
use crate::error::{TestError, TestResult};

/// Launch flags every session is created with. Both are fixed policy.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SessionOptions {
    pub headless: bool,
    pub private: bool,
}

impl SessionOptions {
    #[must_use]
    pub const fn policy() -> Self {
        Self {
            headless: true,
            private: true,
        }
    }
}

impl Default for SessionOptions {
    fn default() -> Self {
        Self::policy()
    }
}

/// An element that satisfied a lookup or wait condition.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ElementHandle {
    locator: Locator,
}

impl ElementHandle {
    #[must_use]
    pub const fn new(locator: Locator) -> Self {
        Self { locator }
    }

    #[must_use]
    pub const fn locator(&self) -> &Locator {
        &self.locator
    }
}

/// Capability set of one live browser session.
#[async_trait]
pub trait Driver: Send + Sync {
    fn browser(&self) -> BrowserKind;

    fn options(&self) -> SessionOptions;

    async fn open(&self, url: &str) -> TestResult<()>;

    async fn current_url(&self) -> TestResult<String>;

    /// `document.readyState` of the current page.
    async fn ready_state(&self) -> TestResult<String>;

    /// Non-waiting lookup; `Ok(None)` when nothing matches.
    async fn find_element(&self, locator: &Locator) -> TestResult<Option<ElementHandle>>;

    async fn element_visible(&self, locator: &Locator) -> TestResult<bool>;

    async fn element_clickable(&self, locator: &Locator) -> TestResult<bool>;

    async fn click(&self, element: &ElementHandle) -> TestResult<()>;

    async fn clear(&self, element: &ElementHandle) -> TestResult<()>;

    async fn send_keys(&self, element: &ElementHandle, text: &str) -> TestResult<()>;

    async fn text(&self, element: &ElementHandle) -> TestResult<String>;

    /// Visible texts of the options of a dropdown element, in document order.
    async fn option_texts(&self, element: &ElementHandle) -> TestResult<Vec<String>>;

    async fn select_option(&self, element: &ElementHandle, index: usize) -> TestResult<()>;

    async fn screenshot(&self) -> TestResult<Vec<u8>> {
        Err(TestError::Screenshot(format!(
            "{} session does not support image capture",
            self.browser()
        )))
    }

    async fn quit(&self) -> TestResult<()>;
}
