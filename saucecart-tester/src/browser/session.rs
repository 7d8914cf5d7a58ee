use std::fmt;
use std::str::FromStr;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use thirtyfour::prelude::*;

use super::{Driver, ElementHandle, Locator, SessionOptions};
use crate::error::{TestError, TestResult};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BrowserKind {
    Chrome,
    Firefox,
    Edge,
}

impl BrowserKind {
    pub const ALL: [Self; 3] = [Self::Chrome, Self::Firefox, Self::Edge];

    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Chrome => "chrome",
            Self::Firefox => "firefox",
            Self::Edge => "edge",
        }
    }

    /// Log target every interaction of a session of this browser is recorded under.
    #[must_use]
    pub const fn log_target(self) -> &'static str {
        match self {
            Self::Chrome => "saucecart::chrome",
            Self::Firefox => "saucecart::firefox",
            Self::Edge => "saucecart::edge",
        }
    }

    #[must_use]
    pub const fn default_endpoint(self) -> &'static str {
        match self {
            Self::Chrome => "http://localhost:9515",
            Self::Firefox => "http://localhost:4444",
            Self::Edge => "http://localhost:17556",
        }
    }

    /// Browser-specific command line flags for the given launch options.
    #[must_use]
    pub fn launch_args(self, options: SessionOptions) -> Vec<&'static str> {
        let mut args = Vec::new();
        match self {
            Self::Chrome => {
                if options.headless {
                    args.push("--headless");
                }
                if options.private {
                    args.push("--incognito");
                }
            }
            Self::Firefox => {
                if options.private {
                    args.push("-private");
                }
                if options.headless {
                    args.push("--headless");
                }
            }
            Self::Edge => {
                if options.private {
                    args.push("--inprivate");
                }
                if options.headless {
                    args.push("--headless");
                }
            }
        }
        args
    }
}

impl fmt::Display for BrowserKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for BrowserKind {
    type Err = TestError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "chrome" => Ok(Self::Chrome),
            "firefox" => Ok(Self::Firefox),
            "edge" => Ok(Self::Edge),
            _ => Err(TestError::UnsupportedBrowser(s.to_string())),
        }
    }
}

#[derive(Debug, Clone)]
pub struct BrowserConfig {
    pub implicit_wait_secs: u64,
    pub remote_hub: Option<String>,
}

impl Default for BrowserConfig {
    fn default() -> Self {
        Self {
            implicit_wait_secs: 0,
            remote_hub: None,
        }
    }
}

/// Produces live sessions for a browser identifier.
#[async_trait]
pub trait SessionFactory: Send + Sync {
    /// Fails with [`TestError::UnsupportedBrowser`] before contacting any
    /// driver process when `browser` is not a known identifier.
    async fn acquire(&self, browser: &str) -> TestResult<Arc<dyn Driver>>;
}

#[derive(Debug, Clone, Default)]
pub struct WebDriverFactory {
    config: BrowserConfig,
}

impl WebDriverFactory {
    #[must_use]
    pub const fn new(config: BrowserConfig) -> Self {
        Self { config }
    }
}

#[async_trait]
impl SessionFactory for WebDriverFactory {
    async fn acquire(&self, browser: &str) -> TestResult<Arc<dyn Driver>> {
        let kind: BrowserKind = browser.parse()?;
        let session = new_session(kind, &self.config).await?;
        Ok(Arc::new(session))
    }
}

pub async fn new_session(kind: BrowserKind, cfg: &BrowserConfig) -> TestResult<WebDriverSession> {
    let options = SessionOptions::policy();
    let url = cfg
        .remote_hub
        .as_deref()
        .unwrap_or_else(|| kind.default_endpoint());
    log::info!(target: kind.log_target(), "Setting up WebDriver for browser: {kind} at {url}");

    let driver = match kind {
        BrowserKind::Chrome => {
            let mut caps = DesiredCapabilities::chrome();
            for arg in kind.launch_args(options) {
                caps.add_arg(arg)?;
            }
            WebDriver::new(url, caps).await?
        }
        BrowserKind::Firefox => {
            let mut caps = DesiredCapabilities::firefox();
            for arg in kind.launch_args(options) {
                caps.add_arg(arg)?;
            }
            WebDriver::new(url, caps).await?
        }
        BrowserKind::Edge => {
            let mut caps = DesiredCapabilities::edge();
            for arg in kind.launch_args(options) {
                caps.add_arg(arg)?;
            }
            WebDriver::new(url, caps).await?
        }
    };

    driver
        .set_implicit_wait_timeout(Duration::from_secs(cfg.implicit_wait_secs))
        .await?;
    driver.maximize_window().await?;

    Ok(WebDriverSession {
        driver,
        kind,
        options,
    })
}

/// A live WebDriver-backed session.
pub struct WebDriverSession {
    driver: WebDriver,
    kind: BrowserKind,
    options: SessionOptions,
}

impl WebDriverSession {
    async fn first(&self, locator: &Locator) -> TestResult<Option<WebElement>> {
        let found = self.driver.find_all(locator.to_by()).await?;
        Ok(found.into_iter().next())
    }

    async fn resolve(&self, element: &ElementHandle) -> TestResult<WebElement> {
        Ok(self.driver.find(element.locator().to_by()).await?)
    }

    async fn options_of(&self, element: &ElementHandle) -> TestResult<Vec<WebElement>> {
        let select = self.resolve(element).await?;
        Ok(select.find_all(By::Tag("option")).await?)
    }
}

#[async_trait]
impl Driver for WebDriverSession {
    fn browser(&self) -> BrowserKind {
        self.kind
    }

    fn options(&self) -> SessionOptions {
        self.options
    }

    async fn open(&self, url: &str) -> TestResult<()> {
        self.driver.goto(url).await?;
        Ok(())
    }

    async fn current_url(&self) -> TestResult<String> {
        Ok(self.driver.current_url().await?.to_string())
    }

    async fn ready_state(&self) -> TestResult<String> {
        let ret = self
            .driver
            .execute("return document.readyState", vec![])
            .await?;
        Ok(ret.json().as_str().unwrap_or_default().to_string())
    }

    async fn find_element(&self, locator: &Locator) -> TestResult<Option<ElementHandle>> {
        Ok(self
            .first(locator)
            .await?
            .map(|_| ElementHandle::new(*locator)))
    }

    async fn element_visible(&self, locator: &Locator) -> TestResult<bool> {
        match self.first(locator).await? {
            Some(element) => Ok(element.is_displayed().await?),
            None => Ok(false),
        }
    }

    async fn element_clickable(&self, locator: &Locator) -> TestResult<bool> {
        match self.first(locator).await? {
            Some(element) => Ok(element.is_displayed().await? && element.is_enabled().await?),
            None => Ok(false),
        }
    }

    async fn click(&self, element: &ElementHandle) -> TestResult<()> {
        self.resolve(element).await?.click().await?;
        Ok(())
    }

    async fn clear(&self, element: &ElementHandle) -> TestResult<()> {
        self.resolve(element).await?.clear().await?;
        Ok(())
    }

    async fn send_keys(&self, element: &ElementHandle, text: &str) -> TestResult<()> {
        self.resolve(element).await?.send_keys(text).await?;
        Ok(())
    }

    async fn text(&self, element: &ElementHandle) -> TestResult<String> {
        Ok(self.resolve(element).await?.text().await?)
    }

    async fn option_texts(&self, element: &ElementHandle) -> TestResult<Vec<String>> {
        let mut texts = Vec::new();
        for option in self.options_of(element).await? {
            texts.push(option.text().await?);
        }
        Ok(texts)
    }

    async fn select_option(&self, element: &ElementHandle, index: usize) -> TestResult<()> {
        let options = self.options_of(element).await?;
        let option = options.get(index).ok_or_else(|| {
            TestError::Driver(format!("option {index} vanished from {}", element.locator()))
        })?;
        option.click().await?;
        Ok(())
    }

    async fn screenshot(&self) -> TestResult<Vec<u8>> {
        Ok(self.driver.screenshot_as_png().await?)
    }

    async fn quit(&self) -> TestResult<()> {
        self.driver.clone().quit().await?;
        log::info!(target: self.kind.log_target(), "WebDriver quit successfully");
        Ok(())
    }
}
