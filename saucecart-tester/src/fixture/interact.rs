use std::sync::Arc;
use std::time::Duration;

use tokio::time::Instant;

use crate::browser::{Driver, ElementHandle, Locator};
use crate::config::WaitConfig;
use crate::error::{TestError, TestResult, WaitCondition};

/// Element-interaction primitives over one session.
///
/// Page objects hold one of these instead of the session itself. Every
/// primitive waits for its element condition before acting and logs the
/// action under the session's per-browser target.
#[derive(Clone)]
pub struct Interactor {
    driver: Arc<dyn Driver>,
    waits: WaitConfig,
    target: &'static str,
}

impl Interactor {
    pub fn new(driver: Arc<dyn Driver>, waits: WaitConfig) -> Self {
        let target = driver.browser().log_target();
        Self {
            driver,
            waits,
            target,
        }
    }

    #[must_use]
    pub fn driver(&self) -> &Arc<dyn Driver> {
        &self.driver
    }

    async fn wait_for(
        &self,
        locator: &Locator,
        condition: WaitCondition,
        budget: Duration,
    ) -> TestResult<ElementHandle> {
        let started = Instant::now();
        loop {
            let ready = match condition {
                WaitCondition::Clickable => self.driver.element_clickable(locator).await?,
                WaitCondition::Visible | WaitCondition::PageLoaded => {
                    self.driver.element_visible(locator).await?
                }
            };
            if ready {
                return Ok(ElementHandle::new(*locator));
            }
            let waited = started.elapsed();
            if waited >= budget {
                return Err(TestError::Timeout {
                    target: locator.to_string(),
                    condition,
                    waited,
                });
            }
            tokio::time::sleep(self.waits.poll.min(budget - waited)).await;
        }
    }

    /// Visibility wait on the shared budget.
    pub async fn wait_visible(&self, locator: &Locator) -> TestResult<ElementHandle> {
        self.wait_for(locator, WaitCondition::Visible, self.waits.shared)
            .await
    }

    /// Visibility wait on the interaction budget.
    pub async fn wait_visibility(&self, locator: &Locator) -> TestResult<ElementHandle> {
        self.wait_for(locator, WaitCondition::Visible, self.waits.interaction)
            .await
    }

    pub async fn wait_clickable(&self, locator: &Locator) -> TestResult<ElementHandle> {
        self.wait_for(locator, WaitCondition::Clickable, self.waits.interaction)
            .await
    }

    pub async fn click(&self, locator: &Locator) -> TestResult<()> {
        let element = self.wait_clickable(locator).await?;
        self.driver.click(&element).await?;
        log::info!(target: self.target, "Clicked element: {locator}");
        Ok(())
    }

    pub async fn type_text(&self, locator: &Locator, text: &str) -> TestResult<()> {
        let element = self.wait_visible(locator).await?;
        self.driver.clear(&element).await?;
        self.driver.send_keys(&element, text).await?;
        log::info!(target: self.target, "Entered text '{text}' into element: {locator}");
        Ok(())
    }

    pub async fn read_text(&self, locator: &Locator) -> TestResult<String> {
        let element = self.wait_visible(locator).await?;
        let text = self.driver.text(&element).await?;
        log::info!(target: self.target, "Retrieved text '{text}' from element: {locator}");
        Ok(text)
    }

    /// Text of an element after a visibility wait on the interaction budget.
    pub async fn element_text(&self, locator: &Locator) -> TestResult<String> {
        let element = self.wait_visibility(locator).await?;
        self.driver.text(&element).await
    }

    /// Non-waiting presence check. Lookup errors count as absence.
    pub async fn is_present(&self, locator: &Locator) -> bool {
        let present = match self.driver.find_element(locator).await {
            Ok(found) => found.is_some(),
            Err(err) => {
                log::debug!(target: self.target, "Lookup of {locator} failed: {err}");
                false
            }
        };
        if present {
            log::info!(target: self.target, "Element is present: {locator}");
        } else {
            log::info!(target: self.target, "Element is not present: {locator}");
        }
        present
    }

    pub async fn select_by_visible_text(&self, locator: &Locator, text: &str) -> TestResult<()> {
        let element = self.wait_visible(locator).await?;
        let options = self.driver.option_texts(&element).await?;
        let index = options
            .iter()
            .position(|option| option.trim() == text.trim())
            .ok_or_else(|| TestError::NoSuchOption {
                locator: locator.to_string(),
                option: text.to_string(),
            })?;
        self.driver.select_option(&element, index).await?;
        log::info!(target: self.target, "Selected '{text}' from dropdown: {locator}");
        Ok(())
    }

    pub async fn current_url(&self) -> TestResult<String> {
        let url = self.driver.current_url().await?;
        log::info!(target: self.target, "Current URL: {url}");
        Ok(url)
    }

    pub async fn open(&self, url: &str) -> TestResult<()> {
        self.driver.open(url).await?;
        log::info!(target: self.target, "Navigated to: {url}");
        Ok(())
    }

    /// Waits on the shared budget for `document.readyState == "complete"`.
    pub async fn wait_for_page_load(&self) -> TestResult<()> {
        let started = Instant::now();
        loop {
            if self.driver.ready_state().await? == "complete" {
                log::info!(target: self.target, "Page fully loaded");
                return Ok(());
            }
            let waited = started.elapsed();
            if waited >= self.waits.shared {
                return Err(TestError::Timeout {
                    target: "document".to_string(),
                    condition: WaitCondition::PageLoaded,
                    waited,
                });
            }
            tokio::time::sleep(self.waits.poll.min(self.waits.shared - waited)).await;
        }
    }
}
