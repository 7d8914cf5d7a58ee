//! Base test fixture: owns one session per test class and resets it between tests.

mod interact;

pub use interact::Interactor;

use std::sync::Arc;

use crate::browser::{Driver, SessionFactory};
use crate::config::{SuiteConfig, WaitConfig};
use crate::error::{TestError, TestResult};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FixtureState {
    Uninitialized,
    Ready,
    Navigated,
    Closed,
}

pub struct Fixture {
    factory: Arc<dyn SessionFactory>,
    suite: SuiteConfig,
    waits: WaitConfig,
    session: Option<Interactor>,
    state: FixtureState,
}

impl Fixture {
    pub fn new(factory: Arc<dyn SessionFactory>, suite: SuiteConfig, waits: WaitConfig) -> Self {
        Self {
            factory,
            suite,
            waits,
            session: None,
            state: FixtureState::Uninitialized,
        }
    }

    #[must_use]
    pub const fn state(&self) -> FixtureState {
        self.state
    }

    #[must_use]
    pub const fn suite(&self) -> &SuiteConfig {
        &self.suite
    }

    pub fn ui(&self) -> TestResult<&Interactor> {
        self.session.as_ref().ok_or(TestError::NoSession)
    }

    #[must_use]
    pub fn driver(&self) -> Option<Arc<dyn Driver>> {
        self.session.as_ref().map(|ui| Arc::clone(ui.driver()))
    }

    async fn provision(&mut self) -> TestResult<()> {
        let driver = self.factory.acquire(self.suite.browser()).await?;
        let options = driver.options();
        if !(options.headless && options.private) {
            if let Err(err) = driver.quit().await {
                log::error!("Error occurred while closing the browser: {err}");
            }
            return Err(TestError::Setup(format!(
                "{} session is not headless and private ({options:?})",
                driver.browser()
            )));
        }
        let ui = Interactor::new(driver, self.waits);
        // Keep the session even if the first load fails so teardown can quit it.
        self.session = Some(ui.clone());
        ui.open(self.suite.base_url()).await?;
        ui.wait_for_page_load().await?;
        Ok(())
    }

    /// Suite setup: acquire a session and load the base URL.
    pub async fn set_up(&mut self) -> TestResult<()> {
        if self.state != FixtureState::Uninitialized {
            return Err(TestError::Setup(format!(
                "fixture already set up (state {:?})",
                self.state
            )));
        }
        self.provision().await?;
        self.state = FixtureState::Ready;
        Ok(())
    }

    /// Per-test reset: every test starts from the base URL.
    pub async fn before_method(&mut self) -> TestResult<()> {
        let ui = self.ui()?;
        ui.open(self.suite.base_url()).await?;
        self.state = FixtureState::Navigated;
        Ok(())
    }

    pub fn after_method(&mut self) {
        if self.state == FixtureState::Navigated {
            self.state = FixtureState::Ready;
        }
    }

    /// Replace the current session with a fresh one ahead of a retried attempt.
    pub async fn reprovision(&mut self) -> TestResult<()> {
        self.quit_session().await;
        self.provision().await?;
        self.state = FixtureState::Ready;
        Ok(())
    }

    async fn quit_session(&mut self) {
        if let Some(ui) = self.session.take()
            && let Err(err) = ui.driver().quit().await
        {
            log::error!("Error occurred while closing the browser: {err}");
        }
    }

    /// Suite teardown. Quit failures are logged, never raised.
    pub async fn tear_down(&mut self) {
        self.quit_session().await;
        self.state = FixtureState::Closed;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::browser::SessionOptions;
    use crate::testing::{FakeFactory, fast_waits};

    fn fixture(factory: &Arc<FakeFactory>, browser: &str) -> Fixture {
        let suite = SuiteConfig::new(browser, "https://www.saucedemo.com/").unwrap();
        Fixture::new(factory.clone(), suite, fast_waits())
    }

    #[tokio::test]
    async fn walks_the_session_lifecycle() {
        let factory = Arc::new(FakeFactory::default());
        let mut fixture = fixture(&factory, "chrome");
        assert_eq!(fixture.state(), FixtureState::Uninitialized);
        assert!(matches!(fixture.ui(), Err(TestError::NoSession)));

        fixture.set_up().await.unwrap();
        assert_eq!(fixture.state(), FixtureState::Ready);

        fixture.before_method().await.unwrap();
        assert_eq!(fixture.state(), FixtureState::Navigated);
        fixture.after_method();
        assert_eq!(fixture.state(), FixtureState::Ready);

        fixture.tear_down().await;
        assert_eq!(fixture.state(), FixtureState::Closed);
        assert!(fixture.driver().is_none());
        assert!(factory.sessions()[0].has_quit());
    }

    #[tokio::test]
    async fn before_method_returns_to_base_url() {
        let factory = Arc::new(FakeFactory::default());
        let mut fixture = fixture(&factory, "firefox");
        fixture.set_up().await.unwrap();
        let ui = fixture.ui().unwrap().clone();
        ui.open("https://www.saucedemo.com/cart.html").await.unwrap();
        fixture.before_method().await.unwrap();
        assert_eq!(
            ui.current_url().await.unwrap(),
            "https://www.saucedemo.com/"
        );
    }

    #[tokio::test]
    async fn unsupported_browser_fails_setup_without_a_session() {
        let factory = Arc::new(FakeFactory::default());
        let mut fixture = fixture(&factory, "opera");
        let err = fixture.set_up().await.unwrap_err();
        assert!(err.is_fatal());
        assert_eq!(factory.acquisitions(), 0);
        assert_eq!(fixture.state(), FixtureState::Uninitialized);
    }

    #[tokio::test]
    async fn reprovision_swaps_in_a_fresh_session() {
        let factory = Arc::new(FakeFactory::default());
        let mut fixture = fixture(&factory, "edge");
        fixture.set_up().await.unwrap();
        fixture.reprovision().await.unwrap();
        let sessions = factory.sessions();
        assert_eq!(sessions.len(), 2);
        assert!(sessions[0].has_quit());
        assert!(!sessions[1].has_quit());
        assert_eq!(fixture.state(), FixtureState::Ready);
    }

    #[tokio::test]
    async fn every_browser_session_is_headless_and_private() {
        let factory = Arc::new(FakeFactory::default());
        for browser in ["chrome", "firefox", "edge"] {
            let driver = factory.acquire(browser).await.unwrap();
            assert_eq!(driver.browser().label(), browser);
            let options = driver.options();
            assert!(options.headless && options.private, "{browser}: {options:?}");
        }
    }

    #[tokio::test]
    async fn windowed_session_is_refused_and_closed() {
        let factory = Arc::new(FakeFactory::launching(SessionOptions {
            headless: false,
            private: true,
        }));
        let mut fixture = fixture(&factory, "chrome");
        assert!(matches!(
            fixture.set_up().await,
            Err(TestError::Setup(_))
        ));
        assert!(fixture.driver().is_none());
        assert!(factory.sessions()[0].has_quit());
    }

    #[tokio::test]
    async fn set_up_twice_is_rejected() {
        let factory = Arc::new(FakeFactory::default());
        let mut fixture = fixture(&factory, "chrome");
        fixture.set_up().await.unwrap();
        assert!(matches!(
            fixture.set_up().await,
            Err(TestError::Setup(_))
        ));
    }
}
