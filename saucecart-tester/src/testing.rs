//! In-memory storefront standing in for a browser session in unit tests.

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use parking_lot::Mutex;
use url::Url;

use crate::browser::{BrowserKind, Driver, ElementHandle, Locator, SessionFactory, SessionOptions};
use crate::config::WaitConfig;
use crate::error::{TestError, TestResult};
use crate::pages::{inventory, login};

pub const FAKE_PNG: &[u8] = b"\x89PNG\r\n\x1a\nfake";

const SORT_OPTIONS: [&str; 4] = [
    "Name (A to Z)",
    "Name (Z to A)",
    "Price (low to high)",
    "Price (high to low)",
];

const LOGIN_GUARD_ERROR: &str =
    "Epic sadface: You can only access '/inventory.html' when you are logged in.";

pub fn fast_waits() -> WaitConfig {
    WaitConfig {
        interaction: Duration::from_millis(60),
        shared: Duration::from_millis(90),
        poll: Duration::from_millis(5),
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Page {
    Blank,
    Login,
    Inventory,
    Cart,
    CheckoutStepOne,
    Details,
}

impl Page {
    const fn path(self) -> &'static str {
        match self {
            Self::Blank | Self::Login => "/",
            Self::Inventory => "/inventory.html",
            Self::Cart => "/cart.html",
            Self::CheckoutStepOne => "/checkout-step-one.html",
            Self::Details => "/inventory-item.html",
        }
    }

    fn from_path(path: &str) -> Self {
        match path {
            "/inventory.html" => Self::Inventory,
            "/cart.html" => Self::Cart,
            "/checkout-step-one.html" => Self::CheckoutStepOne,
            "/inventory-item.html" => Self::Details,
            _ => Self::Login,
        }
    }
}

struct FakeElement {
    visible: bool,
    text: String,
}

impl FakeElement {
    fn shown(text: impl Into<String>) -> Self {
        Self {
            visible: true,
            text: text.into(),
        }
    }
}

struct StoreState {
    origin: String,
    page: Page,
    username: String,
    password: String,
    error: Option<&'static str>,
    logged_in: bool,
    in_cart: bool,
    menu_open: bool,
    sort: Option<String>,
    ready_state: String,
    lookups_broken: bool,
    quit: bool,
}

impl StoreState {
    fn lowest_first(&self) -> bool {
        self.sort.as_deref() == Some(inventory::PRICE_LOW_TO_HIGH)
    }

    fn first_item(&self) -> &'static str {
        if self.lowest_first() {
            "Sauce Labs Onesie"
        } else {
            "Sauce Labs Backpack"
        }
    }

    fn navigate(&mut self, page: Page) {
        self.page = page;
        self.menu_open = false;
    }

    fn element(&self, locator: &Locator) -> Option<FakeElement> {
        let chrome = matches!(
            self.page,
            Page::Inventory | Page::Cart | Page::CheckoutStepOne | Page::Details
        );
        if chrome {
            if *locator == inventory::CART_LINK || *locator == inventory::MENU_BUTTON {
                return Some(FakeElement::shown(""));
            }
            if *locator == inventory::LOGOUT_LINK {
                return Some(FakeElement {
                    visible: self.menu_open,
                    text: "Logout".to_string(),
                });
            }
        }

        match self.page {
            Page::Blank | Page::CheckoutStepOne => None,
            Page::Login => {
                if *locator == login::USERNAME_FIELD
                    || *locator == login::PASSWORD_FIELD
                    || *locator == login::LOGIN_BUTTON
                {
                    return Some(FakeElement::shown(""));
                }
                let error = self.error?;
                let matches = (*locator == login::EMPTY_USERNAME_ERROR
                    && error == "Epic sadface: Username is required")
                    || (*locator == login::EMPTY_PASSWORD_ERROR
                        && error == "Epic sadface: Password is required")
                    || (*locator == login::CREDENTIALS_MISMATCH_ERROR
                        && error.contains("do not match"));
                matches.then(|| FakeElement::shown(error))
            }
            Page::Inventory => {
                if *locator == inventory::ADD_TO_CART_BUTTON && !self.in_cart {
                    Some(FakeElement::shown("Add to cart"))
                } else if *locator == inventory::REMOVE_FROM_CART_BUTTON && self.in_cart {
                    Some(FakeElement::shown("Remove"))
                } else if *locator == inventory::SORT_DROPDOWN {
                    Some(FakeElement::shown(SORT_OPTIONS.join("\n")))
                } else if *locator == inventory::FIRST_ITEM_NAME {
                    Some(FakeElement::shown(self.first_item()))
                } else {
                    None
                }
            }
            Page::Cart => (*locator == inventory::CHECKOUT_BUTTON)
                .then(|| FakeElement::shown("Checkout")),
            Page::Details => (*locator == inventory::PRODUCT_DETAILS).then(|| {
                let item = self.first_item();
                FakeElement::shown(format!("{item}\nA fine product.\n$7.99"))
            }),
        }
    }

    fn submit_login(&mut self) {
        self.error = if self.username.is_empty() {
            Some("Epic sadface: Username is required")
        } else if self.password.is_empty() {
            Some("Epic sadface: Password is required")
        } else if self.username == "standard_user" && self.password == "secret_sauce" {
            None
        } else {
            Some("Epic sadface: Username and password do not match any user in this service")
        };
        if self.error.is_none() {
            self.logged_in = true;
            self.navigate(Page::Inventory);
        }
    }

    fn click(&mut self, locator: &Locator) {
        if *locator == login::LOGIN_BUTTON {
            self.submit_login();
        } else if *locator == inventory::ADD_TO_CART_BUTTON {
            self.in_cart = true;
        } else if *locator == inventory::REMOVE_FROM_CART_BUTTON {
            self.in_cart = false;
        } else if *locator == inventory::CART_LINK {
            self.navigate(Page::Cart);
        } else if *locator == inventory::CHECKOUT_BUTTON {
            self.navigate(Page::CheckoutStepOne);
        } else if *locator == inventory::MENU_BUTTON {
            self.menu_open = true;
        } else if *locator == inventory::LOGOUT_LINK {
            self.logged_in = false;
            self.in_cart = false;
            self.navigate(Page::Login);
        } else if *locator == inventory::FIRST_ITEM_NAME {
            self.navigate(Page::Details);
        }
    }
}

/// Simulates the login, inventory, cart, checkout and details screens.
pub struct FakeStorefront {
    kind: BrowserKind,
    screenshots: bool,
    options: SessionOptions,
    state: Mutex<StoreState>,
    captures: AtomicUsize,
}

impl FakeStorefront {
    pub fn new(kind: BrowserKind) -> Self {
        Self::with_screenshots(kind, true)
    }

    pub fn with_screenshots(kind: BrowserKind, screenshots: bool) -> Self {
        Self {
            kind,
            screenshots,
            options: SessionOptions::policy(),
            state: Mutex::new(StoreState {
                origin: "about:".to_string(),
                page: Page::Blank,
                username: String::new(),
                password: String::new(),
                error: None,
                logged_in: false,
                in_cart: false,
                menu_open: false,
                sort: None,
                ready_state: "complete".to_string(),
                lookups_broken: false,
                quit: false,
            }),
            captures: AtomicUsize::new(0),
        }
    }

    pub fn log_in(&self) {
        self.state.lock().logged_in = true;
    }

    pub fn field_value(&self, locator: &Locator) -> String {
        let state = self.state.lock();
        if *locator == login::USERNAME_FIELD {
            state.username.clone()
        } else if *locator == login::PASSWORD_FIELD {
            state.password.clone()
        } else {
            String::new()
        }
    }

    pub fn break_lookups(&self) {
        self.state.lock().lookups_broken = true;
    }

    pub fn set_ready_state(&self, ready: &str) {
        self.state.lock().ready_state = ready.to_string();
    }

    pub fn sort_order(&self) -> Option<String> {
        self.state.lock().sort.clone()
    }

    pub fn in_cart(&self) -> bool {
        self.state.lock().in_cart
    }

    pub fn has_quit(&self) -> bool {
        self.state.lock().quit
    }

    pub fn captures(&self) -> usize {
        self.captures.load(Ordering::SeqCst)
    }

    fn live(&self) -> TestResult<parking_lot::MutexGuard<'_, StoreState>> {
        let state = self.state.lock();
        if state.quit {
            return Err(TestError::Driver("session already quit".to_string()));
        }
        Ok(state)
    }

    fn interactable(state: &StoreState, element: &ElementHandle) -> TestResult<FakeElement> {
        let found = state.element(element.locator()).ok_or_else(|| {
            TestError::Driver(format!("no such element: {}", element.locator()))
        })?;
        if !found.visible {
            return Err(TestError::Driver(format!(
                "element not interactable: {}",
                element.locator()
            )));
        }
        Ok(found)
    }
}

#[async_trait]
impl Driver for FakeStorefront {
    fn browser(&self) -> BrowserKind {
        self.kind
    }

    fn options(&self) -> SessionOptions {
        self.options
    }

    async fn open(&self, url: &str) -> TestResult<()> {
        let parsed = Url::parse(url).map_err(|err| TestError::Driver(err.to_string()))?;
        let mut state = self.live()?;
        state.origin = parsed.origin().ascii_serialization();
        let page = Page::from_path(parsed.path());
        if page == Page::Login {
            state.error = None;
            state.username.clear();
            state.password.clear();
            state.navigate(Page::Login);
        } else if state.logged_in {
            state.navigate(page);
        } else {
            state.error = Some(LOGIN_GUARD_ERROR);
            state.navigate(Page::Login);
        }
        Ok(())
    }

    async fn current_url(&self) -> TestResult<String> {
        let state = self.live()?;
        if state.page == Page::Blank {
            return Ok("about:blank".to_string());
        }
        Ok(format!("{}{}", state.origin, state.page.path()))
    }

    async fn ready_state(&self) -> TestResult<String> {
        Ok(self.live()?.ready_state.clone())
    }

    async fn find_element(&self, locator: &Locator) -> TestResult<Option<ElementHandle>> {
        let state = self.live()?;
        if state.lookups_broken {
            return Err(TestError::Driver("lookup failed".to_string()));
        }
        Ok(state.element(locator).map(|_| ElementHandle::new(*locator)))
    }

    async fn element_visible(&self, locator: &Locator) -> TestResult<bool> {
        Ok(self.live()?.element(locator).is_some_and(|e| e.visible))
    }

    async fn element_clickable(&self, locator: &Locator) -> TestResult<bool> {
        self.element_visible(locator).await
    }

    async fn click(&self, element: &ElementHandle) -> TestResult<()> {
        let mut state = self.live()?;
        Self::interactable(&state, element)?;
        state.click(element.locator());
        Ok(())
    }

    async fn clear(&self, element: &ElementHandle) -> TestResult<()> {
        let mut state = self.live()?;
        Self::interactable(&state, element)?;
        if *element.locator() == login::USERNAME_FIELD {
            state.username.clear();
        } else if *element.locator() == login::PASSWORD_FIELD {
            state.password.clear();
        }
        Ok(())
    }

    async fn send_keys(&self, element: &ElementHandle, text: &str) -> TestResult<()> {
        let mut state = self.live()?;
        Self::interactable(&state, element)?;
        if *element.locator() == login::USERNAME_FIELD {
            state.username.push_str(text);
        } else if *element.locator() == login::PASSWORD_FIELD {
            state.password.push_str(text);
        }
        Ok(())
    }

    async fn text(&self, element: &ElementHandle) -> TestResult<String> {
        let state = self.live()?;
        Ok(Self::interactable(&state, element)?.text)
    }

    async fn option_texts(&self, element: &ElementHandle) -> TestResult<Vec<String>> {
        let state = self.live()?;
        Self::interactable(&state, element)?;
        if *element.locator() == inventory::SORT_DROPDOWN {
            Ok(SORT_OPTIONS.iter().map(ToString::to_string).collect())
        } else {
            Ok(Vec::new())
        }
    }

    async fn select_option(&self, element: &ElementHandle, index: usize) -> TestResult<()> {
        let mut state = self.live()?;
        Self::interactable(&state, element)?;
        let option = SORT_OPTIONS
            .get(index)
            .ok_or_else(|| TestError::Driver(format!("no option at {index}")))?;
        state.sort = Some((*option).to_string());
        Ok(())
    }

    async fn screenshot(&self) -> TestResult<Vec<u8>> {
        drop(self.live()?);
        if !self.screenshots {
            return Err(TestError::Screenshot(
                "session does not support image capture".to_string(),
            ));
        }
        self.captures.fetch_add(1, Ordering::SeqCst);
        Ok(FAKE_PNG.to_vec())
    }

    async fn quit(&self) -> TestResult<()> {
        self.state.lock().quit = true;
        Ok(())
    }
}

/// Hands out a fresh [`FakeStorefront`] per acquisition and remembers them.
pub struct FakeFactory {
    /// Acquisitions that succeed before the driver stops answering.
    session_limit: Option<usize>,
    options: SessionOptions,
    acquisitions: AtomicUsize,
    sessions: Mutex<Vec<Arc<FakeStorefront>>>,
}

impl Default for FakeFactory {
    fn default() -> Self {
        Self {
            session_limit: None,
            options: SessionOptions::policy(),
            acquisitions: AtomicUsize::new(0),
            sessions: Mutex::new(Vec::new()),
        }
    }
}

impl FakeFactory {
    pub fn unreachable() -> Self {
        Self::with_session_limit(0)
    }

    pub fn with_session_limit(limit: usize) -> Self {
        Self {
            session_limit: Some(limit),
            ..Self::default()
        }
    }

    /// Sessions launched with flags other than the fixed policy.
    pub fn launching(options: SessionOptions) -> Self {
        Self {
            options,
            ..Self::default()
        }
    }

    pub fn acquisitions(&self) -> usize {
        self.acquisitions.load(Ordering::SeqCst)
    }

    pub fn sessions(&self) -> Vec<Arc<FakeStorefront>> {
        self.sessions.lock().clone()
    }
}

#[async_trait]
impl SessionFactory for FakeFactory {
    async fn acquire(&self, browser: &str) -> TestResult<Arc<dyn Driver>> {
        let kind: BrowserKind = browser.parse()?;
        if self
            .session_limit
            .is_some_and(|limit| self.acquisitions() >= limit)
        {
            return Err(TestError::Setup(format!("no {kind} driver listening")));
        }
        self.acquisitions.fetch_add(1, Ordering::SeqCst);
        let mut store = FakeStorefront::new(kind);
        store.options = self.options;
        let store = Arc::new(store);
        self.sessions.lock().push(Arc::clone(&store));
        Ok(store)
    }
}
