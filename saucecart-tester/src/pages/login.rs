use crate::browser::Locator;
use crate::error::TestResult;
use crate::fixture::Interactor;

pub const USERNAME_FIELD: Locator = Locator::id("user-name");
pub const PASSWORD_FIELD: Locator = Locator::id("password");
pub const LOGIN_BUTTON: Locator = Locator::id("login-button");
pub const EMPTY_USERNAME_ERROR: Locator =
    Locator::xpath("//*[contains(text(), 'Epic sadface: Username is required')]");
pub const EMPTY_PASSWORD_ERROR: Locator =
    Locator::xpath("//*[contains(text(), 'Epic sadface: Password is required')]");
pub const CREDENTIALS_MISMATCH_ERROR: Locator = Locator::xpath(
    "//*[contains(text(),'Epic sadface: Username and password do not match any user in this service')]",
);

pub struct LoginPage<'a> {
    ui: &'a Interactor,
}

impl<'a> LoginPage<'a> {
    #[must_use]
    pub const fn new(ui: &'a Interactor) -> Self {
        Self { ui }
    }

    pub async fn enter_username(&self, username: &str) -> TestResult<()> {
        self.ui.type_text(&USERNAME_FIELD, username).await
    }

    pub async fn enter_password(&self, password: &str) -> TestResult<()> {
        self.ui.type_text(&PASSWORD_FIELD, password).await
    }

    pub async fn submit(&self) -> TestResult<()> {
        self.ui.click(&LOGIN_BUTTON).await
    }

    pub async fn login(&self, username: &str, password: &str) -> TestResult<()> {
        self.enter_username(username).await?;
        self.enter_password(password).await?;
        self.submit().await?;
        log::info!("Logged in with username: {username}");
        Ok(())
    }

    pub async fn empty_username_error(&self) -> TestResult<String> {
        self.ui.read_text(&EMPTY_USERNAME_ERROR).await
    }

    pub async fn empty_password_error(&self) -> TestResult<String> {
        self.ui.read_text(&EMPTY_PASSWORD_ERROR).await
    }

    pub async fn credentials_mismatch_error(&self) -> TestResult<String> {
        self.ui.read_text(&CREDENTIALS_MISMATCH_ERROR).await
    }
}
