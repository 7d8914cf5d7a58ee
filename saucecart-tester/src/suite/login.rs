use std::sync::Arc;

use anyhow::Result;
use async_trait::async_trait;

use super::{BrowserTest, SoftAssert, TestClass, TestCtx};
use crate::pages::LoginPage;
use crate::pages::inventory::INVENTORY_PATH;

pub const MISMATCH_ERROR: &str =
    "Epic sadface: Username and password do not match any user in this service";
pub const PASSWORD_REQUIRED_ERROR: &str = "Epic sadface: Password is required";
pub const USERNAME_REQUIRED_ERROR: &str = "Epic sadface: Username is required";

pub struct LoginTests;

#[async_trait]
impl TestClass for LoginTests {
    fn name(&self) -> &'static str {
        "login"
    }

    fn description(&self) -> &'static str {
        "Login form validation and successful sign-in"
    }

    fn tests(&self) -> Vec<Arc<dyn BrowserTest>> {
        LoginCase::ALL
            .into_iter()
            .map(|case| Arc::new(case) as Arc<dyn BrowserTest>)
            .collect()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoginCase {
    InvalidUsername,
    IncorrectPassword,
    EmptyPassword,
    EmptyUsername,
    ValidUser,
}

impl LoginCase {
    pub const ALL: [Self; 5] = [
        Self::InvalidUsername,
        Self::IncorrectPassword,
        Self::EmptyPassword,
        Self::EmptyUsername,
        Self::ValidUser,
    ];

    const fn credentials(self) -> (&'static str, &'static str) {
        match self {
            Self::InvalidUsername => ("invalid_user", "secret_sauce"),
            Self::IncorrectPassword => ("standard_user", "incorrect_password"),
            Self::EmptyPassword => ("standard_user", ""),
            Self::EmptyUsername => ("", "secret_sauce"),
            Self::ValidUser => ("standard_user", "secret_sauce"),
        }
    }
}

#[async_trait]
impl BrowserTest for LoginCase {
    fn name(&self) -> &'static str {
        match self {
            Self::InvalidUsername => "login_with_invalid_username",
            Self::IncorrectPassword => "login_with_incorrect_password",
            Self::EmptyPassword => "login_with_empty_password",
            Self::EmptyUsername => "login_with_empty_username",
            Self::ValidUser => "valid_user_login",
        }
    }

    async fn run(&self, ctx: &TestCtx<'_>) -> Result<()> {
        let page = LoginPage::new(ctx.ui);
        let (username, password) = self.credentials();
        log::info!("Starting {}", self.name());
        page.enter_username(username).await?;
        page.enter_password(password).await?;
        page.submit().await?;

        let mut soft = SoftAssert::new();
        match self {
            Self::InvalidUsername | Self::IncorrectPassword => {
                let actual = page.credentials_mismatch_error().await?;
                log::info!("Actual error message: {actual}");
                soft.assert_eq(actual.as_str(), MISMATCH_ERROR, "Error message mismatch");
            }
            Self::EmptyPassword => {
                let actual = page.empty_password_error().await?;
                log::info!("Actual error message: {actual}");
                soft.assert_eq(
                    actual.as_str(),
                    PASSWORD_REQUIRED_ERROR,
                    "Error message mismatch for empty password.",
                );
            }
            Self::EmptyUsername => {
                let actual = page.empty_username_error().await?;
                log::info!("Actual error message: {actual}");
                soft.assert_eq(
                    actual.as_str(),
                    USERNAME_REQUIRED_ERROR,
                    "Error message mismatch for empty username.",
                );
            }
            Self::ValidUser => {
                let url = ctx.ui.current_url().await?;
                log::info!("Current URL after login: {url}");
                soft.assert_true(
                    url.ends_with(INVENTORY_PATH),
                    "User was not redirected to the inventory page after valid login.",
                );
            }
        }
        soft.assert_all()?;
        Ok(())
    }
}
