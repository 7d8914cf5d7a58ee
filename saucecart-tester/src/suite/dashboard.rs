use std::sync::Arc;

use anyhow::{Result, ensure};
use async_trait::async_trait;

use super::{BrowserTest, SoftAssert, TestClass, TestCtx};
use crate::pages::{InventoryPage, LoginPage};

pub const STANDARD_USER: &str = "standard_user";
pub const STANDARD_PASSWORD: &str = "secret_sauce";

/// Post-login cart, checkout, sorting and logout flows.
pub struct DashboardTests;

#[async_trait]
impl TestClass for DashboardTests {
    fn name(&self) -> &'static str {
        "dashboard"
    }

    fn description(&self) -> &'static str {
        "Inventory page flows after logging in as the standard user"
    }

    fn tests(&self) -> Vec<Arc<dyn BrowserTest>> {
        DashboardCase::ALL
            .into_iter()
            .map(|case| Arc::new(case) as Arc<dyn BrowserTest>)
            .collect()
    }

    async fn before_each(&self, ctx: &TestCtx<'_>) -> Result<()> {
        LoginPage::new(ctx.ui)
            .login(STANDARD_USER, STANDARD_PASSWORD)
            .await?;
        ensure!(
            InventoryPage::new(ctx.ui).is_on_dashboard().await?,
            "Failed to login to the dashboard"
        );
        log::info!("Logged into Dashboard");
        Ok(())
    }

    async fn after_each(&self, ctx: &TestCtx<'_>) -> Result<()> {
        if !InventoryPage::new(ctx.ui).is_on_dashboard().await? {
            ctx.ui.open(&ctx.suite.page_url("inventory.html")).await?;
            log::info!("Returned to Dashboard");
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DashboardCase {
    AddItemToCart,
    RemoveItemFromCart,
    GoToCheckoutPage,
    SortItemsLowToHigh,
    GetProductDetails,
    LogOut,
}

impl DashboardCase {
    pub const ALL: [Self; 6] = [
        Self::AddItemToCart,
        Self::RemoveItemFromCart,
        Self::GoToCheckoutPage,
        Self::SortItemsLowToHigh,
        Self::GetProductDetails,
        Self::LogOut,
    ];
}

#[async_trait]
impl BrowserTest for DashboardCase {
    fn name(&self) -> &'static str {
        match self {
            Self::AddItemToCart => "add_item_to_cart",
            Self::RemoveItemFromCart => "remove_item_from_cart",
            Self::GoToCheckoutPage => "go_to_checkout_page",
            Self::SortItemsLowToHigh => "sort_items_low_to_high",
            Self::GetProductDetails => "get_product_details",
            Self::LogOut => "log_out",
        }
    }

    fn priority(&self) -> i32 {
        i32::from(matches!(self, Self::RemoveItemFromCart))
    }

    async fn run(&self, ctx: &TestCtx<'_>) -> Result<()> {
        let inventory = InventoryPage::new(ctx.ui);
        let mut soft = SoftAssert::new();
        log::info!("Testing {}", self.name());

        match self {
            Self::AddItemToCart => {
                inventory.add_item_to_cart().await?;
                soft.assert_true(
                    inventory.is_remove_from_cart_shown().await,
                    "Item was not added to cart",
                );
            }
            Self::RemoveItemFromCart => {
                // The cart survives across tests in one session; only add when empty.
                if !inventory.is_remove_from_cart_shown().await {
                    inventory.add_item_to_cart().await?;
                }
                inventory.remove_item_from_cart().await?;
                soft.assert_true(
                    inventory.is_add_to_cart_shown().await,
                    "Add to cart control did not come back after removal",
                );
            }
            Self::GoToCheckoutPage => {
                inventory.go_to_checkout().await?;
                ensure!(
                    inventory.is_on_checkout().await?,
                    "Failed to navigate to the checkout page"
                );
            }
            Self::SortItemsLowToHigh => {
                inventory.sort_by_price_low_to_high().await?;
            }
            Self::GetProductDetails => {
                let details = inventory.view_lowest_priced_item_details().await?;
                soft.assert_false(details.trim().is_empty(), "Product details are empty");
                if ctx.verbose {
                    println!("     {details}");
                }
            }
            Self::LogOut => {
                inventory.log_out().await?;
                ensure!(!inventory.is_on_dashboard().await?, "Failed to logout");
            }
        }
        soft.assert_all()?;
        log::info!("{} completed", self.name());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::browser::{BrowserKind, Driver};
    use crate::config::SuiteConfig;
    use crate::fixture::Interactor;
    use crate::suite::ordered;
    use crate::testing::{FakeStorefront, fast_waits};

    fn suite() -> SuiteConfig {
        SuiteConfig::new("chrome", "https://www.saucedemo.com/").unwrap()
    }

    #[tokio::test]
    async fn whole_class_passes_in_execution_order() {
        let store = Arc::new(FakeStorefront::new(BrowserKind::Firefox));
        let suite = suite();
        let ui = Interactor::new(store.clone(), fast_waits());
        let ctx = TestCtx {
            ui: &ui,
            suite: &suite,
            verbose: false,
        };
        let class = DashboardTests;

        for test in ordered(&class) {
            store.open(suite.base_url()).await.unwrap();
            class.before_each(&ctx).await.unwrap();
            test.run(&ctx)
                .await
                .unwrap_or_else(|err| panic!("{} failed: {err:#}", test.name()));
            class.after_each(&ctx).await.unwrap();
        }
        assert!(!store.in_cart());
    }

    #[tokio::test]
    async fn add_then_remove_restores_add_control() {
        let store = Arc::new(FakeStorefront::new(BrowserKind::Chrome));
        let suite = suite();
        let ui = Interactor::new(store.clone(), fast_waits());
        let ctx = TestCtx {
            ui: &ui,
            suite: &suite,
            verbose: false,
        };
        store.open(suite.base_url()).await.unwrap();
        DashboardTests.before_each(&ctx).await.unwrap();

        DashboardCase::AddItemToCart.run(&ctx).await.unwrap();
        assert!(store.in_cart());
        DashboardCase::RemoveItemFromCart.run(&ctx).await.unwrap();
        assert!(!store.in_cart());
        assert!(InventoryPage::new(&ui).is_add_to_cart_shown().await);
    }

    #[tokio::test]
    async fn sort_selects_price_ascending() {
        let store = Arc::new(FakeStorefront::new(BrowserKind::Edge));
        let suite = suite();
        let ui = Interactor::new(store.clone(), fast_waits());
        let ctx = TestCtx {
            ui: &ui,
            suite: &suite,
            verbose: false,
        };
        store.open(suite.base_url()).await.unwrap();
        DashboardTests.before_each(&ctx).await.unwrap();
        DashboardCase::SortItemsLowToHigh.run(&ctx).await.unwrap();
        assert_eq!(store.sort_order().as_deref(), Some("Price (low to high)"));
    }

    #[tokio::test]
    async fn after_each_returns_to_inventory() {
        let store = Arc::new(FakeStorefront::new(BrowserKind::Chrome));
        let suite = suite();
        let ui = Interactor::new(store.clone(), fast_waits());
        let ctx = TestCtx {
            ui: &ui,
            suite: &suite,
            verbose: false,
        };
        store.open(suite.base_url()).await.unwrap();
        DashboardTests.before_each(&ctx).await.unwrap();
        DashboardCase::GoToCheckoutPage.run(&ctx).await.unwrap();
        assert!(!InventoryPage::new(&ui).is_on_dashboard().await.unwrap());

        DashboardTests.after_each(&ctx).await.unwrap();
        assert!(InventoryPage::new(&ui).is_on_dashboard().await.unwrap());
    }

    #[tokio::test]
    async fn before_each_fails_without_login_form() {
        let store = Arc::new(FakeStorefront::new(BrowserKind::Chrome));
        let suite = suite();
        let ui = Interactor::new(store.clone(), fast_waits());
        let ctx = TestCtx {
            ui: &ui,
            suite: &suite,
            verbose: false,
        };
        // Blank page: no login form to fill in.
        assert!(DashboardTests.before_each(&ctx).await.is_err());
    }
}
