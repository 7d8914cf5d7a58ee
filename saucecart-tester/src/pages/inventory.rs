use crate::browser::Locator;
use crate::error::TestResult;
use crate::fixture::Interactor;

pub const ADD_TO_CART_BUTTON: Locator =
    Locator::xpath("//button[@id='add-to-cart-sauce-labs-bike-light']");
pub const REMOVE_FROM_CART_BUTTON: Locator =
    Locator::xpath("//button[@id='remove-sauce-labs-bike-light']");
pub const CART_LINK: Locator = Locator::class_name("shopping_cart_link");
pub const CHECKOUT_BUTTON: Locator = Locator::id("checkout");
pub const SORT_DROPDOWN: Locator = Locator::class_name("product_sort_container");
pub const MENU_BUTTON: Locator = Locator::id("react-burger-menu-btn");
pub const LOGOUT_LINK: Locator = Locator::id("logout_sidebar_link");
pub const FIRST_ITEM_NAME: Locator =
    Locator::xpath("(//div[contains(@class,'inventory_item_name')])[1]");
pub const PRODUCT_DETAILS: Locator =
    Locator::xpath("//div[@class='inventory_details_desc large_size']");

pub const PRICE_LOW_TO_HIGH: &str = "Price (low to high)";
pub const INVENTORY_PATH: &str = "/inventory.html";
pub const CHECKOUT_PATH: &str = "/checkout-step-one.html";

/// The product listing shown after login.
pub struct InventoryPage<'a> {
    ui: &'a Interactor,
}

impl<'a> InventoryPage<'a> {
    #[must_use]
    pub const fn new(ui: &'a Interactor) -> Self {
        Self { ui }
    }

    pub async fn add_item_to_cart(&self) -> TestResult<()> {
        log::info!("Adding item to cart");
        self.ui.click(&ADD_TO_CART_BUTTON).await?;
        self.ui.wait_visibility(&REMOVE_FROM_CART_BUTTON).await?;
        Ok(())
    }

    /// Only valid after [`Self::add_item_to_cart`]: the remove control
    /// exists only while the item sits in the cart.
    pub async fn remove_item_from_cart(&self) -> TestResult<()> {
        log::info!("Removing item from cart");
        self.ui.click(&REMOVE_FROM_CART_BUTTON).await?;
        self.ui.wait_visibility(&ADD_TO_CART_BUTTON).await?;
        Ok(())
    }

    pub async fn go_to_checkout(&self) -> TestResult<()> {
        log::info!("Navigating to checkout page");
        self.ui.click(&CART_LINK).await?;
        self.ui.click(&CHECKOUT_BUTTON).await
    }

    pub async fn sort_by_price_low_to_high(&self) -> TestResult<()> {
        log::info!("Sorting items by price: low to high");
        self.ui
            .select_by_visible_text(&SORT_DROPDOWN, PRICE_LOW_TO_HIGH)
            .await
    }

    /// Sorts by price, opens the cheapest item and returns its description.
    pub async fn view_lowest_priced_item_details(&self) -> TestResult<String> {
        self.sort_by_price_low_to_high().await?;
        self.ui.click(&FIRST_ITEM_NAME).await?;
        let details = self.ui.element_text(&PRODUCT_DETAILS).await?;
        log::info!("Product details: {details}");
        Ok(details)
    }

    pub async fn log_out(&self) -> TestResult<()> {
        log::info!("Logging out");
        self.ui.click(&MENU_BUTTON).await?;
        self.ui.click(&LOGOUT_LINK).await
    }

    pub async fn is_add_to_cart_shown(&self) -> bool {
        self.ui.is_present(&ADD_TO_CART_BUTTON).await
    }

    pub async fn is_remove_from_cart_shown(&self) -> bool {
        self.ui.is_present(&REMOVE_FROM_CART_BUTTON).await
    }

    pub async fn is_on_dashboard(&self) -> TestResult<bool> {
        Ok(self.ui.current_url().await?.contains(INVENTORY_PATH))
    }

    pub async fn is_on_checkout(&self) -> TestResult<bool> {
        Ok(self.ui.current_url().await?.contains(CHECKOUT_PATH))
    }
}
