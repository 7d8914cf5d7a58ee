mod driver;
mod locator;
mod session;

pub use driver::{Driver, ElementHandle, SessionOptions};
pub use locator::Locator;
pub use session::{BrowserConfig, BrowserKind, SessionFactory, WebDriverFactory};
