//! Page objects for the storefront screens, built on [`Interactor`](crate::fixture::Interactor).

pub mod inventory;
pub mod login;

pub use inventory::InventoryPage;
pub use login::LoginPage;
