//! Core business logic - cart, checkout and local records, independent of any UI.

pub mod cart;
pub mod checkout;
pub mod listing;
pub mod payment_records;
pub mod retry;
pub mod session;
pub mod storage;

pub use cart::{CartItem, CartStore, CartTotals};
pub use checkout::{CheckoutFlow, CheckoutState};
pub use retry::{Backoff, RetryPolicy};
