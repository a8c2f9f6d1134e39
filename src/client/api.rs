//! The backend operations the checkout flow depends on.

use crate::errors::Result;
use crate::models::{
    Category, CreateOrderRequest, CreatedOrder, FeedbackRequest, OrderStatus, PaymentReceipt,
    PaymentRequest, Pickup, Product, ProductQuery, ScheduledPickup, SchedulePickupRequest,
};

/// One method per server operation used by consumers.
///
/// `HttpMarketClient` talks to the real backend; tests substitute a scripted mock.
#[allow(async_fn_in_trait)]
pub trait MarketApi {
    /// Catalog, optionally filtered. An empty catalog is not an error.
    async fn get_products(&self, query: &ProductQuery) -> Result<Vec<Product>>;

    /// Categories for the catalog filter.
    async fn get_categories(&self) -> Result<Vec<Category>>;

    /// Places an order. Never retried.
    async fn create_order(&self, request: &CreateOrderRequest) -> Result<CreatedOrder>;

    /// Retried per the client's payment policy. Retries are not idempotent.
    async fn process_payment(&self, request: &PaymentRequest) -> Result<PaymentReceipt>;

    /// Retried per the client's order-status policy.
    async fn update_order_status(&self, order_id: i64, status: OrderStatus) -> Result<()>;

    /// Books a pickup slot for a paid order.
    async fn schedule_pickup(&self, request: &SchedulePickupRequest) -> Result<ScheduledPickup>;

    /// The user's booked pickups.
    async fn get_user_pickups(&self, user_id: i64) -> Result<Vec<Pickup>>;

    /// Posts a rating for a completed order.
    async fn submit_feedback(&self, request: &FeedbackRequest) -> Result<()>;
}
