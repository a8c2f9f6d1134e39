//! Orders as created through `order.php`.

use super::lenient::{f64_from_any, i64_from_any, opt_i64_from_any};
use serde::{Deserialize, Serialize};
use std::fmt;

/// One line of an order creation request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderItem {
    /// Product being bought
    pub product_id: i64,
    /// At least one
    pub quantity: u32,
}

/// Free-form pickup preferences sent with the order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PickupDetails {
    /// Always the configured market office
    pub location: String,
    /// `YYYY-MM-DD`; unset at checkout, pickups are booked later
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub preferred_date: Option<String>,
    /// Buyer notes
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

/// Body of an order creation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CreateOrderRequest {
    /// One line per cart item
    pub items: Vec<OrderItem>,
    /// Where and when the buyer collects
    pub pickup_details: PickupDetails,
    /// Buyer
    pub user_id: i64,
}

/// `data` of a successful order creation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub struct CreatedOrder {
    /// Id assigned by the backend
    #[serde(deserialize_with = "i64_from_any")]
    pub order_id: i64,
}

/// What the client keeps once an order exists: the id and the locally computed total.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PlacedOrder {
    /// Server-side order id
    pub order_id: i64,
    /// Cart total when the order was placed
    pub total: f64,
}

/// Order lifecycle as stored by the backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OrderStatus {
    /// Placed, awaiting payment
    Pending,
    /// Paid
    Confirmed,
    /// Being prepared by the farmer
    Processing,
    /// Ready for collection
    Ready,
    /// Collected
    Completed,
    /// Cancelled by either side
    #[serde(alias = "cancelled")]
    Canceled,
}

impl OrderStatus {
    /// Wire spelling.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Confirmed => "confirmed",
            Self::Processing => "processing",
            Self::Ready => "ready",
            Self::Completed => "completed",
            Self::Canceled => "canceled",
        }
    }
}

impl fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Body of a status change on `order.php`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UpdateOrderStatusRequest {
    /// Always `update_status`
    pub action: &'static str,
    /// Order to update
    pub order_id: i64,
    /// New status
    pub status: OrderStatus,
}

impl UpdateOrderStatusRequest {
    /// Request with the `action` field filled in.
    #[must_use]
    pub const fn new(order_id: i64, status: OrderStatus) -> Self {
        Self {
            action: "update_status",
            order_id,
            status,
        }
    }
}

/// An order as a farmer sees it in `farmer/orders.php`.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct OrderSummary {
    /// Order id
    #[serde(alias = "id", deserialize_with = "i64_from_any")]
    pub order_id: i64,
    /// Current status
    pub status: OrderStatus,
    /// Order total as stored by the backend
    #[serde(default, alias = "total", deserialize_with = "f64_from_any")]
    pub total_amount: f64,
    #[serde(default, deserialize_with = "opt_i64_from_any")]
    pub consumer_id: Option<i64>,
    /// Buyer name, when the backend joins it in
    #[serde(default)]
    pub consumer_name: Option<String>,
    #[serde(default, alias = "order_date")]
    pub created_at: Option<String>,
}
