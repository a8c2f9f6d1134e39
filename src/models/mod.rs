//! Domain types shared by the cart, the API client and the checkout flow.
//!
//! Response JSON is not uniform across endpoints, so decoding goes through the
//! helpers in [`lenient`]. Requests are serialized exactly as each endpoint expects.

pub mod feedback;
pub mod lenient;
pub mod order;
pub mod payment;
pub mod pickup;
pub mod product;
pub mod user;

pub use feedback::{FarmDetails, FeedbackRequest, Notification};
pub use order::{
    CreateOrderRequest, CreatedOrder, OrderItem, OrderStatus, OrderSummary, PickupDetails,
    PlacedOrder, UpdateOrderStatusRequest,
};
pub use payment::{
    CardDetails, PaymentMethod, PaymentReceipt, PaymentRecord, PaymentRequest, PaymentStatus,
};
pub use pickup::{Pickup, PickupStatus, ScheduledPickup, SchedulePickupRequest};
pub use product::{Category, Product, ProductQuery};
pub use user::{UserRole, UserSession};
