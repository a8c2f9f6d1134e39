//! Backend client - typed access to the market's PHP endpoints.

/// The consumer-facing operations as a trait
pub mod api;
/// Reachability checks
pub mod connectivity;
/// Farmer product, order, profile and notification endpoints
pub mod farmer;
/// reqwest implementation with timeout and retries
pub mod http;
/// Response classification and payload decoding
pub mod response;

pub use api::MarketApi;
pub use connectivity::{AlwaysOnline, Connectivity, NetworkStatus};
pub use farmer::ImageUpload;
pub use http::HttpMarketClient;
