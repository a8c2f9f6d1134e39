/// Application settings loaded from config.toml and the environment
pub mod app;

/// Local storage database connection and table creation
pub mod database;

pub use app::{ApiConfig, AppConfig, PickupConfig, RetryConfig, StorageConfig};
