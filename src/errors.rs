//! Unified error type for the market client.
//!
//! Data-layer functions never talk to the user directly. They return these errors and
//! the presentation layer decides how to surface them, usually through
//! [`Error::user_message`].

use crate::core::checkout::CheckoutState;
use std::time::Duration;
use thiserror::Error;

/// Every failure the client can report.
#[derive(Debug, Error)]
pub enum Error {
    /// Bad or unreadable configuration
    #[error("Configuration error: {message}")]
    Config {
        /// What was wrong
        message: String,
    },

    /// Local storage failure
    #[error("Database error: {0}")]
    Database(#[from] sea_orm::DbErr),

    /// File could not be read, e.g. a missing config file
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Stored JSON could not be written or read back
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// The connectivity check reported no network; no request was sent.
    #[error("No internet connection")]
    Offline,

    /// No response within the configured request timeout
    #[error("Request timed out after {after:?}")]
    Timeout {
        /// The timeout that elapsed
        after: Duration,
    },

    /// HTTP status >= 400, or a `status: "error"` / `success: false` payload.
    #[error("Server error ({status}): {message}")]
    Server {
        /// HTTP status of the response
        status: u16,
        /// Server-supplied message, or a generic one naming the status
        message: String,
    },

    /// Body was not JSON or did not have the expected shape
    #[error("Invalid server response: {message}")]
    InvalidResponse {
        /// Decoder error
        message: String,
    },

    /// Transport failure below HTTP
    #[error("Network error: {0}")]
    Http(#[from] reqwest::Error),

    /// Checkout attempted with nothing in the cart
    #[error("Cart is empty")]
    EmptyCart,

    /// Operation needs a logged-in user
    #[error("User is not logged in")]
    NotAuthenticated,

    /// Cart quantity below one
    #[error("Invalid quantity: {quantity}")]
    InvalidQuantity {
        /// Rejected quantity
        quantity: i64,
    },

    /// Price or amount that is negative or not a finite number
    #[error("Invalid amount: {amount}")]
    InvalidAmount {
        /// Rejected amount
        amount: f64,
    },

    /// Input rejected before anything was sent
    #[error("Validation failed: {message}")]
    Validation {
        /// Message fit to show next to the offending field
        message: String,
    },

    /// The server answered but marked the payment as failed
    #[error("Payment {payment_id} was not accepted (status: {status})")]
    PaymentDeclined {
        /// Server-assigned payment id
        payment_id: String,
        /// Status the server reported
        status: String,
    },

    /// No local payment record exists for the order
    #[error("No payment recorded for order {order_id}")]
    MissingPaymentRecord {
        /// Order that was looked up
        order_id: i64,
    },

    /// Checkout step called from a state that does not allow it
    #[error("Cannot {action} while checkout is {state}")]
    InvalidTransition {
        /// State the flow was in
        state: CheckoutState,
        /// What was attempted
        action: &'static str,
    },
}

impl Error {
    /// Whether a retry loop should try the same request again.
    ///
    /// Offline short-circuits and local validation failures will fail identically on
    /// the next attempt, so only network and server-side failures qualify.
    #[must_use]
    pub const fn is_retryable(&self) -> bool {
        matches!(
            self,
            Self::Timeout { .. } | Self::Server { .. } | Self::InvalidResponse { .. } | Self::Http(_)
        )
    }

    /// Text suitable for an alert shown to the user.
    #[must_use]
    pub fn user_message(&self) -> String {
        match self {
            Self::Offline => {
                "You appear to be offline. Please check your internet connection and try again."
                    .to_string()
            }
            Self::Timeout { .. } => "Request timed out. Please try again.".to_string(),
            Self::Server { message, .. } => message.clone(),
            Self::InvalidResponse { .. } | Self::Serialization(_) => {
                "Invalid server response. Please try again later.".to_string()
            }
            Self::Http(_) => "Network request failed. Please try again.".to_string(),
            Self::EmptyCart => "Your cart is empty.".to_string(),
            Self::NotAuthenticated => "Please log in to place an order.".to_string(),
            Self::Validation { message } => message.clone(),
            Self::PaymentDeclined { .. } => {
                "Your payment could not be completed. Please try another method.".to_string()
            }
            other => other.to_string(),
        }
    }
}

// Convenience `Result` type
/// Result alias used throughout the crate.
pub type Result<T> = std::result::Result<T, Error>;
