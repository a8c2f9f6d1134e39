//! Payments as processed through `payment.php`.

use super::lenient::string_from_any;
use crate::errors::{Error, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// How the buyer pays.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PaymentMethod {
    /// Card details are collected and sent with the payment
    Card,
    /// Funds change hands at the market office when the order is collected
    CashOnPickup,
    /// Mobile wallet; confirmed by the provider
    MobileMoney,
}

impl PaymentMethod {
    /// Card payments need [`CardDetails`].
    #[must_use]
    pub const fn requires_card(self) -> bool {
        matches!(self, Self::Card)
    }
}

/// Payment state reported by the backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PaymentStatus {
    /// Awaiting settlement
    Pending,
    /// Funds received
    #[serde(alias = "success", alias = "paid")]
    Completed,
    /// Declined or errored
    Failed,
    /// Returned to the buyer
    Refunded,
    /// Any status this client does not know
    #[serde(other)]
    Unknown,
}

impl PaymentStatus {
    /// Wire spelling.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Completed => "completed",
            Self::Failed => "failed",
            Self::Refunded => "refunded",
            Self::Unknown => "unknown",
        }
    }
}

impl fmt::Display for PaymentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Card form fields. `Debug` shows only the last four digits.
#[derive(Clone, PartialEq, Eq, Serialize)]
pub struct CardDetails {
    /// 12 to 19 digits; spaces and dashes are ignored
    pub card_number: String,
    /// Name as printed on the card
    pub card_holder: String,
    /// `MM/YY`
    pub expiry: String,
    /// 3 or 4 digits
    pub cvv: String,
}

// Keeps card numbers out of logs.
impl fmt::Debug for CardDetails {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let digits: String = self.card_number.chars().filter(char::is_ascii_digit).collect();
        let last4 = &digits[digits.len().saturating_sub(4)..];
        f.debug_struct("CardDetails")
            .field("card_number", &format_args!("****{last4}"))
            .field("card_holder", &self.card_holder)
            .finish_non_exhaustive()
    }
}

impl CardDetails {
    /// Checks the form fields before anything is sent.
    ///
    /// # Errors
    /// Returns `Error::Validation` naming the first offending field.
    pub fn validate(&self) -> Result<()> {
        let digits: String = self
            .card_number
            .chars()
            .filter(|c| !c.is_whitespace() && *c != '-')
            .collect();
        if !(12..=19).contains(&digits.len()) || !digits.chars().all(|c| c.is_ascii_digit()) {
            return Err(invalid("Please enter a valid card number"));
        }
        if self.card_holder.trim().is_empty() {
            return Err(invalid("Please enter the card holder name"));
        }
        let Some((month, year)) = self.expiry.trim().split_once('/') else {
            return Err(invalid("Expiry date must be in MM/YY format"));
        };
        let month_ok = month.len() == 2 && matches!(month.parse::<u8>(), Ok(1..=12));
        let year_ok = year.len() == 2 && year.parse::<u8>().is_ok();
        if !month_ok || !year_ok {
            return Err(invalid("Expiry date must be in MM/YY format"));
        }
        if !(3..=4).contains(&self.cvv.len()) || !self.cvv.chars().all(|c| c.is_ascii_digit()) {
            return Err(invalid("Please enter a valid CVV"));
        }
        Ok(())
    }
}

fn invalid(message: &str) -> Error {
    Error::Validation {
        message: message.to_string(),
    }
}

/// Body of `payment.php`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PaymentRequest {
    /// Order being paid
    pub order_id: i64,
    /// How the buyer pays
    pub payment_method: PaymentMethod,
    /// Buyer
    pub user_id: i64,
    /// Order total
    pub amount: f64,
    /// Only for card payments
    #[serde(skip_serializing_if = "Option::is_none")]
    pub card_details: Option<CardDetails>,
}

/// `data` of a processed payment.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct PaymentReceipt {
    /// Server-assigned id, numeric or not
    #[serde(deserialize_with = "string_from_any")]
    pub payment_id: String,
    /// Outcome reported by the server
    pub payment_status: PaymentStatus,
}

/// Local bookkeeping of a payment, stored per order id.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PaymentRecord {
    /// Server-assigned payment id
    pub payment_id: String,
    /// Status at the time of payment
    pub status: PaymentStatus,
    /// When the payment succeeded on this device
    pub timestamp: DateTime<Utc>,
}
