//! Listing and feedback validation - Synchronous checks run before any form is sent.
//!
//! Farmers submit product drafts; consumers rate completed orders. Both are validated
//! locally so the backend only ever sees well-formed input.

use crate::errors::{Error, Result};

/// Ratings are whole stars.
pub const MIN_RATING: u8 = 1;
/// Highest accepted feedback rating.
pub const MAX_RATING: u8 = 5;

/// A product as entered in the farmer's add/edit form.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ProductDraft {
    /// Required; trimmed on validation
    pub name: String,
    /// Free text, may be empty
    pub description: String,
    /// Price per unit; must be positive
    pub price: f64,
    /// Selling unit shown next to the price
    pub unit: String,
    /// Units on hand; must not be negative
    pub stock: i64,
    /// Categories the product is listed under
    pub category_ids: Vec<i64>,
}

impl ProductDraft {
    /// Validates the draft, trimming the name on success.
    ///
    /// # Errors
    /// Returns an error if:
    /// - The name is empty or whitespace-only
    /// - The price is not a positive finite number
    /// - The stock is negative
    /// - No category is selected
    pub fn validate(mut self) -> Result<Self> {
        let name = self.name.trim();
        if name.is_empty() {
            return Err(Error::Validation {
                message: "Product name cannot be empty".to_string(),
            });
        }
        self.name = name.to_string();

        if !self.price.is_finite() || self.price <= 0.0 {
            return Err(Error::InvalidAmount { amount: self.price });
        }

        if self.stock < 0 {
            return Err(Error::InvalidQuantity {
                quantity: self.stock,
            });
        }

        if self.category_ids.is_empty() {
            return Err(Error::Validation {
                message: "Select at least one category".to_string(),
            });
        }

        Ok(self)
    }
}

/// Checks a rating and comment before they are posted, returning the trimmed comment.
pub fn validate_feedback(rating: u8, comment: &str) -> Result<String> {
    if !(MIN_RATING..=MAX_RATING).contains(&rating) {
        return Err(Error::Validation {
            message: format!("Rating must be between {MIN_RATING} and {MAX_RATING}"),
        });
    }
    Ok(comment.trim().to_string())
}
