//! Cart business logic - The consumer's cart, held in memory and mirrored to local storage.
//!
//! The store is owned by whoever drives the UI and passed explicitly to the checkout
//! flow. Every mutation recomputes the totals and writes the whole cart back under
//! [`CART_STORAGE_KEY`]. On startup the stored copy is read back; anything that does
//! not parse is treated as an empty cart.

use crate::{
    core::storage,
    errors::{Error, Result},
    models::{OrderItem, Product},
};
use sea_orm::DatabaseConnection;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

/// Local storage key holding the serialized cart.
pub const CART_STORAGE_KEY: &str = "cart";

/// A product in the cart. `quantity` is never zero.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CartItem {
    /// Snapshot of the product as it was when added
    pub product: Product,
    /// Units of the product, at least 1
    pub quantity: u32,
}

impl CartItem {
    /// `price * quantity`
    #[must_use]
    pub fn subtotal(&self) -> f64 {
        self.product.price * f64::from(self.quantity)
    }
}

/// Derived totals, recomputed after every mutation.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct CartTotals {
    /// Sum of all quantities
    pub total_items: u32,
    /// Sum of `price * quantity`; never negative
    pub total_price: f64,
}

impl CartTotals {
    fn of(items: &[CartItem]) -> Self {
        items.iter().fold(Self::default(), |acc, item| Self {
            total_items: acc.total_items.saturating_add(item.quantity),
            total_price: acc.total_price + item.subtotal(),
        })
    }
}

/// The cart of the current device, mirrored to local storage.
///
/// Every mutation either persists or leaves the cart exactly as it was.
pub struct CartStore {
    db: DatabaseConnection,
    items: Vec<CartItem>,
    totals: CartTotals,
}

impl CartStore {
    /// Restores the cart saved on this device.
    ///
    /// A missing or unreadable entry yields an empty cart; only storage failures are
    /// reported as errors.
    pub async fn load(db: DatabaseConnection) -> Result<Self> {
        let items = match storage::get_item(&db, CART_STORAGE_KEY).await? {
            Some(raw) => serde_json::from_str::<Vec<CartItem>>(&raw).unwrap_or_else(|e| {
                warn!("Ignoring unreadable saved cart: {}", e);
                Vec::new()
            }),
            None => Vec::new(),
        };
        // Entries written by older builds may carry a zero quantity.
        let items: Vec<CartItem> = items.into_iter().filter(|i| i.quantity > 0).collect();
        let totals = CartTotals::of(&items);
        info!(
            "Cart loaded with {} products ({} items)",
            items.len(),
            totals.total_items
        );
        Ok(Self { db, items, totals })
    }

    /// Items in the order they were first added.
    #[must_use]
    pub fn items(&self) -> &[CartItem] {
        &self.items
    }

    /// True when nothing is in the cart.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Both totals at once.
    #[must_use]
    pub const fn totals(&self) -> CartTotals {
        self.totals
    }

    /// Number of units across all items.
    #[must_use]
    pub const fn total_items(&self) -> u32 {
        self.totals.total_items
    }

    /// Amount charged for the whole cart.
    #[must_use]
    pub const fn total_price(&self) -> f64 {
        self.totals.total_price
    }

    /// Quantity of `product_id` currently in the cart, zero if absent.
    #[must_use]
    pub fn quantity_of(&self, product_id: i64) -> u32 {
        self.items
            .iter()
            .find(|i| i.product.id == product_id)
            .map_or(0, |i| i.quantity)
    }

    /// The cart as order-creation line items.
    #[must_use]
    pub fn order_items(&self) -> Vec<OrderItem> {
        self.items
            .iter()
            .map(|i| OrderItem {
                product_id: i.product.id,
                quantity: i.quantity,
            })
            .collect()
    }

    /// Adds `quantity` of `product`, merging with an existing entry for the same id.
    ///
    /// # Errors
    /// Returns an error if:
    /// - `quantity` is zero or the merged quantity overflows
    /// - the price is negative or not a finite number
    /// - the cart cannot be saved
    pub async fn add_to_cart(&mut self, product: Product, quantity: u32) -> Result<()> {
        if quantity == 0 {
            return Err(Error::InvalidQuantity { quantity: 0 });
        }
        if !product.price.is_finite() || product.price < 0.0 {
            warn!(product_id = product.id, price = product.price, "Rejected unpriceable product");
            return Err(Error::InvalidAmount {
                amount: product.price,
            });
        }
        let previous = self.items.clone();
        if let Some(existing) = self.items.iter_mut().find(|i| i.product.id == product.id) {
            existing.quantity =
                existing
                    .quantity
                    .checked_add(quantity)
                    .ok_or(Error::InvalidQuantity {
                        quantity: i64::from(existing.quantity) + i64::from(quantity),
                    })?;
            debug!(product_id = product.id, quantity = existing.quantity, "Merged into cart");
        } else {
            debug!(product_id = product.id, quantity, "Added to cart");
            self.items.push(CartItem { product, quantity });
        }
        self.commit(previous).await
    }

    /// Sets the quantity for `product_id`. Zero or negative removes the entry and an
    /// unknown id is ignored.
    pub async fn update_quantity(&mut self, product_id: i64, quantity: i64) -> Result<()> {
        if quantity <= 0 {
            return self.remove_from_cart(product_id).await;
        }
        let quantity = u32::try_from(quantity).map_err(|_| Error::InvalidQuantity { quantity })?;
        let previous = self.items.clone();
        let Some(item) = self.items.iter_mut().find(|i| i.product.id == product_id) else {
            debug!(product_id, "Quantity update for product not in cart ignored");
            return Ok(());
        };
        item.quantity = quantity;
        self.commit(previous).await
    }

    /// Drops `product_id` from the cart; absent ids are a no-op.
    pub async fn remove_from_cart(&mut self, product_id: i64) -> Result<()> {
        if self.quantity_of(product_id) == 0 {
            return Ok(());
        }
        let previous = self.items.clone();
        self.items.retain(|i| i.product.id != product_id);
        debug!(product_id, "Removed from cart");
        self.commit(previous).await
    }

    /// Empties the cart and erases the saved copy.
    ///
    /// The in-memory cart is emptied even when erasing the saved copy fails.
    pub async fn clear_cart(&mut self) -> Result<()> {
        self.items.clear();
        self.totals = CartTotals::default();
        storage::remove_item(&self.db, CART_STORAGE_KEY).await?;
        info!("Cart cleared");
        Ok(())
    }

    /// Saves the mutated items, restoring `previous` if the write fails.
    async fn commit(&mut self, previous: Vec<CartItem>) -> Result<()> {
        if let Err(e) = storage::set_json(&self.db, CART_STORAGE_KEY, &self.items).await {
            warn!("Cart change not saved, rolling back: {}", e);
            self.items = previous;
            return Err(e);
        }
        self.totals = CartTotals::of(&self.items);
        Ok(())
    }
}
