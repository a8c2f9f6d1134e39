//! Local payment bookkeeping, one record per order id.
//!
//! The server owns the real payment; this record only lets the device remember that
//! an order was paid so pickup scheduling can be offered for it.

use crate::{
    core::storage,
    errors::{Error, Result},
    models::PaymentRecord,
};
use sea_orm::DatabaseConnection;
use tracing::warn;

/// Storage key for the payment of `order_id`.
#[must_use]
pub fn payment_key(order_id: i64) -> String {
    format!("payment_{order_id}")
}

/// Stores `record` under the order, replacing any earlier one.
pub async fn save_payment_record(
    db: &DatabaseConnection,
    order_id: i64,
    record: &PaymentRecord,
) -> Result<()> {
    storage::set_json(db, &payment_key(order_id), record).await
}

/// Reads the record for `order_id`. A record that no longer parses is treated as absent.
pub async fn load_payment_record(
    db: &DatabaseConnection,
    order_id: i64,
) -> Result<Option<PaymentRecord>> {
    match storage::get_json(db, &payment_key(order_id)).await {
        Ok(record) => Ok(record),
        Err(Error::Serialization(e)) => {
            warn!(order_id, "Ignoring unreadable payment record: {}", e);
            Ok(None)
        }
        Err(e) => Err(e),
    }
}

/// Deletes the record; a missing one is not an error.
pub async fn remove_payment_record(db: &DatabaseConnection, order_id: i64) -> Result<()> {
    storage::remove_item(db, &payment_key(order_id)).await
}
