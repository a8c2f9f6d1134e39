//! Device-local key/value storage.
//!
//! A thin async get/set/remove API over the `storage_entries` table. Values are JSON
//! text; the typed helpers serialize and deserialize with `serde_json`.

use crate::{
    entities::{StorageEntry, storage_entry},
    errors::Result,
};
use sea_orm::{Set, prelude::*};
use serde::{Serialize, de::DeserializeOwned};

/// Reads the raw value stored under `key`.
pub async fn get_item(db: &DatabaseConnection, key: &str) -> Result<Option<String>> {
    Ok(find_entry(db, key).await?.map(|entry| entry.value))
}

/// Stores `value` under `key`, replacing any previous value.
pub async fn set_item(db: &DatabaseConnection, key: &str, value: String) -> Result<()> {
    let now = chrono::Utc::now().naive_utc();
    match find_entry(db, key).await? {
        Some(existing) => {
            let mut entry: storage_entry::ActiveModel = existing.into();
            entry.value = Set(value);
            entry.updated_at = Set(now);
            entry.update(db).await?;
        }
        None => {
            let entry = storage_entry::ActiveModel {
                key: Set(key.to_string()),
                value: Set(value),
                updated_at: Set(now),
                ..Default::default()
            };
            entry.insert(db).await?;
        }
    }
    Ok(())
}

/// Deletes `key`. Removing a missing key is not an error.
pub async fn remove_item(db: &DatabaseConnection, key: &str) -> Result<()> {
    StorageEntry::delete_many()
        .filter(storage_entry::Column::Key.eq(key))
        .exec(db)
        .await?;
    Ok(())
}

/// Serializes `value` as JSON and stores it under `key`.
pub async fn set_json<T: Serialize + ?Sized>(
    db: &DatabaseConnection,
    key: &str,
    value: &T,
) -> Result<()> {
    let json = serde_json::to_string(value)?;
    set_item(db, key, json).await
}

/// Reads `key` and parses it as JSON. A missing key yields `Ok(None)`; a value
/// that does not parse is an error the caller may choose to ignore.
pub async fn get_json<T: DeserializeOwned>(db: &DatabaseConnection, key: &str) -> Result<Option<T>> {
    match get_item(db, key).await? {
        Some(raw) => Ok(Some(serde_json::from_str(&raw)?)),
        None => Ok(None),
    }
}

async fn find_entry(db: &DatabaseConnection, key: &str) -> Result<Option<storage_entry::Model>> {
    StorageEntry::find()
        .filter(storage_entry::Column::Key.eq(key))
        .one(db)
        .await
        .map_err(Into::into)
}
