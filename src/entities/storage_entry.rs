//! Storage entry entity - Device-local key/value storage.
//!
//! Holds the persisted cart and the local payment bookkeeping records. Values are
//! JSON documents stored as text; the key is unique.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Local storage database model - one JSON value per key
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "storage_entries")]
pub struct Model {
    /// Unique identifier
    #[sea_orm(primary_key)]
    pub id: i32,
    /// Storage key (e.g., `"cart"`, `"payment_42"`)
    #[sea_orm(unique)]
    pub key: String,
    /// Serialized JSON value
    pub value: String,
    /// When this entry was last written
    pub updated_at: DateTime,
}

/// `StorageEntry` has no relationships with other entities
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
