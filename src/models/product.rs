//! Catalog records as served by `market.php`.

use super::lenient::{f64_from_any, i64_from_any, opt_i64_from_any};
use serde::{Deserialize, Serialize};

/// A product listed on the market. Read-only for consumers.
///
/// Decoding goes through [`ProductRow`], which tolerates the null columns and
/// duplicated id keys the catalog endpoints produce. Serialization uses the field
/// names below, which is also the format the cart is stored in.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "ProductRow")]
pub struct Product {
    /// Catalog id
    pub id: i64,
    /// Display name
    pub name: String,
    /// Free-text description from the farmer
    pub description: Option<String>,
    /// Price per `unit`
    pub price: f64,
    /// Selling unit, e.g. `kg`; empty when the farmer left it blank
    pub unit: String,
    /// Stock on hand; `None` when the backend does not track it
    pub quantity_available: Option<i64>,
    /// Image paths relative to the backend's upload directory
    pub images: Vec<String>,
    /// Category name
    pub category: Option<String>,
    /// Owning farmer
    pub farmer_id: Option<i64>,
    /// Name of the owning farm
    pub farm_name: Option<String>,
    /// Where the farm is
    pub farm_location: Option<String>,
}

/// A catalog row as the backend sends it.
///
/// Joined queries may carry both `id` and `product_id`, and nullable columns come
/// back as `null`, so every field is optional here.
#[derive(Deserialize)]
struct ProductRow {
    #[serde(default, deserialize_with = "opt_i64_from_any")]
    id: Option<i64>,
    #[serde(default, deserialize_with = "opt_i64_from_any")]
    product_id: Option<i64>,
    #[serde(default)]
    name: Option<String>,
    #[serde(default)]
    description: Option<String>,
    #[serde(deserialize_with = "f64_from_any")]
    price: f64,
    #[serde(default)]
    unit: Option<String>,
    #[serde(
        default,
        alias = "stock",
        alias = "stock_quantity",
        deserialize_with = "opt_i64_from_any"
    )]
    quantity_available: Option<i64>,
    #[serde(default)]
    images: Option<Vec<String>>,
    #[serde(default, alias = "category_name")]
    category: Option<String>,
    #[serde(default, deserialize_with = "opt_i64_from_any")]
    farmer_id: Option<i64>,
    #[serde(default)]
    farm_name: Option<String>,
    #[serde(default)]
    farm_location: Option<String>,
}

impl TryFrom<ProductRow> for Product {
    type Error = String;

    fn try_from(row: ProductRow) -> Result<Self, Self::Error> {
        let id = row
            .id
            .or(row.product_id)
            .ok_or_else(|| "product without `id` or `product_id`".to_string())?;
        Ok(Self {
            id,
            name: row.name.unwrap_or_default(),
            description: row.description,
            price: row.price,
            unit: row.unit.unwrap_or_default(),
            quantity_available: row.quantity_available,
            images: row.images.unwrap_or_default(),
            category: row.category,
            farmer_id: row.farmer_id,
            farm_name: row.farm_name,
            farm_location: row.farm_location,
        })
    }
}

impl Product {
    /// Minimal product, mostly useful when only id, name and price matter.
    #[must_use]
    pub fn new(id: i64, name: impl Into<String>, price: f64) -> Self {
        Self {
            id,
            name: name.into(),
            description: None,
            price,
            unit: String::new(),
            quantity_available: None,
            images: Vec::new(),
            category: None,
            farmer_id: None,
            farm_name: None,
            farm_location: None,
        }
    }

    /// Untracked stock counts as available.
    #[must_use]
    pub fn is_in_stock(&self) -> bool {
        self.quantity_available.is_none_or(|q| q > 0)
    }
}

/// A catalog category.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Category {
    /// Category id, used as the `category` filter
    #[serde(alias = "category_id", deserialize_with = "i64_from_any")]
    pub id: i64,
    /// Display name
    #[serde(alias = "category_name")]
    pub name: String,
}

/// Filters for `get_products`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProductQuery {
    /// Free-text search; blank means no filter
    pub search: Option<String>,
    /// Restrict to one category
    pub category_id: Option<i64>,
    /// Restrict to one farmer's products
    pub farmer_id: Option<i64>,
}

impl ProductQuery {
    /// Query-string pairs understood by `market.php`.
    #[must_use]
    pub fn to_params(&self) -> Vec<(&'static str, String)> {
        let mut params = Vec::new();
        if let Some(search) = self.search.as_deref().map(str::trim).filter(|s| !s.is_empty()) {
            params.push(("search", search.to_string()));
        }
        if let Some(category_id) = self.category_id {
            params.push(("category", category_id.to_string()));
        }
        if let Some(farmer_id) = self.farmer_id {
            params.push(("farmer_id", farmer_id.to_string()));
        }
        params
    }
}
