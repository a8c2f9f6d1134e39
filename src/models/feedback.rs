//! Feedback and farmer-side records.

use super::lenient::{f64_from_any, i64_from_any, opt_i64_from_any};
use serde::{Deserialize, Serialize};

/// Rating posted for a completed order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FeedbackRequest {
    /// Completed order being rated
    pub order_id: i64,
    /// Rating author
    pub user_id: i64,
    /// 1 to 5
    pub rating: u8,
    /// Trimmed; may be empty
    pub comment: String,
}

/// Farm profile managed by a farmer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FarmDetails {
    /// Absent until the profile is first saved
    #[serde(default, deserialize_with = "opt_i64_from_any")]
    pub farm_id: Option<i64>,
    pub farm_name: String,
    #[serde(default)]
    pub location: String,
    /// Shown on the farm page
    #[serde(default)]
    pub description: Option<String>,
    /// In acres
    #[serde(default, deserialize_with = "opt_f64_from_any")]
    pub farm_size: Option<f64>,
    /// e.g. organic, mixed
    #[serde(default)]
    pub farming_methods: Option<String>,
}

/// A message for the farmer, such as a new order.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Notification {
    /// Notification id
    #[serde(alias = "notification_id", deserialize_with = "i64_from_any")]
    pub id: i64,
    /// Text shown to the farmer
    pub message: String,
    /// Read flag; tinyint on the server
    #[serde(default, deserialize_with = "bool_from_any")]
    pub is_read: bool,
    #[serde(default)]
    pub created_at: Option<String>,
}

fn opt_f64_from_any<'de, D>(deserializer: D) -> Result<Option<f64>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    #[derive(Deserialize)]
    struct Wrapper(#[serde(deserialize_with = "f64_from_any")] f64);

    Ok(Option::<Wrapper>::deserialize(deserializer)?.map(|Wrapper(v)| v))
}

// MySQL tinyint columns come back as 0/1 or "0"/"1".
fn bool_from_any<'de, D>(deserializer: D) -> Result<bool, D::Error>
where
    D: serde::Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum BoolLike {
        Bool(bool),
        Int(i64),
        Text(String),
    }

    Ok(match BoolLike::deserialize(deserializer)? {
        BoolLike::Bool(b) => b,
        BoolLike::Int(i) => i != 0,
        BoolLike::Text(s) => matches!(s.trim(), "1" | "true"),
    })
}
