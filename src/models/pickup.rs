//! Pickups as scheduled through `pickup.php`.

use super::lenient::{i64_from_any, opt_i64_from_any, string_from_any};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Lifecycle: `pending → assigned → ready | in_transit → completed`, or `canceled`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PickupStatus {
    /// Requested, not yet assigned
    Pending,
    /// Assigned to market staff
    Assigned,
    /// Waiting at the market office
    Ready,
    /// On its way to the market office
    InTransit,
    /// Collected
    Completed,
    /// Cancelled
    #[serde(alias = "cancelled")]
    Canceled,
}

impl PickupStatus {
    /// Whether the server may still move this pickup to `next`.
    #[must_use]
    pub const fn can_become(self, next: Self) -> bool {
        matches!(
            (self, next),
            (Self::Pending, Self::Assigned | Self::Canceled)
                | (Self::Assigned, Self::Ready | Self::InTransit | Self::Canceled)
                | (Self::Ready | Self::InTransit, Self::Completed | Self::Canceled)
        )
    }

    /// No further changes after this.
    #[must_use]
    pub const fn is_final(self) -> bool {
        matches!(self, Self::Completed | Self::Canceled)
    }
}

/// Body of a `schedule_pickup` call on `pickup.php`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SchedulePickupRequest {
    /// Always `schedule_pickup`
    pub action: &'static str,
    /// Paid order being collected
    pub order_id: i64,
    /// Payment the pickup is booked against
    pub payment_id: String,
    /// `YYYY-MM-DD`
    pub pickup_date: NaiveDate,
    /// Trimmed free text
    pub pickup_notes: String,
}

impl SchedulePickupRequest {
    /// Request with the `action` field filled in.
    #[must_use]
    pub fn new(order_id: i64, payment_id: String, pickup_date: NaiveDate, notes: String) -> Self {
        Self {
            action: "schedule_pickup",
            order_id,
            payment_id,
            pickup_date,
            pickup_notes: notes,
        }
    }
}

/// `data` of a scheduled pickup; older endpoints return nothing useful.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct ScheduledPickup {
    /// Server id of the new pickup
    #[serde(default, deserialize_with = "opt_i64_from_any")]
    pub pickup_id: Option<i64>,
    /// Initial status, when reported
    #[serde(default)]
    pub pickup_status: Option<PickupStatus>,
}

/// A booked pickup as listed for the user.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Pickup {
    /// Pickup id
    #[serde(alias = "pickup_id", deserialize_with = "i64_from_any")]
    pub id: i64,
    /// Order being collected
    #[serde(deserialize_with = "i64_from_any")]
    pub order_id: i64,
    /// Payment the pickup was booked against
    #[serde(default, deserialize_with = "opt_string_from_any")]
    pub payment_id: Option<String>,
    /// Collection day
    pub pickup_date: NaiveDate,
    /// Where to collect
    #[serde(default, alias = "pickup_location")]
    pub location: Option<String>,
    /// Buyer notes
    #[serde(default, alias = "pickup_notes")]
    pub notes: Option<String>,
    /// Current status
    pub status: PickupStatus,
}

fn opt_string_from_any<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    #[derive(Deserialize)]
    struct Wrapper(#[serde(deserialize_with = "string_from_any")] String);

    Ok(Option::<Wrapper>::deserialize(deserializer)?.map(|Wrapper(v)| v))
}
