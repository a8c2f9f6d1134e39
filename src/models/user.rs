//! The logged-in user.

use serde::{Deserialize, Serialize};

/// Which side of the market the user is on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UserRole {
    /// Sells produce
    Farmer,
    /// Buys produce
    Consumer,
}

/// The logged-in user, persisted across launches.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserSession {
    /// Backend user id
    pub user_id: i64,
    /// Display name
    pub name: String,
    /// Which screens the user gets
    pub role: UserRole,
}

impl UserSession {
    /// Session for a buyer.
    #[must_use]
    pub fn consumer(user_id: i64, name: impl Into<String>) -> Self {
        Self {
            user_id,
            name: name.into(),
            role: UserRole::Consumer,
        }
    }

    /// Session for a seller.
    #[must_use]
    pub fn farmer(user_id: i64, name: impl Into<String>) -> Self {
        Self {
            user_id,
            name: name.into(),
            role: UserRole::Farmer,
        }
    }

    /// Farmers get the listing and order-management screens.
    #[must_use]
    pub fn is_farmer(&self) -> bool {
        self.role == UserRole::Farmer
    }
}
