//! Session lifecycle - Who is logged in on this device.
//!
//! The session is kept in local storage next to the cart. Logging out removes it and
//! clears the cart, including the cart's saved copy.

use crate::{core::cart::CartStore, core::storage, errors::Result, models::UserSession};
use sea_orm::DatabaseConnection;
use tracing::{info, warn};

/// Local storage key holding the serialized session.
pub const SESSION_STORAGE_KEY: &str = "user";

/// Persists the login so the next launch starts signed in.
pub async fn save_session(db: &DatabaseConnection, session: &UserSession) -> Result<()> {
    storage::set_json(db, SESSION_STORAGE_KEY, session).await?;
    info!(user_id = session.user_id, role = ?session.role, "Session saved");
    Ok(())
}

/// The saved session, if any. An unreadable entry counts as logged out.
pub async fn load_session(db: &DatabaseConnection) -> Result<Option<UserSession>> {
    let Some(raw) = storage::get_item(db, SESSION_STORAGE_KEY).await? else {
        return Ok(None);
    };
    Ok(serde_json::from_str(&raw)
        .inspect_err(|e| warn!("Ignoring unreadable session: {}", e))
        .ok())
}

/// Forgets the user and tears down their cart.
pub async fn logout(db: &DatabaseConnection, cart: &mut CartStore) -> Result<()> {
    storage::remove_item(db, SESSION_STORAGE_KEY).await?;
    cart.clear_cart().await?;
    info!("Logged out");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::cart::CART_STORAGE_KEY;
    use crate::test_utils::*;

    #[tokio::test]
    async fn test_session_round_trip_and_logout() -> Result<()> {
        let db = setup_test_db().await?;
        let session = UserSession::consumer(7, "Amina");
        save_session(&db, &session).await?;
        assert_eq!(load_session(&db).await?, Some(session));

        let mut cart = CartStore::load(db.clone()).await?;
        cart.add_to_cart(test_product(1, 50.0), 1).await?;

        logout(&db, &mut cart).await?;

        assert_eq!(load_session(&db).await?, None);
        assert!(cart.is_empty());
        assert_eq!(storage::get_item(&db, CART_STORAGE_KEY).await?, None);
        Ok(())
    }

    #[tokio::test]
    async fn test_unreadable_session_is_logged_out() -> Result<()> {
        let db = setup_test_db().await?;
        storage::set_item(&db, SESSION_STORAGE_KEY, "{\"user_id\":".to_string()).await?;
        assert_eq!(load_session(&db).await?, None);
        Ok(())
    }
}
