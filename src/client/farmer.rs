//! Farmer endpoints under `farmer/*.php`.
//!
//! Product listings, incoming orders, the farm profile and notifications. These share
//! the consumer client's pipeline but are never retried; product create/update go out
//! as multipart so images can ride along.

use super::http::HttpMarketClient;
use super::response::{decode, decode_or_default};
use crate::core::listing::ProductDraft;
use crate::errors::{Error, Result};
use crate::models::{FarmDetails, Notification, OrderStatus, OrderSummary, Product};
use reqwest::multipart::{Form, Part};
use serde_json::json;
use tracing::{info, instrument};

/// An image attached to a product form.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageUpload {
    /// Name sent in the multipart part
    pub file_name: String,
    /// e.g. `image/jpeg`
    pub mime_type: String,
    /// Raw file contents
    pub bytes: Vec<u8>,
}

fn product_form(farmer_id: i64, draft: &ProductDraft, images: &[ImageUpload]) -> Result<Form> {
    let categories = draft
        .category_ids
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(",");
    let mut form = Form::new()
        .text("farmer_id", farmer_id.to_string())
        .text("name", draft.name.clone())
        .text("description", draft.description.clone())
        .text("price", format!("{:.2}", draft.price))
        .text("unit", draft.unit.clone())
        .text("stock", draft.stock.to_string())
        .text("categories", categories);
    for image in images {
        let part = Part::bytes(image.bytes.clone())
            .file_name(image.file_name.clone())
            .mime_str(&image.mime_type)?;
        form = form.part("images[]", part);
    }
    Ok(form)
}

impl HttpMarketClient {
    /// The farmer's own listings, including out-of-stock ones.
    #[instrument(skip(self))]
    pub async fn list_farmer_products(&self, farmer_id: i64) -> Result<Vec<Product>> {
        decode_or_default(
            self.get("farmer/products.php", &[("farmer_id", farmer_id.to_string())])
                .await?,
        )
    }

    /// Validates and submits a new product. Returns the new product id.
    #[instrument(skip(self, draft, images), fields(images = images.len()))]
    pub async fn create_product(
        &self,
        farmer_id: i64,
        draft: ProductDraft,
        images: &[ImageUpload],
    ) -> Result<i64> {
        #[derive(serde::Deserialize)]
        struct Created {
            #[serde(deserialize_with = "crate::models::lenient::i64_from_any")]
            product_id: i64,
        }

        let draft = draft.validate()?;
        let form = product_form(farmer_id, &draft, images)?.text("action", "create");
        let created: Created = decode(self.post_multipart("farmer/products.php", form).await?)?;
        info!(product_id = created.product_id, name = %draft.name, "Product created");
        Ok(created.product_id)
    }

    /// Overwrites a listing with `draft`, uploading any `images` with it.
    #[instrument(skip(self, draft, images))]
    pub async fn update_product(
        &self,
        farmer_id: i64,
        product_id: i64,
        draft: ProductDraft,
        images: &[ImageUpload],
    ) -> Result<()> {
        let draft = draft.validate()?;
        let form = product_form(farmer_id, &draft, images)?
            .text("action", "update")
            .text("product_id", product_id.to_string());
        self.post_multipart("farmer/products.php", form).await?;
        info!("Product updated");
        Ok(())
    }

    /// Removes a listing.
    #[instrument(skip(self))]
    pub async fn delete_product(&self, farmer_id: i64, product_id: i64) -> Result<()> {
        self.post_json(
            "farmer/products.php",
            &json!({"action": "delete", "farmer_id": farmer_id, "product_id": product_id}),
        )
        .await?;
        info!("Product deleted");
        Ok(())
    }

    /// Orders containing at least one of the farmer's products.
    #[instrument(skip(self))]
    pub async fn list_farmer_orders(&self, farmer_id: i64) -> Result<Vec<OrderSummary>> {
        decode_or_default(
            self.get("farmer/orders.php", &[("farmer_id", farmer_id.to_string())])
                .await?,
        )
    }

    /// Farmer-side fulfilment update, e.g. marking an order ready for pickup.
    #[instrument(skip(self))]
    pub async fn update_farmer_order_status(
        &self,
        farmer_id: i64,
        order_id: i64,
        status: OrderStatus,
    ) -> Result<()> {
        self.post_json(
            "farmer/orders.php",
            &json!({
                "action": "update_status",
                "farmer_id": farmer_id,
                "order_id": order_id,
                "status": status,
            }),
        )
        .await
        .map(drop)
    }

    /// Farm profile; `None` when the farmer has not filled it in.
    #[instrument(skip(self))]
    pub async fn get_farm_details(&self, farmer_id: i64) -> Result<Option<FarmDetails>> {
        decode_or_default(
            self.get("farmer/farm_details.php", &[("farmer_id", farmer_id.to_string())])
                .await?,
        )
    }

    /// Saves the farm profile.
    ///
    /// # Errors
    /// `Validation` when the farm name is blank; nothing is sent.
    #[instrument(skip(self, details), fields(farm_name = %details.farm_name))]
    pub async fn update_farm_details(&self, farmer_id: i64, details: &FarmDetails) -> Result<()> {
        if details.farm_name.trim().is_empty() {
            return Err(Error::Validation {
                message: "Farm name cannot be empty".to_string(),
            });
        }
        let mut body = serde_json::to_value(details)?;
        body["farmer_id"] = json!(farmer_id);
        self.post_json("farmer/farm_details.php", &body).await?;
        info!("Farm details updated");
        Ok(())
    }

    /// Newest first, as the backend orders them.
    #[instrument(skip(self))]
    pub async fn list_notifications(&self, farmer_id: i64) -> Result<Vec<Notification>> {
        decode_or_default(
            self.get("farmer/notifications.php", &[("farmer_id", farmer_id.to_string())])
                .await?,
        )
    }

    /// Marks one notification as read.
    #[instrument(skip(self))]
    pub async fn mark_notification_read(&self, notification_id: i64) -> Result<()> {
        self.post_json(
            "farmer/notifications.php",
            &json!({"action": "mark_read", "notification_id": notification_id}),
        )
        .await
        .map(drop)
    }
}
