//! reqwest implementation of [`MarketApi`] against the PHP backend.
//!
//! Every call goes through the same pipeline: connectivity pre-check, request under a
//! timeout that cancels the in-flight future, JSON parse, then classification.

use super::api::MarketApi;
use super::connectivity::{AlwaysOnline, Connectivity};
use super::response::{classify, decode, decode_or_default};
use crate::config::AppConfig;
use crate::core::retry::RetryPolicy;
use crate::errors::{Error, Result};
use crate::models::{
    Category, CreateOrderRequest, CreatedOrder, FeedbackRequest, OrderStatus, PaymentReceipt,
    PaymentRequest, Pickup, Product, ProductQuery, ScheduledPickup, SchedulePickupRequest,
    UpdateOrderStatusRequest,
};
use serde::Serialize;
use serde_json::Value;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, instrument};

/// [`MarketApi`] over HTTP against the PHP backend.
///
/// Every request checks connectivity first and is bounded by the configured timeout.
#[derive(Clone)]
pub struct HttpMarketClient {
    client: reqwest::Client,
    base_url: String,
    timeout: Duration,
    payment_retry: RetryPolicy,
    order_status_retry: RetryPolicy,
    connectivity: Arc<dyn Connectivity>,
}

impl std::fmt::Debug for HttpMarketClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HttpMarketClient")
            .field("base_url", &self.base_url)
            .field("timeout", &self.timeout)
            .field("payment_retry", &self.payment_retry)
            .field("order_status_retry", &self.order_status_retry)
            .finish_non_exhaustive()
    }
}

impl HttpMarketClient {
    /// Client with default retry policies and no connectivity check.
    ///
    /// # Errors
    /// Returns an error if the base URL does not parse or the TLS backend fails to
    /// initialise.
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self> {
        reqwest::Url::parse(base_url).map_err(|e| Error::Config {
            message: format!("Invalid API base URL {base_url:?}: {e}"),
        })?;
        let client = reqwest::Client::builder().build()?;
        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            timeout,
            payment_retry: RetryPolicy::fixed(3, Duration::from_secs(1)),
            order_status_retry: RetryPolicy::fixed(2, Duration::from_secs(1)),
            connectivity: Arc::new(AlwaysOnline),
        })
    }

    /// Client configured from the `[api]` and `[retry]` sections.
    pub fn from_config(config: &AppConfig) -> Result<Self> {
        Ok(Self::new(&config.api.base_url, config.api.request_timeout())?
            .with_payment_retry(config.retry.payment_policy())
            .with_order_status_retry(config.retry.order_status_policy()))
    }

    /// Consults `connectivity` before every request.
    #[must_use]
    pub fn with_connectivity(mut self, connectivity: Arc<dyn Connectivity>) -> Self {
        self.connectivity = connectivity;
        self
    }

    /// Policy for `process_payment`.
    #[must_use]
    pub const fn with_payment_retry(mut self, policy: RetryPolicy) -> Self {
        self.payment_retry = policy;
        self
    }

    /// Policy for `update_order_status`.
    #[must_use]
    pub const fn with_order_status_retry(mut self, policy: RetryPolicy) -> Self {
        self.order_status_retry = policy;
        self
    }

    /// Base URL without a trailing slash.
    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub(crate) fn url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path.trim_start_matches('/'))
    }

    pub(crate) fn ensure_online(&self) -> Result<()> {
        if self.connectivity.is_online() {
            Ok(())
        } else {
            debug!("Skipping request: device is offline");
            Err(Error::Offline)
        }
    }

    /// Sends a prepared request and returns the classified payload.
    pub(crate) async fn send(&self, request: reqwest::RequestBuilder) -> Result<Value> {
        self.ensure_online()?;
        let timeout = self.timeout;
        let exchange = async {
            let response = request.send().await?;
            let status = response.status().as_u16();
            let body = response.text().await?;
            Ok::<_, Error>((status, body))
        };
        let (status, body) = tokio::time::timeout(timeout, exchange)
            .await
            .map_err(|_| Error::Timeout { after: timeout })??;
        debug!(status, body_len = body.len(), "Received response");
        classify(status, &body)
    }

    pub(crate) async fn get(&self, path: &str, query: &[(&str, String)]) -> Result<Value> {
        let request = self.client.get(self.url(path)).query(query);
        self.send(request).await
    }

    pub(crate) async fn post_json<B: Serialize + ?Sized>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<Value> {
        let request = self.client.post(self.url(path)).json(body);
        self.send(request).await
    }

    pub(crate) async fn post_multipart(
        &self,
        path: &str,
        form: reqwest::multipart::Form,
    ) -> Result<Value> {
        let request = self.client.post(self.url(path)).multipart(form);
        self.send(request).await
    }
}

impl MarketApi for HttpMarketClient {
    #[instrument(skip(self))]
    async fn get_products(&self, query: &ProductQuery) -> Result<Vec<Product>> {
        let products: Vec<Product> =
            decode_or_default(self.get("market.php", &query.to_params()).await?)?;
        debug!(count = products.len(), "Fetched products");
        Ok(products)
    }

    #[instrument(skip(self))]
    async fn get_categories(&self) -> Result<Vec<Category>> {
        decode(
            self.get("market.php", &[("categories", "true".to_string())])
                .await?,
        )
    }

    #[instrument(skip(self, request), fields(user_id = request.user_id, items = request.items.len()))]
    async fn create_order(&self, request: &CreateOrderRequest) -> Result<CreatedOrder> {
        let created: CreatedOrder = decode(self.post_json("order.php", request).await?)?;
        info!(order_id = created.order_id, "Order created");
        Ok(created)
    }

    #[instrument(skip(self, request), fields(order_id = request.order_id, method = ?request.payment_method))]
    async fn process_payment(&self, request: &PaymentRequest) -> Result<PaymentReceipt> {
        let receipt: PaymentReceipt = self
            .payment_retry
            .run("process_payment", |attempt| async move {
                debug!(attempt, "Submitting payment");
                decode(self.post_json("payment.php", request).await?)
            })
            .await?;
        info!(payment_id = %receipt.payment_id, status = %receipt.payment_status, "Payment processed");
        Ok(receipt)
    }

    #[instrument(skip(self))]
    async fn update_order_status(&self, order_id: i64, status: OrderStatus) -> Result<()> {
        let body = UpdateOrderStatusRequest::new(order_id, status);
        self.order_status_retry
            .run("update_order_status", |attempt| {
                let body = &body;
                async move {
                    debug!(attempt, "Updating order status");
                    self.post_json("order.php", body).await.map(drop)
                }
            })
            .await
    }

    #[instrument(skip(self, request), fields(order_id = request.order_id, date = %request.pickup_date))]
    async fn schedule_pickup(&self, request: &SchedulePickupRequest) -> Result<ScheduledPickup> {
        let scheduled: ScheduledPickup =
            decode_or_default(self.post_json("pickup.php", request).await?)?;
        info!(pickup_id = ?scheduled.pickup_id, "Pickup scheduled");
        Ok(scheduled)
    }

    #[instrument(skip(self))]
    async fn get_user_pickups(&self, user_id: i64) -> Result<Vec<Pickup>> {
        decode_or_default(
            self.get("pickup.php", &[("user_id", user_id.to_string())])
                .await?,
        )
    }

    #[instrument(skip(self, request), fields(order_id = request.order_id, rating = request.rating))]
    async fn submit_feedback(&self, request: &FeedbackRequest) -> Result<()> {
        self.post_json("feedback.php", request).await.map(drop)
    }
}
