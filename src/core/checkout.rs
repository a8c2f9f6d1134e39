//! Checkout orchestration - Cart → order → payment → pickup → feedback.
//!
//! [`CheckoutFlow`] is a state machine driven by the presentation layer. Each step
//! consumes the previous step's output (order id, then payment id), so steps run
//! strictly in sequence. Failures return an error and leave the flow in a state from
//! which the same step can be retried; nothing already created on the server is
//! rolled back.
//!
//! The cart is cleared as soon as the order exists, before payment is confirmed. A
//! failed payment therefore leaves the cart empty; the order itself still exists
//! server-side and can be paid by retrying [`CheckoutFlow::pay`].

use crate::{
    client::MarketApi,
    config::PickupConfig,
    core::{cart::CartStore, listing, payment_records},
    errors::{Error, Result},
    models::{
        CardDetails, CreateOrderRequest, FeedbackRequest, OrderStatus, PaymentMethod,
        PaymentRecord, PaymentRequest, PaymentStatus, PickupDetails, PlacedOrder,
        ScheduledPickup, SchedulePickupRequest, UserSession,
    },
};
use chrono::{Days, NaiveDate, Utc};
use sea_orm::DatabaseConnection;
use std::fmt;
use tracing::{debug, error, info, warn};

/// Where a [`CheckoutFlow`] currently is.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CheckoutState {
    /// Looking at the catalog; the starting state
    Browsing,
    /// Cart screen open
    CartOpen,
    /// Order creation in flight
    CheckingOut,
    /// Order exists and awaits payment
    PaymentPending,
    /// Payment accepted or recorded as pending (cash on pickup)
    PaymentSucceeded,
    /// Choosing a pickup date
    PickupScheduling,
    /// Paid, with the pickup booked or declined
    Complete,
    /// Last payment attempt failed; `pay` may be retried
    PaymentFailed,
    /// Last scheduling attempt failed; `schedule_pickup` may be retried
    PickupFailed,
}

impl fmt::Display for CheckoutState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Browsing => "browsing",
            Self::CartOpen => "cart open",
            Self::CheckingOut => "checking out",
            Self::PaymentPending => "payment pending",
            Self::PaymentSucceeded => "payment succeeded",
            Self::PickupScheduling => "pickup scheduling",
            Self::Complete => "complete",
            Self::PaymentFailed => "payment failed",
            Self::PickupFailed => "pickup failed",
        };
        f.write_str(name)
    }
}

/// Drives one purchase from cart to feedback against a [`MarketApi`].
///
/// Steps called from the wrong state fail with `InvalidTransition` and change nothing.
pub struct CheckoutFlow<A> {
    api: A,
    db: DatabaseConnection,
    pickup_config: PickupConfig,
    state: CheckoutState,
    customer: Option<UserSession>,
    order: Option<PlacedOrder>,
    payment: Option<PaymentRecord>,
    record_saved: bool,
    scheduled_pickup: Option<ScheduledPickup>,
    feedback_sent: bool,
}

impl<A: MarketApi> CheckoutFlow<A> {
    /// Flow in `Browsing` with nothing selected.
    #[must_use]
    pub const fn new(api: A, db: DatabaseConnection, pickup_config: PickupConfig) -> Self {
        Self {
            api,
            db,
            pickup_config,
            state: CheckoutState::Browsing,
            customer: None,
            order: None,
            payment: None,
            record_saved: false,
            scheduled_pickup: None,
            feedback_sent: false,
        }
    }

    /// Current state.
    #[must_use]
    pub const fn state(&self) -> CheckoutState {
        self.state
    }

    /// The backend this flow talks to.
    #[must_use]
    pub const fn api(&self) -> &A {
        &self.api
    }

    /// The order created by this flow, once `checkout` succeeded.
    #[must_use]
    pub const fn order(&self) -> Option<PlacedOrder> {
        self.order
    }

    /// The payment made in this flow, or loaded when resuming.
    #[must_use]
    pub const fn payment(&self) -> Option<&PaymentRecord> {
        self.payment.as_ref()
    }

    /// Whether the current payment is stored locally, so a later session can
    /// resume pickup scheduling for the order.
    #[must_use]
    pub const fn payment_record_saved(&self) -> bool {
        self.payment.is_some() && self.record_saved
    }

    /// Pickup booked by `schedule_pickup`, if any.
    #[must_use]
    pub const fn scheduled_pickup(&self) -> Option<&ScheduledPickup> {
        self.scheduled_pickup.as_ref()
    }

    /// Browsing → `CartOpen`.
    pub fn open_cart(&mut self) -> Result<()> {
        self.require(&[CheckoutState::Browsing], "open the cart")?;
        self.transition(CheckoutState::CartOpen);
        Ok(())
    }

    /// `CartOpen` → Browsing.
    pub fn close_cart(&mut self) -> Result<()> {
        self.require(&[CheckoutState::CartOpen], "close the cart")?;
        self.transition(CheckoutState::Browsing);
        Ok(())
    }

    /// Creates the order for everything in `cart`.
    ///
    /// On success the cart is cleared immediately and the flow waits for payment.
    ///
    /// # Errors
    /// - `EmptyCart` / `NotAuthenticated`: nothing is sent, state and cart are unchanged
    /// - any network error from order creation: the flow returns to `CartOpen` with
    ///   the cart intact
    pub async fn checkout(
        &mut self,
        cart: &mut CartStore,
        session: Option<&UserSession>,
        notes: Option<String>,
    ) -> Result<PlacedOrder> {
        self.require(&[CheckoutState::CartOpen], "check out")?;
        if cart.is_empty() {
            return Err(Error::EmptyCart);
        }
        let Some(session) = session else {
            info!("Checkout attempted without a logged-in user");
            return Err(Error::NotAuthenticated);
        };

        self.transition(CheckoutState::CheckingOut);
        let total = cart.total_price();
        let request = CreateOrderRequest {
            items: cart.order_items(),
            pickup_details: PickupDetails {
                location: self.pickup_config.location.clone(),
                preferred_date: None,
                notes,
            },
            user_id: session.user_id,
        };

        let created = match self.api.create_order(&request).await {
            Ok(created) => created,
            Err(e) => {
                error!("Order creation failed: {}", e);
                self.transition(CheckoutState::CartOpen);
                return Err(e);
            }
        };

        let order = PlacedOrder {
            order_id: created.order_id,
            total,
        };
        info!(order_id = order.order_id, total = order.total, "Order placed");

        // Cleared before payment; see module docs.
        if let Err(e) = cart.clear_cart().await {
            warn!("Could not erase saved cart after order creation: {}", e);
        }

        self.customer = Some(session.clone());
        self.order = Some(order);
        self.payment = None;
        self.record_saved = false;
        self.scheduled_pickup = None;
        self.feedback_sent = false;
        self.transition(CheckoutState::PaymentPending);
        Ok(order)
    }

    /// Pays for the current order.
    ///
    /// A successful payment is recorded locally under the order id. Paid (not
    /// merely pending) orders are then marked confirmed; that update is best effort.
    /// If the local record cannot be written the payment still succeeds, but
    /// [`payment_record_saved`](Self::payment_record_saved) stays false until
    /// [`save_payment_record`](Self::save_payment_record) succeeds.
    ///
    /// # Errors
    /// - `Validation` when card details are missing or malformed; state unchanged
    /// - `PaymentDeclined` when the server reports the payment as failed
    /// - any network error; the flow moves to `PaymentFailed` and `pay` may be retried
    pub async fn pay(
        &mut self,
        method: PaymentMethod,
        card: Option<CardDetails>,
    ) -> Result<PaymentRecord> {
        self.require(
            &[CheckoutState::PaymentPending, CheckoutState::PaymentFailed],
            "pay",
        )?;
        let (order, customer) = self.current_order()?;

        let card_details = if method.requires_card() {
            let card = card.ok_or_else(|| Error::Validation {
                message: "Card details are required for card payments".to_string(),
            })?;
            card.validate()?;
            Some(card)
        } else {
            None
        };

        let request = PaymentRequest {
            order_id: order.order_id,
            payment_method: method,
            user_id: customer.user_id,
            amount: order.total,
            card_details,
        };

        let receipt = match self.api.process_payment(&request).await {
            Ok(receipt) if receipt.payment_status == PaymentStatus::Failed => {
                warn!(payment_id = %receipt.payment_id, "Payment reported as failed");
                self.transition(CheckoutState::PaymentFailed);
                return Err(Error::PaymentDeclined {
                    payment_id: receipt.payment_id,
                    status: receipt.payment_status.to_string(),
                });
            }
            Ok(receipt) => receipt,
            Err(e) => {
                error!(order_id = order.order_id, "Payment failed: {}", e);
                self.transition(CheckoutState::PaymentFailed);
                return Err(e);
            }
        };

        let record = PaymentRecord {
            payment_id: receipt.payment_id,
            status: receipt.payment_status,
            timestamp: Utc::now(),
        };
        self.payment = Some(record.clone());
        self.record_saved = false;
        if let Err(e) = self.save_payment_record().await {
            warn!(order_id = order.order_id, "Could not save local payment record: {}", e);
        }
        self.transition(CheckoutState::PaymentSucceeded);

        if record.status == PaymentStatus::Completed {
            if let Err(e) = self
                .api
                .update_order_status(order.order_id, OrderStatus::Confirmed)
                .await
            {
                warn!(order_id = order.order_id, "Could not mark order confirmed: {}", e);
            }
        }

        Ok(record)
    }

    /// Stores the current payment locally if it is not stored yet.
    ///
    /// # Errors
    /// `Database` when the write fails; the flow state is unchanged.
    pub async fn save_payment_record(&mut self) -> Result<()> {
        if self.record_saved {
            return Ok(());
        }
        let (order, _) = self.current_order()?;
        let payment = self.payment.as_ref().ok_or(Error::MissingPaymentRecord {
            order_id: order.order_id,
        })?;
        payment_records::save_payment_record(&self.db, order.order_id, payment).await?;
        self.record_saved = true;
        Ok(())
    }

    /// Offers pickup scheduling after a successful payment.
    pub fn begin_pickup_scheduling(&mut self) -> Result<()> {
        self.require(&[CheckoutState::PaymentSucceeded], "schedule a pickup")?;
        self.transition(CheckoutState::PickupScheduling);
        Ok(())
    }

    /// Re-enters pickup scheduling for an order paid in an earlier session.
    ///
    /// The order must have a local payment record.
    pub async fn resume_pickup_scheduling(
        &mut self,
        order: PlacedOrder,
        session: &UserSession,
    ) -> Result<()> {
        self.require(
            &[CheckoutState::Browsing, CheckoutState::Complete],
            "resume pickup scheduling",
        )?;
        let record = payment_records::load_payment_record(&self.db, order.order_id)
            .await?
            .ok_or(Error::MissingPaymentRecord {
                order_id: order.order_id,
            })?;
        self.customer = Some(session.clone());
        self.order = Some(order);
        self.payment = Some(record);
        self.record_saved = true;
        self.scheduled_pickup = None;
        self.feedback_sent = false;
        self.transition(CheckoutState::PickupScheduling);
        Ok(())
    }

    /// Dates offered for pickup: the configured number of days, starting tomorrow.
    #[must_use]
    pub fn pickup_dates(&self, today: NaiveDate) -> Vec<NaiveDate> {
        (1..=u64::from(self.pickup_config.window_days))
            .filter_map(|offset| today.checked_add_days(Days::new(offset)))
            .collect()
    }

    /// Books a pickup at the market office on `date`.
    ///
    /// `today` must be the day passed to [`pickup_dates`](Self::pickup_dates) when
    /// the choices were offered. A payment record that failed to save during `pay`
    /// is written first.
    ///
    /// # Errors
    /// - `Validation` when `date` is outside the offered window; state unchanged
    /// - `MissingPaymentRecord` when the order has no payment
    /// - `Database` when the payment record still cannot be saved; state unchanged
    /// - any network error; the flow moves to `PickupFailed`
    pub async fn schedule_pickup(
        &mut self,
        date: NaiveDate,
        notes: &str,
        today: NaiveDate,
    ) -> Result<ScheduledPickup> {
        self.require(
            &[CheckoutState::PickupScheduling, CheckoutState::PickupFailed],
            "schedule a pickup",
        )?;
        let (order, _) = self.current_order()?;
        let payment_id = self
            .payment
            .as_ref()
            .map(|payment| payment.payment_id.clone())
            .ok_or(Error::MissingPaymentRecord {
                order_id: order.order_id,
            })?;

        if !self.pickup_dates(today).contains(&date) {
            return Err(Error::Validation {
                message: format!(
                    "Pickup date must be within the next {} days",
                    self.pickup_config.window_days
                ),
            });
        }
        self.save_payment_record().await?;

        let request = SchedulePickupRequest::new(
            order.order_id,
            payment_id,
            date,
            notes.trim().to_string(),
        );
        match self.api.schedule_pickup(&request).await {
            Ok(scheduled) => {
                info!(order_id = order.order_id, %date, "Pickup booked");
                self.scheduled_pickup = Some(scheduled.clone());
                self.transition(CheckoutState::Complete);
                Ok(scheduled)
            }
            Err(e) => {
                error!(order_id = order.order_id, "Pickup scheduling failed: {}", e);
                self.transition(CheckoutState::PickupFailed);
                Err(e)
            }
        }
    }

    /// Finishes without booking a pickup.
    pub fn skip_pickup(&mut self) -> Result<()> {
        self.require(
            &[
                CheckoutState::PaymentSucceeded,
                CheckoutState::PickupScheduling,
                CheckoutState::PickupFailed,
            ],
            "skip pickup",
        )?;
        info!(order_id = ?self.order.map(|o| o.order_id), "Pickup left unscheduled");
        self.transition(CheckoutState::Complete);
        Ok(())
    }

    /// True once the flow is complete until feedback has been sent.
    #[must_use]
    pub fn should_prompt_feedback(&self) -> bool {
        self.state == CheckoutState::Complete && !self.feedback_sent
    }

    /// Sends a 1-5 rating with an optional comment for the completed order.
    ///
    /// # Errors
    /// - `InvalidTransition` before completion or once feedback was already sent
    /// - `Validation` for a rating outside 1-5
    pub async fn submit_feedback(&mut self, rating: u8, comment: &str) -> Result<()> {
        self.require(&[CheckoutState::Complete], "leave feedback")?;
        if self.feedback_sent {
            return Err(Error::InvalidTransition {
                state: self.state,
                action: "leave feedback twice",
            });
        }
        let comment = listing::validate_feedback(rating, comment)?;
        let (order, customer) = self.current_order()?;
        let request = FeedbackRequest {
            order_id: order.order_id,
            user_id: customer.user_id,
            rating,
            comment,
        };
        self.api.submit_feedback(&request).await?;
        self.feedback_sent = true;
        info!(order_id = order.order_id, rating, "Feedback submitted");
        Ok(())
    }

    /// Starts over. Server-side order, payment and pickup are left as they are.
    pub fn reset(&mut self) {
        self.customer = None;
        self.order = None;
        self.payment = None;
        self.record_saved = false;
        self.scheduled_pickup = None;
        self.feedback_sent = false;
        self.transition(CheckoutState::Browsing);
    }

    fn current_order(&self) -> Result<(PlacedOrder, UserSession)> {
        match (self.order, &self.customer) {
            (Some(order), Some(customer)) => Ok((order, customer.clone())),
            _ => Err(Error::InvalidTransition {
                state: self.state,
                action: "continue without an order",
            }),
        }
    }

    fn require(&self, allowed: &[CheckoutState], action: &'static str) -> Result<()> {
        if allowed.contains(&self.state) {
            Ok(())
        } else {
            Err(Error::InvalidTransition {
                state: self.state,
                action,
            })
        }
    }

    fn transition(&mut self, to: CheckoutState) {
        debug!(from = %self.state, %to, "Checkout transition");
        self.state = to;
    }
}
