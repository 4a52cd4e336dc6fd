//! # Gateway Trait
//!
//! The I/O seam between the value objects and the payment gateway.
//!
//! ```text
//! ┌──────────────┐  payload()   ┌───────────────────┐  raw JSON   ┌──────────────────┐
//! │   Payment    │ ───────────▶ │ PaymentDispatcher │ ◀─────────▶ │ PaymentGateway   │
//! └──────────────┘              │                   │             │  (trait)         │
//!                               │ PaymentResponse   │             └────────▲─────────┘
//!                               │ PaymentUpdate     │                      │
//!                               │ Methods           │             ┌────────┴─────────┐
//!                               └───────────────────┘             │  MollieClient    │
//!                                                                 │  (reqwest)       │
//!                                                                 └──────────────────┘
//! ```
//!
//! Implementations own authentication, timeouts and transport errors.
//! The dispatcher owns turning replies into typed values.

use crate::error::MollieResult;
use crate::methods::Methods;
use crate::payment::{Payment, PaymentPayload};
use crate::response::{PaymentResponse, PaymentUpdate};
use async_trait::async_trait;
use serde_json::Value;
use std::sync::Arc;
use tracing::{debug, info, instrument};

/// Raw request/response contract with the payment gateway.
#[async_trait]
pub trait PaymentGateway: Send + Sync {
    /// Create a payment and return the gateway's reply as-is.
    async fn create_payment(&self, payload: &PaymentPayload) -> MollieResult<Value>;

    /// Fetch one payment by gateway id (`tr_...`).
    async fn get_payment(&self, payment_id: &str) -> MollieResult<Value>;

    /// Fetch the listing of enabled payment methods.
    async fn list_methods(&self) -> MollieResult<Value>;

    /// Get the provider name (for logging).
    fn provider_name(&self) -> &'static str {
        "mollie"
    }
}

/// Type alias for a shared gateway (dynamic dispatch)
pub type BoxedPaymentGateway = Arc<dyn PaymentGateway>;

/// Sends requests through a gateway and parses what comes back
#[derive(Clone)]
pub struct PaymentDispatcher {
    gateway: BoxedPaymentGateway,
}

impl PaymentDispatcher {
    pub fn new(gateway: BoxedPaymentGateway) -> Self {
        Self { gateway }
    }

    pub fn gateway(&self) -> &BoxedPaymentGateway {
        &self.gateway
    }

    /// Create `payment` at the gateway
    #[instrument(skip(self, payment), fields(felloz_id = %payment.felloz_id()))]
    pub async fn create(&self, payment: &Payment) -> MollieResult<PaymentResponse> {
        let payload = payment.payload();
        debug!(
            "Creating {} payment: {}",
            self.gateway.provider_name(),
            payment
        );

        let reply = self.gateway.create_payment(&payload).await?;
        let response = PaymentResponse::from_reply(reply)?;

        info!(
            "Created payment: id={}, status={}, checkout={}",
            response.id(),
            response.status(),
            response.checkout_url()
        );
        Ok(response)
    }

    /// Look up the current state of a payment
    #[instrument(skip(self))]
    pub async fn check(&self, payment_id: &str) -> MollieResult<PaymentUpdate> {
        let reply = self.gateway.get_payment(payment_id).await?;
        let update = PaymentUpdate::from_reply(reply)?;
        debug!("Payment {} is {}", update.id, update.status);
        Ok(update)
    }

    /// Fetch and parse the method listing
    #[instrument(skip(self))]
    pub async fn methods(&self) -> MollieResult<Methods> {
        let reply = self.gateway.list_methods().await?;
        let methods = Methods::from_listing(&reply)?;
        debug!("Gateway offers {} methods", methods.len());
        Ok(methods)
    }
}
