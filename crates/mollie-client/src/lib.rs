//! # mollie-client
//!
//! Mollie REST client for the payment integration.
//!
//! `MollieClient` implements `mollie_core::PaymentGateway`: it owns the API
//! key, the `testmode` switch and the request timeout, and hands raw JSON
//! replies to the dispatcher in `mollie-core`.
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use mollie_client::MollieClient;
//! use mollie_core::PaymentDispatcher;
//! use std::sync::Arc;
//!
//! // Create client from environment
//! let client = MollieClient::from_env()?;
//! let dispatcher = PaymentDispatcher::new(Arc::new(client));
//!
//! let response = dispatcher.create(&payment).await?;
//!
//! // Redirect user to response.checkout_url()
//! ```
//!
//! ## Webhook Handling
//!
//! ```rust,ignore
//! use mollie_client::webhook::{dispatch_payment_update, WebhookHandler};
//!
//! struct MyHandler;
//!
//! impl WebhookHandler for MyHandler {
//!     fn on_paid(&self, update: &PaymentUpdate) -> MollieResult<()> {
//!         // Fulfill the donation
//!         Ok(())
//!     }
//! }
//!
//! // In your webhook endpoint:
//! let update = dispatcher.check(&notification.id).await?;
//! dispatch_payment_update(&MyHandler, &update)?;
//! ```

pub mod client;
pub mod config;
pub mod webhook;

// Re-exports
pub use client::MollieClient;
pub use config::MollieConfig;
pub use webhook::{
    dispatch_payment_update, LoggingWebhookHandler, WebhookHandler, WebhookNotification,
};
