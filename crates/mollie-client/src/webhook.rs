//! # Mollie Webhook Handling
//!
//! Mollie calls the webhook URL with only the payment id (`id=tr_...`).
//! The payment is then fetched again and its status routed to a handler.

use mollie_core::{MollieResult, PaymentStatus, PaymentUpdate};
use serde::Deserialize;
use tracing::{debug, info, warn};

/// Form body Mollie posts to the webhook URL
#[derive(Debug, Clone, Deserialize)]
pub struct WebhookNotification {
    pub id: String,
}

/// Webhook event handler trait
///
/// Implement this trait to react to payment status changes.
#[allow(unused_variables)]
pub trait WebhookHandler: Send + Sync {
    /// Called when a payment is paid
    fn on_paid(&self, update: &PaymentUpdate) -> MollieResult<()> {
        info!(
            "Payment paid: id={}, felloz_id={:?}",
            update.id, update.felloz_id
        );
        Ok(())
    }

    fn on_failed(&self, update: &PaymentUpdate) -> MollieResult<()> {
        warn!("Payment failed: {}", update.id);
        Ok(())
    }

    fn on_canceled(&self, update: &PaymentUpdate) -> MollieResult<()> {
        info!("Payment canceled: {}", update.id);
        Ok(())
    }

    fn on_expired(&self, update: &PaymentUpdate) -> MollieResult<()> {
        info!("Payment expired: {}", update.id);
        Ok(())
    }

    fn on_authorized(&self, update: &PaymentUpdate) -> MollieResult<()> {
        info!("Payment authorized: {}", update.id);
        Ok(())
    }

    /// Called for `open` and `pending`, which are not final
    fn on_in_progress(&self, update: &PaymentUpdate) -> MollieResult<()> {
        debug!("Payment {} still {}", update.id, update.status);
        Ok(())
    }

    /// Called for statuses this crate does not know
    fn on_unknown(&self, update: &PaymentUpdate) -> MollieResult<()> {
        debug!("Unhandled payment status: {}", update.status);
        Ok(())
    }
}

/// Default webhook handler (just logs updates)
pub struct LoggingWebhookHandler;

impl WebhookHandler for LoggingWebhookHandler {}

/// Dispatch a payment update to the appropriate handler method
pub fn dispatch_payment_update(
    handler: &dyn WebhookHandler,
    update: &PaymentUpdate,
) -> MollieResult<()> {
    match &update.status {
        PaymentStatus::Paid => handler.on_paid(update),
        PaymentStatus::Failed => handler.on_failed(update),
        PaymentStatus::Canceled => handler.on_canceled(update),
        PaymentStatus::Expired => handler.on_expired(update),
        PaymentStatus::Authorized => handler.on_authorized(update),
        PaymentStatus::Open | PaymentStatus::Pending => handler.on_in_progress(update),
        PaymentStatus::Unknown(_) => handler.on_unknown(update),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[derive(Default)]
    struct CountingHandler {
        paid: AtomicUsize,
        other: AtomicUsize,
    }

    impl WebhookHandler for CountingHandler {
        fn on_paid(&self, _update: &PaymentUpdate) -> MollieResult<()> {
            self.paid.fetch_add(1, Ordering::SeqCst);
            Ok(())
        }

        fn on_unknown(&self, _update: &PaymentUpdate) -> MollieResult<()> {
            self.other.fetch_add(1, Ordering::SeqCst);
            Ok(())
        }
    }

    fn update(status: &str) -> PaymentUpdate {
        PaymentUpdate::from_reply(json!({
            "id": "tr_WDqYK6vllg",
            "status": status,
            "metadata": {"felloz_id": "abc123"}
        }))
        .unwrap()
    }

    #[test]
    fn test_dispatch_routes_by_status() {
        let handler = CountingHandler::default();

        dispatch_payment_update(&handler, &update("paid")).unwrap();
        dispatch_payment_update(&handler, &update("open")).unwrap();
        dispatch_payment_update(&handler, &update("chargeback")).unwrap();

        assert_eq!(handler.paid.load(Ordering::SeqCst), 1);
        assert_eq!(handler.other.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_notification_form() {
        let parsed: WebhookNotification = serde_json::from_value(json!({"id": "tr_abc"})).unwrap();
        assert_eq!(parsed.id, "tr_abc");
        dispatch_payment_update(&LoggingWebhookHandler, &update("expired")).unwrap();
    }
}
