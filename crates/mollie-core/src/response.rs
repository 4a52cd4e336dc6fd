//! # Payment Replies
//!
//! Typed views over the gateway's payment JSON: the full creation reply
//! (`PaymentResponse`) and the lighter status check used by the webhook
//! (`PaymentUpdate`).

use crate::amount::Amount;
use crate::error::{MollieError, MollieResult};
use crate::payment::FELLOZ_ID_KEY;
use crate::reply::{
    require_amount, require_nullable_string, require_object, require_str, require_string,
};
use chrono::{DateTime, FixedOffset};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Payment status as reported by the gateway
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PaymentStatus {
    Open,
    Pending,
    Authorized,
    Paid,
    Canceled,
    Expired,
    Failed,
    /// Anything the gateway adds later
    #[serde(untagged)]
    Unknown(String),
}

impl PaymentStatus {
    pub fn parse(status: &str) -> Self {
        match status {
            "open" => PaymentStatus::Open,
            "pending" => PaymentStatus::Pending,
            "authorized" => PaymentStatus::Authorized,
            "paid" => PaymentStatus::Paid,
            "canceled" => PaymentStatus::Canceled,
            "expired" => PaymentStatus::Expired,
            "failed" => PaymentStatus::Failed,
            other => PaymentStatus::Unknown(other.to_string()),
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            PaymentStatus::Open => "open",
            PaymentStatus::Pending => "pending",
            PaymentStatus::Authorized => "authorized",
            PaymentStatus::Paid => "paid",
            PaymentStatus::Canceled => "canceled",
            PaymentStatus::Expired => "expired",
            PaymentStatus::Failed => "failed",
            PaymentStatus::Unknown(s) => s,
        }
    }

    /// No further status changes are expected
    pub fn is_final(&self) -> bool {
        matches!(
            self,
            PaymentStatus::Paid
                | PaymentStatus::Canceled
                | PaymentStatus::Expired
                | PaymentStatus::Failed
        )
    }
}

impl std::fmt::Display for PaymentStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Parsed reply to a create-payment request
#[derive(Debug, Clone)]
pub struct PaymentResponse {
    id: String,
    felloz_id: String,
    amount: Amount,
    description: String,
    method: Option<String>,
    status: PaymentStatus,
    resource: String,
    mode: String,
    metadata: Map<String, Value>,
    expires_at: DateTime<FixedOffset>,
    checkout_url: String,
    dashboard_url: String,
    payment_metadata: Value,
}

impl PaymentResponse {
    /// Parse a gateway reply. Any missing or mistyped key is a `MalformedReply`.
    pub fn from_reply(reply: Value) -> MollieResult<Self> {
        let id = require_string(&reply, &["id"])?;
        let felloz_id = require_string(&reply, &["metadata", FELLOZ_ID_KEY])?;
        let amount = require_amount(&reply, &["amount"])?;
        let status = PaymentStatus::parse(require_str(&reply, &["status"])?);
        let description = require_string(&reply, &["description"])?;
        let method = require_nullable_string(&reply, &["method"])?;
        let resource = require_string(&reply, &["resource"])?;
        let mode = require_string(&reply, &["mode"])?;
        let metadata = require_object(&reply, &["metadata"])?.clone();
        let checkout_url = require_string(&reply, &["_links", "checkout", "href"])?;
        let dashboard_url = require_string(&reply, &["_links", "dashboard", "href"])?;

        let expires_raw = require_str(&reply, &["expiresAt"])?;
        let expires_at = DateTime::parse_from_rfc3339(expires_raw).map_err(|e| {
            MollieError::malformed(format!("'expiresAt' is not a timestamp ({}): {}", e, expires_raw))
        })?;

        Ok(Self {
            id,
            felloz_id,
            amount,
            description,
            method,
            status,
            resource,
            mode,
            metadata,
            expires_at,
            checkout_url,
            dashboard_url,
            payment_metadata: reply,
        })
    }

    /// Gateway payment id (`tr_...`)
    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn felloz_id(&self) -> &str {
        &self.felloz_id
    }

    pub fn amount(&self) -> &Amount {
        &self.amount
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn method(&self) -> Option<&str> {
        self.method.as_deref()
    }

    pub fn status(&self) -> &PaymentStatus {
        &self.status
    }

    pub fn resource(&self) -> &str {
        &self.resource
    }

    pub fn mode(&self) -> &str {
        &self.mode
    }

    pub fn metadata(&self) -> &Map<String, Value> {
        &self.metadata
    }

    pub fn expires_at(&self) -> DateTime<FixedOffset> {
        self.expires_at
    }

    /// Where to send the payer
    pub fn checkout_url(&self) -> &str {
        &self.checkout_url
    }

    pub fn dashboard_url(&self) -> &str {
        &self.dashboard_url
    }

    /// The untouched reply
    pub fn payment_metadata(&self) -> &Value {
        &self.payment_metadata
    }

    pub fn is_test_mode(&self) -> bool {
        self.mode == "test"
    }

    /// Flat mapping of every derived field
    pub fn to_object(&self) -> Value {
        serde_json::json!({
            "id": self.id,
            "felloz_id": self.felloz_id,
            "amount": self.amount,
            "description": self.description,
            "method": self.method,
            "status": self.status,
            "resource": self.resource,
            "mode": self.mode,
            "metadata": self.metadata,
            "expires_at": self.expires_at.to_rfc3339(),
            "checkout_url": self.checkout_url,
            "dashboard_url": self.dashboard_url,
            "payment_metadata": self.payment_metadata,
        })
    }
}

impl std::fmt::Display for PaymentResponse {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "PaymentResponse(#{}, F#{}, {}, status:{}, checkout:{})",
            self.id, self.felloz_id, self.amount, self.status, self.checkout_url
        )
    }
}

/// Result of checking a payment by gateway id
#[derive(Debug, Clone, Serialize)]
pub struct PaymentUpdate {
    pub id: String,
    pub status: PaymentStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub felloz_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub amount: Option<Amount>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub paid_at: Option<DateTime<FixedOffset>>,
    #[serde(skip)]
    pub raw: Value,
}

impl PaymentUpdate {
    /// Only `id` and `status` are required; the rest is best effort.
    pub fn from_reply(reply: Value) -> MollieResult<Self> {
        let id = require_string(&reply, &["id"])?;
        let status = PaymentStatus::parse(require_str(&reply, &["status"])?);

        let felloz_id = require_str(&reply, &["metadata", FELLOZ_ID_KEY])
            .ok()
            .map(str::to_string);
        let amount = require_amount(&reply, &["amount"]).ok();
        let paid_at = reply
            .get("paidAt")
            .and_then(|v| v.as_str())
            .and_then(|s| DateTime::parse_from_rfc3339(s).ok());

        Ok(Self {
            id,
            status,
            felloz_id,
            amount,
            paid_at,
            raw: reply,
        })
    }

    pub fn is_paid(&self) -> bool {
        self.status == PaymentStatus::Paid
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn creation_reply() -> Value {
        json!({
            "resource": "payment",
            "id": "tr_WDqYK6vllg",
            "mode": "test",
            "createdAt": "2018-03-20T13:13:37+00:00",
            "amount": {"value": "10.00", "currency": "EUR"},
            "description": "Order #12345",
            "method": null,
            "metadata": {"felloz_id": "abc123", "order_id": "12345"},
            "status": "open",
            "isCancelable": false,
            "expiresAt": "2018-03-20T13:28:37+00:00",
            "profileId": "pfl_QkEhN94Ba",
            "sequenceType": "oneoff",
            "redirectUrl": "https://webshop.example.org/order/12345/",
            "webhookUrl": "https://webshop.example.org/payments/webhook/",
            "_links": {
                "self": {"href": "https://api.mollie.com/v2/payments/tr_WDqYK6vllg", "type": "application/hal+json"},
                "checkout": {"href": "https://www.mollie.com/payscreen/select-method/WDqYK6vllg", "type": "text/html"},
                "dashboard": {"href": "https://www.mollie.com/dashboard/org_12345678/payments/tr_WDqYK6vllg", "type": "text/html"}
            }
        })
    }

    #[test]
    fn test_parse_creation_reply() {
        let response = PaymentResponse::from_reply(creation_reply()).unwrap();

        assert_eq!(response.id(), "tr_WDqYK6vllg");
        assert_eq!(response.felloz_id(), "abc123");
        assert_eq!(response.amount().value().as_deref(), Some("10.00"));
        assert_eq!(response.amount().currency(), "EUR");
        assert_eq!(response.status(), &PaymentStatus::Open);
        assert_eq!(response.method(), None);
        assert_eq!(response.resource(), "payment");
        assert!(response.is_test_mode());
        assert_eq!(response.metadata()["order_id"], "12345");
        assert_eq!(
            response.checkout_url(),
            "https://www.mollie.com/payscreen/select-method/WDqYK6vllg"
        );
        assert_eq!(response.expires_at().to_rfc3339(), "2018-03-20T13:28:37+00:00");
        assert_eq!(response.payment_metadata()["profileId"], "pfl_QkEhN94Ba");
    }

    #[test]
    fn test_missing_checkout_link_is_malformed() {
        let mut reply = creation_reply();
        reply["_links"].as_object_mut().unwrap().remove("checkout");

        let err = PaymentResponse::from_reply(reply).unwrap_err();
        assert!(matches!(err, MollieError::MalformedReply(_)));
        assert!(err.to_string().contains("_links.checkout"));
    }

    #[test]
    fn test_required_keys() {
        for key in ["id", "status", "description", "method", "resource", "mode", "expiresAt", "amount"] {
            let mut reply = creation_reply();
            reply.as_object_mut().unwrap().remove(key);
            assert!(
                matches!(PaymentResponse::from_reply(reply), Err(MollieError::MalformedReply(_))),
                "removing {} should fail",
                key
            );
        }

        let mut reply = creation_reply();
        reply["metadata"].as_object_mut().unwrap().remove("felloz_id");
        assert!(PaymentResponse::from_reply(reply).is_err());
    }

    #[test]
    fn test_bad_shapes_are_malformed() {
        let mut reply = creation_reply();
        reply["expiresAt"] = json!("next tuesday");
        assert!(matches!(
            PaymentResponse::from_reply(reply),
            Err(MollieError::MalformedReply(_))
        ));

        let mut reply = creation_reply();
        reply["amount"]["currency"] = json!("XXX");
        assert!(matches!(
            PaymentResponse::from_reply(reply),
            Err(MollieError::MalformedReply(_))
        ));

        let mut reply = creation_reply();
        reply["id"] = json!(42);
        assert!(PaymentResponse::from_reply(reply).is_err());
    }

    #[test]
    fn test_to_object() {
        let response = PaymentResponse::from_reply(creation_reply()).unwrap();
        let object = response.to_object();

        assert_eq!(object["felloz_id"], "abc123");
        assert_eq!(object["amount"], json!({"value": "10.00", "currency": "EUR"}));
        assert_eq!(object["status"], "open");
        assert_eq!(object["method"], Value::Null);
        assert_eq!(object["expires_at"], "2018-03-20T13:28:37+00:00");
        assert_eq!(
            object["dashboard_url"],
            "https://www.mollie.com/dashboard/org_12345678/payments/tr_WDqYK6vllg"
        );
    }

    #[test]
    fn test_status_parsing() {
        assert_eq!(PaymentStatus::parse("paid"), PaymentStatus::Paid);
        assert!(PaymentStatus::parse("expired").is_final());
        assert!(!PaymentStatus::parse("open").is_final());
        assert_eq!(
            PaymentStatus::parse("chargeback"),
            PaymentStatus::Unknown("chargeback".into())
        );
        assert_eq!(
            serde_json::to_value(PaymentStatus::Unknown("chargeback".into())).unwrap(),
            json!("chargeback")
        );
    }

    #[test]
    fn test_payment_update_is_lenient() {
        let update = PaymentUpdate::from_reply(json!({
            "id": "tr_WDqYK6vllg",
            "status": "paid",
            "paidAt": "2018-03-20T13:20:00+00:00"
        }))
        .unwrap();
        assert!(update.is_paid());
        assert!(update.felloz_id.is_none());
        assert!(update.amount.is_none());
        assert!(update.paid_at.is_some());

        let update = PaymentUpdate::from_reply(creation_reply()).unwrap();
        assert_eq!(update.felloz_id.as_deref(), Some("abc123"));
        assert!(update.amount.is_some());

        assert!(PaymentUpdate::from_reply(json!({"status": "paid"})).is_err());
    }
}
