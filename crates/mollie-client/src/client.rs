//! # Mollie HTTP Client
//!
//! `PaymentGateway` implementation over the Mollie v2 REST API.

use crate::config::MollieConfig;
use async_trait::async_trait;
use mollie_core::{MollieError, MollieResult, PaymentGateway, PaymentPayload};
use reqwest::{Client, RequestBuilder};
use serde::Deserialize;
use serde_json::Value;
use tracing::{debug, error, instrument};

/// Mollie REST client
#[derive(Debug, Clone)]
pub struct MollieClient {
    config: MollieConfig,
    client: Client,
}

impl MollieClient {
    pub fn new(config: MollieConfig) -> MollieResult<Self> {
        let client = Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| {
                MollieError::Configuration(format!("Failed to create HTTP client: {}", e))
            })?;

        Ok(Self { config, client })
    }

    /// Create from environment variables
    pub fn from_env() -> MollieResult<Self> {
        Self::new(MollieConfig::from_env()?)
    }

    pub fn config(&self) -> &MollieConfig {
        &self.config
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{}", self.config.api_base_url, path)
    }

    /// Reads carry `testmode` as a query parameter
    fn read(&self, url: &str) -> RequestBuilder {
        let request = self.client.get(url);
        if self.config.test_mode {
            request.query(&[("testmode", "true")])
        } else {
            request
        }
    }

    async fn send(&self, request: RequestBuilder) -> MollieResult<Value> {
        let response = request
            .header("Authorization", self.config.auth_header())
            .send()
            .await
            .map_err(transport_error)?;

        let status = response.status();
        let body = response.text().await.map_err(transport_error)?;

        if !status.is_success() {
            error!("Mollie API error: status={}, body={}", status, body);

            let message = match serde_json::from_str::<MollieErrorResponse>(&body) {
                Ok(parsed) => parsed.message(),
                Err(_) => format!("HTTP {}: {}", status, body),
            };

            return Err(MollieError::Gateway {
                status: Some(status.as_u16()),
                message,
            });
        }

        serde_json::from_str(&body).map_err(|e| {
            MollieError::malformed(format!("Failed to parse Mollie response: {}", e))
        })
    }
}

#[async_trait]
impl PaymentGateway for MollieClient {
    #[instrument(skip(self, payload), fields(felloz_id = payload.felloz_id().unwrap_or_default()))]
    async fn create_payment(&self, payload: &PaymentPayload) -> MollieResult<Value> {
        let mut body = payload.to_value()?;
        if self.config.test_mode {
            if let Some(map) = body.as_object_mut() {
                map.insert("testmode".to_string(), Value::Bool(true));
            }
        }

        debug!("Creating Mollie payment: amount={}", payload.amount);

        let request = self.client.post(self.url("payments")).json(&body);
        self.send(request).await
    }

    #[instrument(skip(self))]
    async fn get_payment(&self, payment_id: &str) -> MollieResult<Value> {
        if !is_valid_payment_id(payment_id) {
            return Err(MollieError::validation(format!(
                "Invalid payment id: {:?}",
                payment_id
            )));
        }

        let url = self.url(&format!("payments/{}", payment_id));
        self.send(self.read(&url)).await
    }

    #[instrument(skip(self))]
    async fn list_methods(&self) -> MollieResult<Value> {
        let request = self.read(&self.url("methods")).query(&[("include", "pricing")]);
        self.send(request).await
    }
}

/// Gateway ids look like `tr_WDqYK6vllg`
fn is_valid_payment_id(payment_id: &str) -> bool {
    !payment_id.is_empty()
        && payment_id
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '_')
}

fn transport_error(err: reqwest::Error) -> MollieError {
    if err.is_timeout() {
        MollieError::transport(format!("request timed out: {}", err))
    } else {
        MollieError::transport(err.to_string())
    }
}

// =============================================================================
// Mollie API Types
// =============================================================================

/// Error body, `application/hal+json`
#[derive(Debug, Deserialize)]
struct MollieErrorResponse {
    #[serde(default)]
    title: Option<String>,
    #[serde(default)]
    detail: Option<String>,
    #[serde(default)]
    field: Option<String>,
}

impl MollieErrorResponse {
    fn message(self) -> String {
        let text = self
            .detail
            .or(self.title)
            .unwrap_or_else(|| "Unknown error".to_string());
        match self.field {
            Some(field) => format!("{} (field: {})", text, field),
            None => text,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_message_prefers_detail() {
        let parsed: MollieErrorResponse = serde_json::from_str(
            r#"{"status":422,"title":"Unprocessable Entity","detail":"The amount is higher than the maximum","field":"amount"}"#,
        )
        .unwrap();
        assert_eq!(
            parsed.message(),
            "The amount is higher than the maximum (field: amount)"
        );

        let parsed: MollieErrorResponse =
            serde_json::from_str(r#"{"status":401,"title":"Unauthorized Request"}"#).unwrap();
        assert_eq!(parsed.message(), "Unauthorized Request");
    }

    #[test]
    fn test_payment_id_shape() {
        assert!(is_valid_payment_id("tr_WDqYK6vllg"));
        assert!(!is_valid_payment_id(""));
        assert!(!is_valid_payment_id("tr_1/../methods"));
        assert!(!is_valid_payment_id("tr_1?testmode=false"));
        assert!(!is_valid_payment_id("tr_1#fragment"));
    }

    #[tokio::test]
    async fn test_get_payment_rejects_bad_id_without_request() {
        let config = MollieConfig::new("test_abc")
            .unwrap()
            .with_api_base_url("http://127.0.0.1:9/v2");
        let client = MollieClient::new(config).unwrap();

        let err = client.get_payment("tr_1?include=details").await.unwrap_err();
        assert!(matches!(err, MollieError::Validation(_)));
    }

    #[test]
    fn test_url_joining() {
        let config = MollieConfig::new("test_abc")
            .unwrap()
            .with_api_base_url("http://localhost:1234/v2/");
        let client = MollieClient::new(config).unwrap();
        assert_eq!(client.url("payments"), "http://localhost:1234/v2/payments");
    }
}
