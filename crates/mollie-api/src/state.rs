//! # Application State
//!
//! Shared state for the Axum application.
//! Contains the payment dispatcher, the webhook handler and configuration.

use mollie_client::{LoggingWebhookHandler, MollieClient, WebhookHandler};
use mollie_core::{BoxedPaymentGateway, PaymentDispatcher};
use std::net::SocketAddr;
use std::sync::Arc;

/// Application configuration
#[derive(Debug, Clone)]
pub struct AppConfig {
    /// Host to bind to
    pub host: String,
    /// Port to listen on
    pub port: u16,
    /// Public base URL for redirect and webhook callbacks
    pub public_base_url: Option<String>,
    /// Environment (development, staging, production)
    pub environment: String,
}

impl AppConfig {
    /// Load from environment variables
    pub fn from_env() -> Self {
        dotenvy::dotenv().ok();
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        Self {
            host: lookup("HOST").unwrap_or_else(|| "127.0.0.1".to_string()),
            port: lookup("PORT")
                .and_then(|p| p.parse().ok())
                .unwrap_or(8080),
            public_base_url: lookup("PUBLIC_BASE_URL")
                .map(|url| url.trim_end_matches('/').to_string())
                .filter(|url| !url.is_empty()),
            environment: lookup("ENVIRONMENT").unwrap_or_else(|| "development".to_string()),
        }
    }

    /// Get the socket address to bind to
    pub fn socket_addr(&self) -> anyhow::Result<SocketAddr> {
        format!("{}:{}", self.host, self.port)
            .parse()
            .map_err(|e| anyhow::anyhow!("Invalid socket address {}:{}: {}", self.host, self.port, e))
    }

    /// Check if running in production
    pub fn is_production(&self) -> bool {
        self.environment == "production"
    }

    /// Where the payer lands after checkout
    pub fn confirmed_url(&self, felloz_id: &str) -> Option<String> {
        self.public_base_url
            .as_ref()
            .map(|base| format!("{}/payment_confirmed/{}", base, felloz_id))
    }

    /// Where Mollie posts status changes
    pub fn update_url(&self, felloz_id: &str) -> Option<String> {
        self.public_base_url
            .as_ref()
            .map(|base| format!("{}/payment_update/{}", base, felloz_id))
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self::from_env()
    }
}

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    /// Mollie request dispatcher
    pub dispatcher: PaymentDispatcher,
    /// Receives checked payment updates from the webhook
    pub webhook_handler: Arc<dyn WebhookHandler>,
    /// Application config
    pub config: AppConfig,
}

impl AppState {
    /// Create a new AppState backed by the Mollie API
    pub fn new() -> anyhow::Result<Self> {
        let config = AppConfig::from_env();

        let client = MollieClient::from_env()
            .map_err(|e| anyhow::anyhow!("Failed to initialize Mollie: {}", e))?;

        tracing::info!(
            "Mollie client ready: test_mode={}, timeout={:?}",
            client.config().is_test_mode(),
            client.config().timeout
        );

        Ok(Self::with_gateway(Arc::new(client), config))
    }

    /// Create state around any gateway (used by tests)
    pub fn with_gateway(gateway: BoxedPaymentGateway, config: AppConfig) -> Self {
        Self {
            dispatcher: PaymentDispatcher::new(gateway),
            webhook_handler: Arc::new(LoggingWebhookHandler),
            config,
        }
    }

    /// Builder: replace the webhook handler
    pub fn with_webhook_handler(mut self, handler: Arc<dyn WebhookHandler>) -> Self {
        self.webhook_handler = handler;
        self
    }
}
