//! # Mollie Configuration
//!
//! Configuration management for the Mollie integration.
//! The API key and the switches around it are loaded from environment variables.

use mollie_core::{MollieError, MollieResult};
use std::env;
use std::time::Duration;

pub const DEFAULT_API_BASE_URL: &str = "https://api.mollie.com/v2";
pub const DEFAULT_TIMEOUT_SECS: u64 = 10;

const KEY_PREFIXES: [&str; 3] = ["test_", "live_", "access_"];

/// Mollie API configuration
#[derive(Clone)]
pub struct MollieConfig {
    /// API key (test_..., live_...) or organization access token (access_...)
    pub api_key: String,

    /// Send `testmode` with every request
    pub test_mode: bool,

    /// Applied to every outbound call
    pub timeout: Duration,

    /// API base URL (for testing/mocking)
    pub api_base_url: String,
}

impl MollieConfig {
    /// Load configuration from environment variables.
    ///
    /// Required env vars:
    /// - `MOLLIE_API_KEY`
    ///
    /// Optional:
    /// - `MOLLIE_TEST` (defaults to true for `test_` keys)
    /// - `MOLLIE_TIMEOUT` in seconds
    /// - `MOLLIE_API_URL`
    pub fn from_env() -> MollieResult<Self> {
        dotenvy::dotenv().ok(); // Load .env file if present
        Self::from_lookup(|name| env::var(name).ok())
    }

    /// Load configuration through an arbitrary variable lookup
    pub fn from_lookup<F>(lookup: F) -> MollieResult<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let api_key = lookup("MOLLIE_API_KEY")
            .ok_or_else(|| MollieError::Configuration("MOLLIE_API_KEY not set".to_string()))?;

        let mut config = Self::new(api_key)?;

        if let Some(raw) = lookup("MOLLIE_TEST") {
            config.test_mode = parse_bool(&raw).ok_or_else(|| {
                MollieError::Configuration(format!("MOLLIE_TEST is not a boolean: {}", raw))
            })?;
        }

        if let Some(raw) = lookup("MOLLIE_TIMEOUT") {
            let secs: u64 = raw.trim().parse().map_err(|_| {
                MollieError::Configuration(format!("MOLLIE_TIMEOUT is not a number: {}", raw))
            })?;
            if secs == 0 {
                return Err(MollieError::Configuration(
                    "MOLLIE_TIMEOUT must be at least one second".to_string(),
                ));
            }
            config.timeout = Duration::from_secs(secs);
        }

        if let Some(url) = lookup("MOLLIE_API_URL") {
            config = config.with_api_base_url(url);
        }

        Ok(config)
    }

    /// Create config with an explicit key (for testing)
    pub fn new(api_key: impl Into<String>) -> MollieResult<Self> {
        let api_key = api_key.into();

        if !KEY_PREFIXES.iter().any(|prefix| api_key.starts_with(prefix)) {
            return Err(MollieError::Configuration(
                "MOLLIE_API_KEY must start with test_, live_ or access_".to_string(),
            ));
        }

        Ok(Self {
            test_mode: api_key.starts_with("test_"),
            api_key,
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            api_base_url: DEFAULT_API_BASE_URL.to_string(),
        })
    }

    pub fn is_test_mode(&self) -> bool {
        self.test_mode
    }

    /// Get authorization header value
    pub fn auth_header(&self) -> String {
        format!("Bearer {}", self.api_key)
    }

    /// Builder: set custom API base URL (for testing)
    pub fn with_api_base_url(mut self, url: impl Into<String>) -> Self {
        self.api_base_url = url.into().trim_end_matches('/').to_string();
        self
    }

    pub fn with_test_mode(mut self, enabled: bool) -> Self {
        self.test_mode = enabled;
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }
}

// The key never shows up in logs.
impl std::fmt::Debug for MollieConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MollieConfig")
            .field("api_key", &"***")
            .field("test_mode", &self.test_mode)
            .field("timeout", &self.timeout)
            .field("api_base_url", &self.api_base_url)
            .finish()
    }
}

fn parse_bool(raw: &str) -> Option<bool> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |name| vars.get(name).cloned()
    }

    #[test]
    fn test_key_validation() {
        let config = MollieConfig::new("test_dHar4XY7LxsDOtmnkVtjNVWXLSlXsM").unwrap();
        assert!(config.is_test_mode());

        let config = MollieConfig::new("live_dHar4XY7LxsDOtmnkVtjNVWXLSlXsM").unwrap();
        assert!(!config.is_test_mode());

        assert!(MollieConfig::new("access_abc").is_ok());
        assert!(MollieConfig::new("sk_test_abc").is_err());
    }

    #[test]
    fn test_auth_header() {
        let config = MollieConfig::new("test_abc123").unwrap();
        assert_eq!(config.auth_header(), "Bearer test_abc123");
        assert!(!format!("{:?}", config).contains("test_abc123"));
    }

    #[test]
    fn test_from_lookup_defaults() {
        let config = MollieConfig::from_lookup(lookup_from(&[("MOLLIE_API_KEY", "test_abc")])).unwrap();
        assert!(config.test_mode);
        assert_eq!(config.timeout, Duration::from_secs(DEFAULT_TIMEOUT_SECS));
        assert_eq!(config.api_base_url, DEFAULT_API_BASE_URL);
    }

    #[test]
    fn test_from_lookup_overrides() {
        let config = MollieConfig::from_lookup(lookup_from(&[
            ("MOLLIE_API_KEY", "live_abc"),
            ("MOLLIE_TEST", "yes"),
            ("MOLLIE_TIMEOUT", "3"),
            ("MOLLIE_API_URL", "http://localhost:9999/v2"),
        ]))
        .unwrap();
        assert!(config.test_mode);
        assert_eq!(config.timeout, Duration::from_secs(3));
        assert_eq!(config.api_base_url, "http://localhost:9999/v2");

        let config = MollieConfig::from_lookup(lookup_from(&[
            ("MOLLIE_API_KEY", "test_abc"),
            ("MOLLIE_API_URL", "https://api.mollie.com/v2/"),
        ]))
        .unwrap();
        assert_eq!(config.api_base_url, "https://api.mollie.com/v2");
    }

    #[test]
    fn test_from_lookup_errors() {
        assert!(matches!(
            MollieConfig::from_lookup(lookup_from(&[])),
            Err(MollieError::Configuration(_))
        ));
        assert!(MollieConfig::from_lookup(lookup_from(&[
            ("MOLLIE_API_KEY", "test_abc"),
            ("MOLLIE_TIMEOUT", "soon"),
        ]))
        .is_err());
        assert!(MollieConfig::from_lookup(lookup_from(&[
            ("MOLLIE_API_KEY", "test_abc"),
            ("MOLLIE_TEST", "maybe"),
        ]))
        .is_err());
    }
}
