//! # PayPal Configuration
//!
//! Configuration management for the PayPal integration.
//! All secrets are loaded from environment variables.

use shop_core::ShopError;
use std::env;

const SANDBOX_API_BASE_URL: &str = "https://api-m.sandbox.paypal.com";
const LIVE_API_BASE_URL: &str = "https://api-m.paypal.com";

/// PayPal REST API configuration
#[derive(Debug, Clone)]
pub struct PaypalConfig {
    /// OAuth2 client id
    pub client_id: String,

    /// OAuth2 client secret
    pub client_secret: String,

    /// API base URL (sandbox, live, or a mock for testing)
    pub api_base_url: String,
}

impl PaypalConfig {
    /// Load configuration from environment variables.
    ///
    /// Required env vars:
    /// - `PAYPAL_CLIENT_ID`
    /// - `PAYPAL_CLIENT_SECRET`
    ///
    /// Optional:
    /// - `PAYPAL_ENVIRONMENT` — `sandbox` (default) or `live`
    pub fn from_env() -> Result<Self, ShopError> {
        dotenvy::dotenv().ok(); // Load .env file if present

        let client_id = env::var("PAYPAL_CLIENT_ID")
            .map_err(|_| ShopError::Configuration("PAYPAL_CLIENT_ID not set".to_string()))?;

        let client_secret = env::var("PAYPAL_CLIENT_SECRET")
            .map_err(|_| ShopError::Configuration("PAYPAL_CLIENT_SECRET not set".to_string()))?;

        let environment =
            env::var("PAYPAL_ENVIRONMENT").unwrap_or_else(|_| "sandbox".to_string());

        let api_base_url = match environment.as_str() {
            "sandbox" => SANDBOX_API_BASE_URL.to_string(),
            "live" => LIVE_API_BASE_URL.to_string(),
            other => {
                return Err(ShopError::Configuration(format!(
                    "PAYPAL_ENVIRONMENT must be 'sandbox' or 'live', got '{other}'"
                )))
            }
        };

        Ok(Self {
            client_id,
            client_secret,
            api_base_url,
        })
    }

    /// Create config with explicit values (for testing)
    pub fn new(client_id: impl Into<String>, client_secret: impl Into<String>) -> Self {
        Self {
            client_id: client_id.into(),
            client_secret: client_secret.into(),
            api_base_url: SANDBOX_API_BASE_URL.to_string(),
        }
    }

    /// Check if pointed at the sandbox environment
    pub fn is_sandbox(&self) -> bool {
        self.api_base_url == SANDBOX_API_BASE_URL
    }

    /// Builder: set custom API base URL (for testing)
    pub fn with_api_base_url(mut self, url: impl Into<String>) -> Self {
        self.api_base_url = url.into();
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_environment_is_sandbox() {
        let config = PaypalConfig::new("client-id", "client-secret");
        assert!(config.is_sandbox());
        assert_eq!(config.api_base_url, SANDBOX_API_BASE_URL);
    }

    #[test]
    fn test_base_url_override() {
        let config =
            PaypalConfig::new("client-id", "client-secret").with_api_base_url("http://127.0.0.1:9");
        assert!(!config.is_sandbox());
        assert_eq!(config.api_base_url, "http://127.0.0.1:9");
    }
}
