//! # PayPal Orders v2
//!
//! Implementation of order creation and capture against the PayPal
//! Orders v2 API. Authentication uses an OAuth2 client-credentials token,
//! cached until shortly before expiry.

use crate::config::PaypalConfig;
use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use reqwest::Client;
use serde::Deserialize;
use serde_json::json;
use shop_core::{
    Capture, Currency, PaymentGateway, Price, ProviderOrder, ShippingAddress, ShopError,
    ShopResult,
};
use tokio::sync::RwLock;
use tracing::{debug, error, info, instrument};

const PROVIDER: &str = "paypal";

/// Refresh the token this long before the provider-reported expiry
const TOKEN_EXPIRY_SLACK_SECS: i64 = 60;

/// PayPal payment gateway
pub struct PaypalGateway {
    config: PaypalConfig,
    client: Client,
    token: RwLock<Option<CachedToken>>,
}

#[derive(Clone)]
struct CachedToken {
    access_token: String,
    expires_at: DateTime<Utc>,
}

impl PaypalGateway {
    /// Create a new gateway from explicit configuration
    pub fn new(config: PaypalConfig) -> Self {
        let client = Client::builder()
            .timeout(std::time::Duration::from_secs(30))
            .build()
            .expect("Failed to create HTTP client");

        Self {
            config,
            client,
            token: RwLock::new(None),
        }
    }

    /// Create from environment variables
    pub fn from_env() -> ShopResult<Self> {
        let config = PaypalConfig::from_env()?;
        Ok(Self::new(config))
    }

    /// Return a valid access token, fetching a fresh one when the cached
    /// token is absent or about to expire.
    async fn access_token(&self) -> ShopResult<String> {
        if let Some(token) = self.token.read().await.as_ref() {
            if token.expires_at > Utc::now() {
                return Ok(token.access_token.clone());
            }
        }

        let url = format!("{}/v1/oauth2/token", self.config.api_base_url);
        let response = self
            .client
            .post(&url)
            .basic_auth(&self.config.client_id, Some(&self.config.client_secret))
            .form(&[("grant_type", "client_credentials")])
            .send()
            .await
            .map_err(|e| ShopError::NetworkError(e.to_string()))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| ShopError::NetworkError(e.to_string()))?;

        if !status.is_success() {
            error!("PayPal token request failed: status={}, body={}", status, body);
            return Err(provider_error(&body, status.as_u16()));
        }

        let token: TokenResponse = serde_json::from_str(&body).map_err(|e| {
            ShopError::Serialization(format!("Failed to parse PayPal token response: {e}"))
        })?;

        debug!("Fetched PayPal access token, expires in {}s", token.expires_in);

        let cached = CachedToken {
            access_token: token.access_token.clone(),
            expires_at: Utc::now()
                + Duration::seconds((token.expires_in - TOKEN_EXPIRY_SLACK_SECS).max(0)),
        };
        *self.token.write().await = Some(cached);

        Ok(token.access_token)
    }

    async fn post_json(&self, url: &str, body: serde_json::Value) -> ShopResult<String> {
        let token = self.access_token().await?;

        let response = self
            .client
            .post(url)
            .bearer_auth(token)
            .json(&body)
            .send()
            .await
            .map_err(|e| ShopError::NetworkError(e.to_string()))?;

        let status = response.status();
        let text = response
            .text()
            .await
            .map_err(|e| ShopError::NetworkError(e.to_string()))?;

        if !status.is_success() {
            error!("PayPal API error: status={}, body={}", status, text);
            return Err(provider_error(&text, status.as_u16()));
        }

        Ok(text)
    }
}

#[async_trait]
impl PaymentGateway for PaypalGateway {
    #[instrument(skip(self, amount), fields(amount = %amount.display()))]
    async fn create_order(&self, amount: &Price) -> ShopResult<ProviderOrder> {
        if amount.amount <= 0 {
            return Err(ShopError::InvalidRequest(
                "payment amount must be positive".to_string(),
            ));
        }

        let request = json!({
            "intent": "CAPTURE",
            "purchase_units": [{
                "amount": {
                    "currency_code": amount.currency.to_string(),
                    "value": amount.to_decimal_string(),
                }
            }]
        });

        let url = format!("{}/v2/checkout/orders", self.config.api_base_url);
        let body = self.post_json(&url, request).await?;

        let created: CreateOrderResponse = serde_json::from_str(&body).map_err(|e| {
            ShopError::Serialization(format!("Failed to parse PayPal order response: {e}"))
        })?;

        info!("Created PayPal order: id={}, status={}", created.id, created.status);

        Ok(ProviderOrder {
            id: created.id,
            status: created.status,
        })
    }

    #[instrument(skip(self))]
    async fn capture_order(&self, provider_order_id: &str) -> ShopResult<Capture> {
        let url = format!(
            "{}/v2/checkout/orders/{}/capture",
            self.config.api_base_url, provider_order_id
        );
        let body = self.post_json(&url, json!({})).await?;

        let captured: CaptureOrderResponse = serde_json::from_str(&body).map_err(|e| {
            ShopError::Serialization(format!("Failed to parse PayPal capture response: {e}"))
        })?;

        info!(
            "Captured PayPal order: id={}, status={}",
            captured.id, captured.status
        );

        captured.into_capture()
    }

    fn provider_name(&self) -> &'static str {
        PROVIDER
    }
}

fn provider_error(body: &str, status: u16) -> ShopError {
    if let Ok(err) = serde_json::from_str::<ApiErrorResponse>(body) {
        if let Some(message) = err.message() {
            return ShopError::ProviderError {
                provider: PROVIDER.to_string(),
                message,
            };
        }
    }
    ShopError::ProviderError {
        provider: PROVIDER.to_string(),
        message: format!("HTTP {status}: {body}"),
    }
}

// =============================================================================
// PayPal API Types
// =============================================================================

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
    #[serde(default)]
    expires_in: i64,
}

#[derive(Debug, Deserialize)]
struct CreateOrderResponse {
    id: String,
    status: String,
}

#[derive(Debug, Deserialize)]
struct CaptureOrderResponse {
    id: String,
    status: String,
    #[serde(default)]
    payment_source: Option<PaymentSource>,
    #[serde(default)]
    purchase_units: Vec<PurchaseUnit>,
}

#[derive(Debug, Deserialize)]
struct PaymentSource {
    #[serde(default)]
    paypal: Option<PaypalWallet>,
}

#[derive(Debug, Deserialize)]
struct PaypalWallet {
    #[serde(default)]
    email_address: Option<String>,
    #[serde(default)]
    account_id: Option<String>,
}

#[derive(Debug, Deserialize)]
struct PurchaseUnit {
    #[serde(default)]
    shipping: Option<Shipping>,
    #[serde(default)]
    payments: Option<Payments>,
}

#[derive(Debug, Deserialize)]
struct Shipping {
    #[serde(default)]
    name: Option<ShippingName>,
    #[serde(default)]
    address: Option<Address>,
}

#[derive(Debug, Deserialize)]
struct ShippingName {
    #[serde(default)]
    full_name: Option<String>,
}

#[derive(Debug, Deserialize)]
struct Address {
    #[serde(default)]
    address_line_1: Option<String>,
    /// City
    #[serde(default)]
    admin_area_2: Option<String>,
    /// State/province
    #[serde(default)]
    admin_area_1: Option<String>,
    #[serde(default)]
    postal_code: Option<String>,
    #[serde(default)]
    country_code: Option<String>,
}

#[derive(Debug, Deserialize)]
struct Payments {
    #[serde(default)]
    captures: Vec<CaptureRecord>,
}

#[derive(Debug, Deserialize)]
struct CaptureRecord {
    id: String,
    #[serde(default)]
    amount: Option<Amount>,
}

#[derive(Debug, Deserialize)]
struct Amount {
    currency_code: String,
    value: String,
}

/// PayPal error payloads: `{name, message}` for the REST APIs,
/// `{error, error_description}` for the token endpoint
#[derive(Debug, Deserialize)]
struct ApiErrorResponse {
    #[serde(default)]
    message: Option<String>,
    #[serde(default)]
    error_description: Option<String>,
}

impl ApiErrorResponse {
    fn message(&self) -> Option<String> {
        self.message
            .clone()
            .or_else(|| self.error_description.clone())
    }
}

impl CaptureOrderResponse {
    fn into_capture(self) -> ShopResult<Capture> {
        let unit = self.purchase_units.into_iter().next().ok_or_else(|| {
            ShopError::ProviderError {
                provider: PROVIDER.to_string(),
                message: "capture response carried no purchase units".to_string(),
            }
        })?;

        let record = unit
            .payments
            .and_then(|p| p.captures.into_iter().next())
            .ok_or_else(|| ShopError::ProviderError {
                provider: PROVIDER.to_string(),
                message: "capture response carried no capture record".to_string(),
            })?;

        let amount = record.amount.ok_or_else(|| ShopError::ProviderError {
            provider: PROVIDER.to_string(),
            message: "capture record carried no amount".to_string(),
        })?;

        let currency =
            Currency::from_code(&amount.currency_code).ok_or_else(|| ShopError::ProviderError {
                provider: PROVIDER.to_string(),
                message: format!("unsupported currency {}", amount.currency_code),
            })?;

        let amount = Price::from_decimal_str(&amount.value, currency).ok_or_else(|| {
            ShopError::ProviderError {
                provider: PROVIDER.to_string(),
                message: format!("unparseable amount {}", amount.value),
            }
        })?;

        let wallet = self
            .payment_source
            .and_then(|s| s.paypal)
            .ok_or_else(|| ShopError::ProviderError {
                provider: PROVIDER.to_string(),
                message: "capture response carried no payer".to_string(),
            })?;

        let shipping = unit.shipping.and_then(|s| {
            let full_name = s.name.and_then(|n| n.full_name)?;
            let address = s.address?;
            let country = address.country_code?;
            Some(ShippingAddress {
                full_name,
                address_line1: address.address_line_1,
                city: address.admin_area_2,
                state: address.admin_area_1,
                postal_code: address.postal_code,
                country,
            })
        });

        Ok(Capture {
            provider_order_id: self.id,
            capture_id: record.id,
            status: self.status,
            amount,
            payer_email: wallet.email_address.unwrap_or_default(),
            payer_id: wallet.account_id.unwrap_or_default(),
            shipping,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{body_string_contains, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn token_mock() -> Mock {
        Mock::given(method("POST"))
            .and(path("/v1/oauth2/token"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "access_token": "A21AAFs-test-token",
                "token_type": "Bearer",
                "expires_in": 32400
            })))
    }

    fn gateway_for(server: &MockServer) -> PaypalGateway {
        PaypalGateway::new(
            PaypalConfig::new("client-id", "client-secret").with_api_base_url(server.uri()),
        )
    }

    #[tokio::test]
    async fn test_create_order() {
        let server = MockServer::start().await;
        token_mock().expect(1).mount(&server).await;

        Mock::given(method("POST"))
            .and(path("/v2/checkout/orders"))
            .and(body_string_contains("\"value\":\"45.00\""))
            .respond_with(ResponseTemplate::new(201).set_body_json(serde_json::json!({
                "id": "5O190127TN364715T",
                "status": "CREATED"
            })))
            .expect(1)
            .mount(&server)
            .await;

        let gateway = gateway_for(&server);
        let order = gateway
            .create_order(&Price::new(45.0, Currency::USD))
            .await
            .unwrap();

        assert_eq!(order.id, "5O190127TN364715T");
        assert_eq!(order.status, "CREATED");
    }

    #[tokio::test]
    async fn test_token_is_cached_across_calls() {
        let server = MockServer::start().await;
        // A second create_order must reuse the first token
        token_mock().expect(1).mount(&server).await;

        Mock::given(method("POST"))
            .and(path("/v2/checkout/orders"))
            .respond_with(ResponseTemplate::new(201).set_body_json(serde_json::json!({
                "id": "5O190127TN364715T",
                "status": "CREATED"
            })))
            .expect(2)
            .mount(&server)
            .await;

        let gateway = gateway_for(&server);
        gateway
            .create_order(&Price::new(10.0, Currency::USD))
            .await
            .unwrap();
        gateway
            .create_order(&Price::new(20.0, Currency::USD))
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn test_capture_order_parses_nested_fields() {
        let server = MockServer::start().await;
        token_mock().mount(&server).await;

        Mock::given(method("POST"))
            .and(path("/v2/checkout/orders/5O190127TN364715T/capture"))
            .respond_with(ResponseTemplate::new(201).set_body_json(serde_json::json!({
                "id": "5O190127TN364715T",
                "status": "COMPLETED",
                "payment_source": {
                    "paypal": {
                        "email_address": "payer@example.com",
                        "account_id": "QYR5Z8XDSY3HA"
                    }
                },
                "purchase_units": [{
                    "shipping": {
                        "name": { "full_name": "Ada Lovelace" },
                        "address": {
                            "address_line_1": "12 Analytical Row",
                            "admin_area_2": "London",
                            "admin_area_1": "LND",
                            "postal_code": "N1",
                            "country_code": "GB"
                        }
                    },
                    "payments": {
                        "captures": [{
                            "id": "3C679366HH908993F",
                            "status": "COMPLETED",
                            "amount": { "currency_code": "USD", "value": "45.00" }
                        }]
                    }
                }]
            })))
            .mount(&server)
            .await;

        let gateway = gateway_for(&server);
        let capture = gateway.capture_order("5O190127TN364715T").await.unwrap();

        assert!(capture.is_completed());
        assert_eq!(capture.capture_id, "3C679366HH908993F");
        assert_eq!(capture.amount.amount, 4500);
        assert_eq!(capture.payer_email, "payer@example.com");
        assert_eq!(capture.payer_id, "QYR5Z8XDSY3HA");

        let shipping = capture.shipping.unwrap();
        assert_eq!(shipping.full_name, "Ada Lovelace");
        assert_eq!(shipping.city.as_deref(), Some("London"));
        assert_eq!(shipping.country, "GB");
    }

    #[tokio::test]
    async fn test_provider_error_is_surfaced() {
        let server = MockServer::start().await;
        token_mock().mount(&server).await;

        Mock::given(method("POST"))
            .and(path("/v2/checkout/orders"))
            .respond_with(ResponseTemplate::new(422).set_body_json(serde_json::json!({
                "name": "UNPROCESSABLE_ENTITY",
                "message": "The requested action could not be performed."
            })))
            .mount(&server)
            .await;

        let gateway = gateway_for(&server);
        let err = gateway
            .create_order(&Price::new(45.0, Currency::USD))
            .await
            .unwrap_err();

        match err {
            ShopError::ProviderError { provider, message } => {
                assert_eq!(provider, "paypal");
                assert!(message.contains("could not be performed"));
            }
            other => panic!("expected provider error, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_zero_amount_rejected_before_any_call() {
        let server = MockServer::start().await;
        let gateway = gateway_for(&server);

        let err = gateway
            .create_order(&Price::from_cents(0, Currency::USD))
            .await
            .unwrap_err();
        assert!(matches!(err, ShopError::InvalidRequest(_)));
    }
}
