//! # Application State
//!
//! Shared state for the Axum application: injected store handles, the
//! payment gateway, the cart/checkout services, and token keys. Every
//! collaborator is constructed here and passed in — nothing hangs off
//! module-level globals.

use crate::auth::TokenKeys;
use shop_core::{
    CartService, CheckoutService, SharedCartStore, SharedCatalogStore, SharedOrderStore,
    SharedPaymentGateway, SharedUserStore,
};
use shop_mongo::MongoStores;
use shop_paypal::PaypalGateway;
use std::sync::Arc;

/// Application configuration
#[derive(Debug, Clone)]
pub struct AppConfig {
    /// Host to bind to
    pub host: String,
    /// Port to listen on
    pub port: u16,
    /// Environment (development, staging, production)
    pub environment: String,
    /// MongoDB connection string
    pub mongodb_uri: String,
    /// Database name
    pub mongodb_database: String,
    /// HS256 secret for access tokens
    pub jwt_secret: String,
}

impl AppConfig {
    /// Load from environment variables. `JWT_SECRET_KEY` is required;
    /// everything else has a development default.
    pub fn from_env() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();

        let jwt_secret = std::env::var("JWT_SECRET_KEY")
            .map_err(|_| anyhow::anyhow!("JWT_SECRET_KEY not set"))?;

        Ok(Self {
            host: std::env::var("HOST").unwrap_or_else(|_| "127.0.0.1".to_string()),
            port: std::env::var("PORT")
                .ok()
                .and_then(|p| p.parse().ok())
                .unwrap_or(8080),
            environment: std::env::var("ENVIRONMENT").unwrap_or_else(|_| "development".to_string()),
            mongodb_uri: std::env::var("MONGODB_URI")
                .unwrap_or_else(|_| "mongodb://127.0.0.1:27017".to_string()),
            mongodb_database: std::env::var("MONGODB_DATABASE")
                .unwrap_or_else(|_| "gadget_shop".to_string()),
            jwt_secret,
        })
    }

    /// Get the socket address to bind to
    pub fn socket_addr(&self) -> std::net::SocketAddr {
        format!("{}:{}", self.host, self.port)
            .parse()
            .expect("Invalid socket address")
    }

    /// Check if running in production
    pub fn is_production(&self) -> bool {
        self.environment == "production"
    }
}

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    pub config: AppConfig,
    pub users: SharedUserStore,
    pub catalog: SharedCatalogStore,
    pub orders: SharedOrderStore,
    /// Cart operations (stock-checked add, absolute set, remove, list)
    pub carts: CartService,
    /// Review, provider-order creation, and the order writer
    pub checkout: CheckoutService,
    pub tokens: TokenKeys,
}

impl AppState {
    /// Connect to MongoDB and the configured payment provider
    pub async fn new() -> anyhow::Result<Self> {
        let config = AppConfig::from_env()?;

        let stores = MongoStores::connect(&config.mongodb_uri, &config.mongodb_database).await?;
        let gateway = PaypalGateway::from_env()
            .map_err(|e| anyhow::anyhow!("Failed to initialize PayPal: {e}"))?;

        Ok(Self::assemble(
            config,
            Arc::new(stores.users),
            Arc::new(stores.catalog),
            Arc::new(stores.carts),
            Arc::new(stores.orders),
            Arc::new(gateway),
        ))
    }

    /// Wire the services from explicit collaborators (tests swap in the
    /// in-memory stores and a stub gateway here)
    pub fn assemble(
        config: AppConfig,
        users: SharedUserStore,
        catalog: SharedCatalogStore,
        carts: SharedCartStore,
        orders: SharedOrderStore,
        gateway: SharedPaymentGateway,
    ) -> Self {
        let tokens = TokenKeys::new(&config.jwt_secret);
        let cart_service = CartService::new(carts.clone(), catalog.clone());
        let checkout = CheckoutService::new(carts, catalog.clone(), orders.clone(), gateway);

        Self {
            config,
            users,
            catalog,
            orders,
            carts: cart_service,
            checkout,
            tokens,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_socket_addr() {
        let config = AppConfig {
            host: "0.0.0.0".to_string(),
            port: 3000,
            environment: "test".to_string(),
            mongodb_uri: "mongodb://127.0.0.1:27017".to_string(),
            mongodb_database: "gadget_shop_test".to_string(),
            jwt_secret: "test-secret".to_string(),
        };

        let addr = config.socket_addr();
        assert_eq!(addr.to_string(), "0.0.0.0:3000");
        assert!(!config.is_production());
    }
}
