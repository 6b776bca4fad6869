//! # Shop Error Types
//!
//! Typed error handling for the gadget-shop backend.
//! All workflow operations return `Result<T, ShopError>`.

use thiserror::Error;

/// Core error type for all shop operations
#[derive(Debug, Error)]
pub enum ShopError {
    /// Configuration errors (missing keys, invalid config)
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// Invalid request data
    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    /// Missing or invalid bearer token
    #[error("Login required")]
    Unauthorized,

    /// Authenticated but not allowed
    #[error("Admin access required")]
    Forbidden,

    /// Email/password pair did not match a user
    #[error("Invalid credentials")]
    InvalidCredentials,

    /// User not found
    #[error("User not found: {user_id}")]
    UserNotFound { user_id: String },

    /// Duplicate registration
    #[error("User already exists: {email}")]
    UserAlreadyExists { email: String },

    /// Product not found in catalog
    #[error("Product not found: {product_id}")]
    ProductNotFound { product_id: String },

    /// A product with the same name and category already exists
    #[error("Product already exists: {name}")]
    ProductAlreadyExists { name: String },

    /// Requested quantity exceeds the product's current stock
    #[error("Exceeds the stock: requested {requested}, in stock {in_stock}")]
    StockExceeded {
        product_id: String,
        requested: u32,
        in_stock: u32,
    },

    /// No active cart for the user (or the cart id did not resolve)
    #[error("Cart not found")]
    CartNotFound,

    /// Setting a quantity for a product that has no line in the cart
    #[error("Product not in cart: {product_id}")]
    LineNotFound { product_id: String },

    /// A checkout group resolved to zero valid lines
    #[error("Order contains no valid items")]
    EmptyOrder,

    /// Order not found
    #[error("Order not found: {order_id}")]
    OrderNotFound { order_id: String },

    /// Payment provider reported a non-completed capture
    #[error("Transaction not completed: provider reported {status}")]
    PaymentNotCompleted { status: String },

    /// Concurrent modification detected (CAS exhausted, duplicate insert)
    #[error("Conflict: {0}")]
    Conflict(String),

    /// Payment provider API error
    #[error("Provider error [{provider}]: {message}")]
    ProviderError { provider: String, message: String },

    /// Network/HTTP error communicating with the provider
    #[error("Network error: {0}")]
    NetworkError(String),

    /// Document store call failed
    #[error("Storage error: {0}")]
    Storage(String),

    /// Serialization/deserialization error
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// Internal error (should not happen)
    #[error("Internal error: {0}")]
    Internal(String),
}

impl ShopError {
    /// Returns the HTTP status code appropriate for this error
    pub fn status_code(&self) -> u16 {
        match self {
            ShopError::Configuration(_) => 500,
            ShopError::InvalidRequest(_) => 400,
            ShopError::Unauthorized => 401,
            ShopError::Forbidden => 403,
            ShopError::InvalidCredentials => 400,
            ShopError::UserNotFound { .. } => 404,
            ShopError::UserAlreadyExists { .. } => 409,
            ShopError::ProductNotFound { .. } => 404,
            ShopError::ProductAlreadyExists { .. } => 409,
            ShopError::StockExceeded { .. } => 400,
            ShopError::CartNotFound => 404,
            ShopError::LineNotFound { .. } => 404,
            ShopError::EmptyOrder => 400,
            ShopError::OrderNotFound { .. } => 404,
            ShopError::PaymentNotCompleted { .. } => 402,
            ShopError::Conflict(_) => 409,
            ShopError::ProviderError { .. } => 502,
            ShopError::NetworkError(_) => 503,
            ShopError::Storage(_) => 503,
            ShopError::Serialization(_) => 500,
            ShopError::Internal(_) => 500,
        }
    }

    /// Coarse error category surfaced in the response envelope
    pub fn category(&self) -> &'static str {
        match self {
            ShopError::Configuration(_) | ShopError::Internal(_) => "Internal Error",
            ShopError::InvalidRequest(_) => "Validation Error",
            ShopError::Unauthorized | ShopError::InvalidCredentials => "Authentication Error",
            ShopError::Forbidden => "Authorization Error",
            ShopError::UserNotFound { .. }
            | ShopError::ProductNotFound { .. }
            | ShopError::CartNotFound
            | ShopError::LineNotFound { .. }
            | ShopError::OrderNotFound { .. } => "Not Found",
            ShopError::UserAlreadyExists { .. }
            | ShopError::ProductAlreadyExists { .. }
            | ShopError::Conflict(_) => "Conflict",
            ShopError::StockExceeded { .. } => "Stock Exceeded",
            ShopError::EmptyOrder => "Empty Order",
            ShopError::PaymentNotCompleted { .. } => "Payment Not Completed",
            ShopError::ProviderError { .. }
            | ShopError::NetworkError(_)
            | ShopError::Storage(_)
            | ShopError::Serialization(_) => "Upstream Failure",
        }
    }
}

/// Result type alias for shop operations
pub type ShopResult<T> = Result<T, ShopError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_codes() {
        assert_eq!(
            ShopError::ProductNotFound {
                product_id: "x".into()
            }
            .status_code(),
            404
        );
        assert_eq!(
            ShopError::StockExceeded {
                product_id: "x".into(),
                requested: 9,
                in_stock: 3
            }
            .status_code(),
            400
        );
        assert_eq!(
            ShopError::PaymentNotCompleted {
                status: "DECLINED".into()
            }
            .status_code(),
            402
        );
        assert_eq!(ShopError::Unauthorized.status_code(), 401);
    }

    #[test]
    fn test_categories() {
        assert_eq!(ShopError::CartNotFound.category(), "Not Found");
        assert_eq!(
            ShopError::UserAlreadyExists {
                email: "a@b.c".into()
            }
            .category(),
            "Conflict"
        );
        assert_eq!(
            ShopError::NetworkError("timeout".into()).category(),
            "Upstream Failure"
        );
    }
}
