//! # shop-paypal
//!
//! PayPal payment gateway for gadget-shop-rs, built on the Orders v2 API.
//!
//! ## Flow
//!
//! ```text
//! ┌──────────────┐   create_order    ┌──────────────────────────┐
//! │ CheckoutSvc  │ ────────────────► │ POST /v2/checkout/orders │
//! │  (shop-core) │                   └──────────────────────────┘
//! │              │   capture_order   ┌──────────────────────────┐
//! │              │ ────────────────► │ POST …/{id}/capture      │
//! └──────────────┘                   └──────────────────────────┘
//! ```
//!
//! The payer approves the order on PayPal's side between the two calls;
//! a capture is only treated as paid when the provider reports
//! `COMPLETED`.
//!
//! ## Example
//!
//! ```rust,ignore
//! use shop_paypal::{PaypalConfig, PaypalGateway};
//!
//! let gateway = PaypalGateway::from_env()?;
//! let order = gateway.create_order(&Price::new(45.0, Currency::USD)).await?;
//! // ... payer approves ...
//! let capture = gateway.capture_order(&order.id).await?;
//! assert!(capture.is_completed());
//! ```

pub mod config;
pub mod orders;

// Re-exports for convenience
pub use config::PaypalConfig;
pub use orders::PaypalGateway;
