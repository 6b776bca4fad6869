//! # Payment Gateway Trait
//!
//! Seam for the external payment provider. The provider owns every
//! payment-state transition; this side only creates provider orders and
//! captures them, and treats `COMPLETED` as the sole success status.
//!
//! The gateway is constructed at process startup and injected as a shared
//! handle — there is no module-level client singleton.

use crate::error::ShopResult;
use crate::order::ShippingAddress;
use crate::product::Price;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// Capture status the provider reports for a completed transaction
pub const CAPTURE_COMPLETED: &str = "COMPLETED";

/// A payment order created at the provider, awaiting approval and capture
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProviderOrder {
    /// Provider's order id
    pub id: String,
    /// Provider-reported status (e.g. "CREATED")
    pub status: String,
}

/// Result of capturing a provider order
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Capture {
    /// Provider's order id
    pub provider_order_id: String,

    /// Provider's capture id (one per collected payment)
    pub capture_id: String,

    /// Raw provider status; anything but "COMPLETED" is a failed capture
    pub status: String,

    /// Amount collected
    pub amount: Price,

    /// Payer identity as reported by the provider
    pub payer_email: String,
    pub payer_id: String,

    /// Shipping address the payer confirmed at the provider, if any
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub shipping: Option<ShippingAddress>,
}

impl Capture {
    /// True when the provider reports the funds as collected
    pub fn is_completed(&self) -> bool {
        self.status == CAPTURE_COMPLETED
    }
}

/// Payment provider collaborator
#[async_trait]
pub trait PaymentGateway: Send + Sync {
    /// Create a payment order for the given amount.
    async fn create_order(&self, amount: &Price) -> ShopResult<ProviderOrder>;

    /// Capture a previously created and approved payment order.
    async fn capture_order(&self, provider_order_id: &str) -> ShopResult<Capture>;

    /// Provider name (for logging)
    fn provider_name(&self) -> &'static str;
}

/// Shared handle for injection (dynamic dispatch)
pub type SharedPaymentGateway = Arc<dyn PaymentGateway>;

#[cfg(test)]
mod tests {
    use super::*;
    use crate::product::Currency;

    #[test]
    fn test_capture_completed() {
        let mut capture = Capture {
            provider_order_id: "5O190127TN364715T".into(),
            capture_id: "3C679366HH908993F".into(),
            status: CAPTURE_COMPLETED.into(),
            amount: Price::new(45.0, Currency::USD),
            payer_email: "payer@example.com".into(),
            payer_id: "QYR5Z8XDSY3HA".into(),
            shipping: None,
        };
        assert!(capture.is_completed());

        capture.status = "DECLINED".into();
        assert!(!capture.is_completed());
    }
}
