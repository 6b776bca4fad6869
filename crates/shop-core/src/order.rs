//! # Order Types
//!
//! A persisted order freezes everything it references at write time:
//! totals, shipping, the payment record, and per-line product snapshots.
//! Later catalog or price edits never alter order history.

use crate::product::{Currency, Price};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Placeholder tracking number assigned until fulfilment takes over
const DEFAULT_TRACKING_NUMBER: &str = "#0000118052022";

/// Payment record status
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PaymentStatus {
    #[default]
    Pending,
    Completed,
    Failed,
}

/// Order lifecycle status
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OrderStatus {
    #[default]
    Pending,
    Confirmed,
    Shipped,
    Cancelled,
    Delivered,
}

/// Shipping address snapshot
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ShippingAddress {
    pub full_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub address_line1: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub city: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub state: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub postal_code: Option<String>,
    pub country: String,
}

/// Payment record frozen from the provider's capture result
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PaymentRecord {
    pub provider_order_id: String,
    pub capture_id: String,
    #[serde(default)]
    pub status: PaymentStatus,
    pub amount: Price,
    pub payer_email: String,
    pub payer_id: String,
}

/// Checkout totals, one currency across the aggregate
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CheckoutTotals {
    pub currency: Currency,
    /// Sum of raw line prices across all groups
    pub total_price: i64,
    /// Recorded discount total (pass-through, not computed here)
    #[serde(default)]
    pub total_discount: i64,
    #[serde(default)]
    pub shipping_fee: i64,
    /// Amount actually charged
    pub grand_total: i64,
}

impl CheckoutTotals {
    pub fn zero(currency: Currency) -> Self {
        Self {
            currency,
            total_price: 0,
            total_discount: 0,
            shipping_fee: 0,
            grand_total: 0,
        }
    }

    /// Grand total as a `Price` for the payment gateway
    pub fn grand_total_price(&self) -> Price {
        Price::from_cents(self.grand_total, self.currency)
    }
}

/// A purchased line, snapshotted from the catalog at review time
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrderLine {
    pub product_id: String,
    pub quantity: u32,
    /// Unit price at purchase
    pub price: Price,
    pub name: String,
    pub thumbnail: String,
    /// Catalog stock observed at purchase
    pub stock_at_purchase: u32,
}

impl OrderLine {
    /// Total price for this line
    pub fn total(&self) -> Price {
        Price {
            amount: self.price.amount * self.quantity as i64,
            currency: self.price.currency,
        }
    }
}

/// A persisted order
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Order {
    /// Unique order id (generated)
    pub id: String,

    /// Owning user
    pub user_id: String,

    /// Frozen checkout totals
    pub totals: CheckoutTotals,

    /// Shipping address snapshot
    pub shipping: ShippingAddress,

    /// Payment record; immutable once written
    pub payment: PaymentRecord,

    /// Purchased line snapshots
    pub lines: Vec<OrderLine>,

    #[serde(default = "default_tracking_number")]
    pub tracking_number: String,

    #[serde(default)]
    pub status: OrderStatus,

    pub created_at: DateTime<Utc>,
}

fn default_tracking_number() -> String {
    DEFAULT_TRACKING_NUMBER.to_string()
}

impl Order {
    /// Build a confirmed order from a completed capture. This is the only
    /// construction path the checkout workflow uses.
    pub fn confirmed(
        user_id: impl Into<String>,
        totals: CheckoutTotals,
        shipping: ShippingAddress,
        payment: PaymentRecord,
        lines: Vec<OrderLine>,
    ) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            user_id: user_id.into(),
            totals,
            shipping,
            payment,
            lines,
            tracking_number: default_tracking_number(),
            status: OrderStatus::Confirmed,
            created_at: Utc::now(),
        }
    }

    /// Total quantity across all lines
    pub fn item_count(&self) -> u32 {
        self.lines.iter().map(|l| l.quantity).sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_line(quantity: u32) -> OrderLine {
        OrderLine {
            product_id: "p1".into(),
            quantity,
            price: Price::new(10.0, Currency::USD),
            name: "Pixelon 9".into(),
            thumbnail: "https://cdn.example.com/p9.png".into(),
            stock_at_purchase: 5,
        }
    }

    #[test]
    fn test_line_total() {
        assert_eq!(sample_line(3).total().amount, 3000);
    }

    #[test]
    fn test_confirmed_order_defaults() {
        let totals = CheckoutTotals {
            currency: Currency::USD,
            total_price: 3000,
            total_discount: 0,
            shipping_fee: 0,
            grand_total: 3000,
        };
        let order = Order::confirmed(
            "user-1",
            totals,
            ShippingAddress {
                full_name: "Ada Lovelace".into(),
                address_line1: Some("12 Analytical Row".into()),
                city: Some("London".into()),
                state: None,
                postal_code: Some("N1".into()),
                country: "GB".into(),
            },
            PaymentRecord {
                provider_order_id: "5O190127TN364715T".into(),
                capture_id: "3C679366HH908993F".into(),
                status: PaymentStatus::Completed,
                amount: Price::new(30.0, Currency::USD),
                payer_email: "ada@example.com".into(),
                payer_id: "QYR5Z8XDSY3HA".into(),
            },
            vec![sample_line(3)],
        );

        assert_eq!(order.status, OrderStatus::Confirmed);
        assert_eq!(order.tracking_number, DEFAULT_TRACKING_NUMBER);
        assert_eq!(order.item_count(), 3);
    }

    #[test]
    fn test_status_serialization() {
        assert_eq!(
            serde_json::to_string(&PaymentStatus::Completed).unwrap(),
            "\"COMPLETED\""
        );
        assert_eq!(
            serde_json::to_string(&OrderStatus::Confirmed).unwrap(),
            "\"confirmed\""
        );
    }
}
