//! # Checkout Workflow
//!
//! The review pass re-prices every requested line from the catalog —
//! caller-claimed prices are used for nothing but discount bucketing, so
//! client-side price tampering never reaches a total. Review output is
//! advisory: it reserves no stock and locks no cart, and stock or price
//! may change between review and capture.
//!
//! The order writer converts a completed capture plus a reviewed summary
//! into exactly one persisted order, keyed uniquely by the provider
//! capture id.

use crate::error::{ShopError, ShopResult};
use crate::gateway::{Capture, ProviderOrder, SharedPaymentGateway};
use crate::order::{CheckoutTotals, Order, OrderLine, PaymentRecord, PaymentStatus};
use crate::product::{Currency, Price, Product};
use crate::store::{SharedCartStore, SharedCatalogStore, SharedOrderStore};
use serde::{Deserialize, Serialize};
use tracing::{info, instrument, warn};

/// Reference to an externally managed discount; recorded, never applied here
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DiscountRef {
    pub discount_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub code_id: Option<String>,
}

/// A caller-requested line. The claimed price is deliberately ignored
/// when totals are computed.
#[derive(Debug, Clone, Deserialize)]
pub struct RequestedLine {
    pub product_id: String,
    pub quantity: u32,
    /// Client-claimed unit price in smallest units; discarded on review
    #[serde(default)]
    pub price: Option<i64>,
}

/// A caller-supplied grouping of lines sharing a discount bucket
#[derive(Debug, Clone, Default, Deserialize)]
pub struct LineGroup {
    #[serde(default)]
    pub discounts: Vec<DiscountRef>,
    #[serde(default)]
    pub items: Vec<RequestedLine>,
}

/// A line re-priced from the catalog at review time
#[derive(Debug, Clone, Serialize)]
pub struct ReviewedLine {
    pub product_id: String,
    pub quantity: u32,
    /// Authoritative unit price from the catalog
    pub price: Price,
    pub name: String,
    pub thumbnail: String,
    /// Stock observed at review time (not reserved)
    pub stock: u32,
}

impl ReviewedLine {
    fn from_product(product: &Product, quantity: u32) -> Self {
        Self {
            product_id: product.id.clone(),
            quantity,
            price: product.price.clone(),
            name: product.name.clone(),
            thumbnail: product.thumbnail.clone(),
            stock: product.stock,
        }
    }

    /// Line contribution in smallest currency units
    pub fn total_amount(&self) -> i64 {
        self.price.amount * self.quantity as i64
    }

    fn into_order_line(self) -> OrderLine {
        OrderLine {
            product_id: self.product_id,
            quantity: self.quantity,
            price: self.price,
            name: self.name,
            thumbnail: self.thumbnail,
            stock_at_purchase: self.stock,
        }
    }
}

/// One reviewed group: re-priced lines plus recorded discounts
#[derive(Debug, Clone, Serialize)]
pub struct GroupSummary {
    pub discounts: Vec<DiscountRef>,
    /// Sum of re-priced lines before discounts
    pub price_raw: i64,
    /// After recorded discounts; equal to `price_raw` until a pricing-rules
    /// collaborator applies them
    pub price_after_discount: i64,
    pub lines: Vec<ReviewedLine>,
}

/// Ephemeral checkout summary; advisory, never persisted
#[derive(Debug, Clone, Serialize)]
pub struct CheckoutSummary {
    pub cart_id: String,
    pub groups: Vec<GroupSummary>,
    pub totals: CheckoutTotals,
}

impl CheckoutSummary {
    /// Flatten all reviewed lines into order line snapshots
    pub fn order_lines(&self) -> Vec<OrderLine> {
        self.groups
            .iter()
            .flat_map(|g| g.lines.iter().cloned())
            .map(ReviewedLine::into_order_line)
            .collect()
    }
}

/// Checkout review, provider order creation, and the order writer
#[derive(Clone)]
pub struct CheckoutService {
    carts: SharedCartStore,
    catalog: SharedCatalogStore,
    orders: SharedOrderStore,
    gateway: SharedPaymentGateway,
    currency: Currency,
}

impl CheckoutService {
    pub fn new(
        carts: SharedCartStore,
        catalog: SharedCatalogStore,
        orders: SharedOrderStore,
        gateway: SharedPaymentGateway,
    ) -> Self {
        Self {
            carts,
            catalog,
            orders,
            gateway,
            currency: Currency::USD,
        }
    }

    /// Builder: settle in a different currency
    pub fn with_currency(mut self, currency: Currency) -> Self {
        self.currency = currency;
        self
    }

    /// Re-price the requested groups against the catalog and aggregate
    /// totals. Lines whose product no longer resolves are dropped; a group
    /// with zero surviving lines fails the review.
    #[instrument(skip(self, groups), fields(groups = groups.len()))]
    pub async fn review(
        &self,
        user_id: &str,
        cart_id: &str,
        groups: &[LineGroup],
    ) -> ShopResult<CheckoutSummary> {
        let cart = self
            .carts
            .find_active_by_id(cart_id)
            .await?
            .filter(|c| c.user_id == user_id)
            .ok_or(ShopError::CartNotFound)?;

        let mut totals = CheckoutTotals::zero(self.currency);
        let mut reviewed = Vec::with_capacity(groups.len());

        for group in groups {
            let mut lines = Vec::with_capacity(group.items.len());
            for item in &group.items {
                let Some(product) = self.catalog.find_by_id(&item.product_id).await? else {
                    continue;
                };
                if product.price.currency != self.currency {
                    return Err(ShopError::InvalidRequest(format!(
                        "product {} is priced in {}, checkout settles in {}",
                        product.id, product.price.currency, self.currency
                    )));
                }
                lines.push(ReviewedLine::from_product(&product, item.quantity));
            }

            if lines.is_empty() {
                return Err(ShopError::EmptyOrder);
            }

            let price_raw: i64 = lines.iter().map(ReviewedLine::total_amount).sum();
            totals.total_price += price_raw;
            totals.grand_total += price_raw;

            reviewed.push(GroupSummary {
                discounts: group.discounts.clone(),
                price_raw,
                price_after_discount: price_raw,
                lines,
            });
        }

        Ok(CheckoutSummary {
            cart_id: cart.id,
            groups: reviewed,
            totals,
        })
    }

    /// Review server-side, then create a provider order for the grand
    /// total. The caller-submitted total is never used.
    #[instrument(skip(self, groups))]
    pub async fn create_provider_order(
        &self,
        user_id: &str,
        cart_id: &str,
        groups: &[LineGroup],
    ) -> ShopResult<(ProviderOrder, CheckoutSummary)> {
        let summary = self.review(user_id, cart_id, groups).await?;
        let amount = summary.totals.grand_total_price();

        info!(
            provider = self.gateway.provider_name(),
            amount = %amount.display(),
            "creating provider order"
        );

        let provider_order = self.gateway.create_order(&amount).await?;
        Ok((provider_order, summary))
    }

    /// Capture a provider order and persist the resulting shop order.
    #[instrument(skip(self, groups))]
    pub async fn capture_and_place_order(
        &self,
        user_id: &str,
        provider_order_id: &str,
        cart_id: &str,
        groups: &[LineGroup],
    ) -> ShopResult<Order> {
        let summary = self.review(user_id, cart_id, groups).await?;
        let capture = self.gateway.capture_order(provider_order_id).await?;
        self.place_order(user_id, &capture, &summary).await
    }

    /// The order writer. Requires a completed capture; writes exactly one
    /// order per capture id — a repeated call returns the order already
    /// written for that capture.
    #[instrument(skip(self, capture, summary), fields(capture_id = %capture.capture_id))]
    pub async fn place_order(
        &self,
        user_id: &str,
        capture: &Capture,
        summary: &CheckoutSummary,
    ) -> ShopResult<Order> {
        if !capture.is_completed() {
            return Err(ShopError::PaymentNotCompleted {
                status: capture.status.clone(),
            });
        }

        if let Some(existing) = self.orders.find_by_capture_id(&capture.capture_id).await? {
            info!(order_id = %existing.id, "capture already recorded, returning existing order");
            return Ok(existing);
        }

        let shipping = capture.shipping.clone().ok_or_else(|| {
            ShopError::InvalidRequest("capture result carries no shipping address".to_string())
        })?;

        let payment = PaymentRecord {
            provider_order_id: capture.provider_order_id.clone(),
            capture_id: capture.capture_id.clone(),
            status: PaymentStatus::Completed,
            amount: capture.amount.clone(),
            payer_email: capture.payer_email.clone(),
            payer_id: capture.payer_id.clone(),
        };

        let order = Order::confirmed(
            user_id,
            summary.totals.clone(),
            shipping,
            payment,
            summary.order_lines(),
        );

        match self.orders.insert(&order).await {
            Ok(()) => {}
            Err(ShopError::Conflict(_)) => {
                // Lost the race to a concurrent write for the same capture
                if let Some(existing) =
                    self.orders.find_by_capture_id(&capture.capture_id).await?
                {
                    return Ok(existing);
                }
                return Err(ShopError::Conflict(format!(
                    "duplicate order for capture {}",
                    capture.capture_id
                )));
            }
            Err(e) => return Err(e),
        }

        info!(order_id = %order.id, total = order.totals.grand_total, "order confirmed");

        // The order is written; a failed cart transition must not undo it.
        if let Err(e) = self.carts.complete_active(user_id).await {
            warn!(error = %e, "failed to complete cart after order write");
        }

        Ok(order)
    }
}
