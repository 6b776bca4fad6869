//! # Cart Types and Operations
//!
//! One active cart per user. Every mutating operation keeps the derived
//! `line_count` equal to the sum of line quantities; the store contracts
//! make that adjustment atomic with the line change itself.

use crate::error::{ShopError, ShopResult};
use crate::product::ProductSnapshot;
use crate::store::{SharedCartStore, SharedCatalogStore};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::instrument;
use uuid::Uuid;

/// Cart lifecycle state; only `active` carts accept line mutations
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CartState {
    #[default]
    Active,
    Completed,
    Failed,
    Pending,
}

/// A (product, quantity) pair within a cart
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CartLine {
    pub product_id: String,
    pub quantity: u32,
}

/// A user's cart
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Cart {
    pub id: String,
    pub user_id: String,
    #[serde(default)]
    pub state: CartState,
    #[serde(default)]
    pub lines: Vec<CartLine>,
    /// Derived: sum of line quantities. Never drifts from `lines`.
    #[serde(default)]
    pub line_count: u32,
    /// Compare-and-swap guard for read-modify-write updates
    #[serde(default)]
    pub version: u64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Cart {
    /// Create an empty active cart for a user
    pub fn new(user_id: impl Into<String>) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4().to_string(),
            user_id: user_id.into(),
            state: CartState::Active,
            lines: Vec::new(),
            line_count: 0,
            version: 0,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn line(&self, product_id: &str) -> Option<&CartLine> {
        self.lines.iter().find(|l| l.product_id == product_id)
    }

    /// Recompute `line_count` from the lines
    pub fn recount(&mut self) {
        self.line_count = self.lines.iter().map(|l| l.quantity).sum();
    }

    pub fn is_active(&self) -> bool {
        self.state == CartState::Active
    }
}

/// Cart line resolved to a catalog snapshot for display
#[derive(Debug, Clone, Serialize)]
pub struct CartLineView {
    pub product: ProductSnapshot,
    pub quantity: u32,
}

/// Cart with lines resolved against the catalog
#[derive(Debug, Clone, Serialize)]
pub struct CartView {
    pub id: String,
    pub user_id: String,
    pub state: CartState,
    pub line_count: u32,
    pub lines: Vec<CartLineView>,
}

/// Cart operations over the store seams
#[derive(Clone)]
pub struct CartService {
    carts: SharedCartStore,
    catalog: SharedCatalogStore,
}

impl CartService {
    pub fn new(carts: SharedCartStore, catalog: SharedCatalogStore) -> Self {
        Self { carts, catalog }
    }

    /// Return the user's active cart, creating one if none exists
    pub async fn ensure_active(&self, user_id: &str) -> ShopResult<Cart> {
        self.carts.ensure_active(user_id).await
    }

    /// Add a product to the cart, incrementing the quantity if a line for
    /// it already exists.
    #[instrument(skip(self))]
    pub async fn add_item(
        &self,
        user_id: &str,
        product_id: &str,
        quantity: u32,
    ) -> ShopResult<CartView> {
        if quantity == 0 {
            return Err(ShopError::InvalidRequest(
                "quantity must be a positive integer".to_string(),
            ));
        }

        let product = self
            .catalog
            .find_by_id(product_id)
            .await?
            .ok_or_else(|| ShopError::ProductNotFound {
                product_id: product_id.to_string(),
            })?;

        if quantity > product.stock {
            return Err(ShopError::StockExceeded {
                product_id: product_id.to_string(),
                requested: quantity,
                in_stock: product.stock,
            });
        }

        self.carts.ensure_active(user_id).await?;
        let cart = self
            .carts
            .add_or_increment_line(user_id, product_id, quantity)
            .await?;
        self.view(cart).await
    }

    /// Set a line's absolute quantity; zero or less removes the line
    #[instrument(skip(self))]
    pub async fn set_item_quantity(
        &self,
        user_id: &str,
        product_id: &str,
        quantity: i64,
    ) -> ShopResult<CartView> {
        let cart = self
            .carts
            .set_line_quantity(user_id, product_id, quantity)
            .await?;
        self.view(cart).await
    }

    /// Remove a line; removing an absent line just refreshes the count
    #[instrument(skip(self))]
    pub async fn remove_item(&self, user_id: &str, product_id: &str) -> ShopResult<CartView> {
        let cart = self.carts.remove_line(user_id, product_id).await?;
        self.view(cart).await
    }

    /// The user's active cart with lines resolved for display
    pub async fn list(&self, user_id: &str) -> ShopResult<CartView> {
        let cart = self
            .carts
            .find_active(user_id)
            .await?
            .ok_or(ShopError::CartNotFound)?;
        self.view(cart).await
    }

    /// Resolve lines to catalog snapshots; lines whose product no longer
    /// resolves are omitted from the view (the raw cart keeps them).
    async fn view(&self, cart: Cart) -> ShopResult<CartView> {
        let mut lines = Vec::with_capacity(cart.lines.len());
        for line in &cart.lines {
            if let Some(product) = self.catalog.find_by_id(&line.product_id).await? {
                lines.push(CartLineView {
                    product: product.snapshot(),
                    quantity: line.quantity,
                });
            }
        }
        Ok(CartView {
            id: cart.id,
            user_id: cart.user_id,
            state: cart.state,
            line_count: cart.line_count,
            lines,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_recount_matches_lines() {
        let mut cart = Cart::new("user-1");
        cart.lines.push(CartLine {
            product_id: "p1".into(),
            quantity: 3,
        });
        cart.lines.push(CartLine {
            product_id: "p2".into(),
            quantity: 2,
        });
        cart.recount();
        assert_eq!(cart.line_count, 5);

        cart.lines.retain(|l| l.product_id != "p1");
        cart.recount();
        assert_eq!(cart.line_count, 2);
    }

    #[test]
    fn test_new_cart_is_active_and_empty() {
        let cart = Cart::new("user-1");
        assert!(cart.is_active());
        assert!(cart.lines.is_empty());
        assert_eq!(cart.line_count, 0);
    }
}
