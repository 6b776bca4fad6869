//! # Store Traits
//!
//! Persistence collaborator traits. The workflow only talks to these seams;
//! `shop-mongo` provides the document-store implementations and
//! [`crate::memory`] provides in-process ones for tests and local runs.

use crate::cart::Cart;
use crate::error::ShopResult;
use crate::order::Order;
use crate::product::{Product, ProductCategory, ProductPage, ProductPatch, ProductQuery};
use crate::user::User;
use async_trait::async_trait;
use std::sync::Arc;

/// Product catalog collaborator
#[async_trait]
pub trait CatalogStore: Send + Sync {
    async fn find_by_id(&self, product_id: &str) -> ShopResult<Option<Product>>;

    async fn insert(&self, product: &Product) -> ShopResult<()>;

    /// Apply a partial update and return the updated product.
    /// Fails with `ProductNotFound` if the id does not resolve.
    async fn update(&self, product_id: &str, patch: &ProductPatch) -> ShopResult<Product>;

    /// Absolute stock set (post-sale adjustment)
    async fn set_stock(&self, product_id: &str, stock: u32) -> ShopResult<Product>;

    async fn list(&self, query: &ProductQuery) -> ShopResult<ProductPage>;

    /// Duplicate probe used by product creation
    async fn find_duplicate(
        &self,
        name: &str,
        category: ProductCategory,
    ) -> ShopResult<Option<Product>>;
}

/// Cart persistence collaborator, keyed by (user, state).
///
/// Implementations must keep `line_count` equal to the sum of line
/// quantities within every mutation — readers never observe the two
/// disagreeing.
#[async_trait]
pub trait CartStore: Send + Sync {
    /// Return the user's active cart, creating an empty one if none exists.
    /// Must be an atomic upsert: concurrent calls for one user yield one cart.
    async fn ensure_active(&self, user_id: &str) -> ShopResult<Cart>;

    async fn find_active(&self, user_id: &str) -> ShopResult<Option<Cart>>;

    async fn find_active_by_id(&self, cart_id: &str) -> ShopResult<Option<Cart>>;

    /// Increment an existing line or append a new one, adjusting
    /// `line_count` in the same atomic update.
    /// Fails with `CartNotFound` if the user has no active cart.
    async fn add_or_increment_line(
        &self,
        user_id: &str,
        product_id: &str,
        quantity: u32,
    ) -> ShopResult<Cart>;

    /// Set a line's absolute quantity; `quantity <= 0` removes the line.
    /// Fails with `CartNotFound` / `LineNotFound`.
    async fn set_line_quantity(
        &self,
        user_id: &str,
        product_id: &str,
        quantity: i64,
    ) -> ShopResult<Cart>;

    /// Remove a line. Removing an absent line is not an error.
    /// Fails with `CartNotFound` if the user has no active cart.
    async fn remove_line(&self, user_id: &str, product_id: &str) -> ShopResult<Cart>;

    /// Transition the user's active cart to `completed`; no-op without one.
    async fn complete_active(&self, user_id: &str) -> ShopResult<()>;
}

/// Order persistence collaborator (append-only)
#[async_trait]
pub trait OrderStore: Send + Sync {
    /// Insert a new order. Orders are unique per provider capture id;
    /// a duplicate insert fails with `Conflict`.
    async fn insert(&self, order: &Order) -> ShopResult<()>;

    async fn find_by_capture_id(&self, capture_id: &str) -> ShopResult<Option<Order>>;

    async fn find_confirmed_by_user(&self, user_id: &str) -> ShopResult<Vec<Order>>;
}

/// User persistence collaborator
#[async_trait]
pub trait UserStore: Send + Sync {
    /// Insert a new user. Fails with `UserAlreadyExists` on a duplicate email.
    async fn insert(&self, user: &User) -> ShopResult<()>;

    async fn find_by_email(&self, email: &str) -> ShopResult<Option<User>>;

    async fn find_by_id(&self, user_id: &str) -> ShopResult<Option<User>>;

    async fn update(&self, user: &User) -> ShopResult<()>;
}

/// Shared handles for injection (dynamic dispatch)
pub type SharedCatalogStore = Arc<dyn CatalogStore>;
pub type SharedCartStore = Arc<dyn CartStore>;
pub type SharedOrderStore = Arc<dyn OrderStore>;
pub type SharedUserStore = Arc<dyn UserStore>;
