//! # shop-core
//!
//! Core types and workflow for the gadget-shop backend.
//!
//! This crate provides:
//! - `Product`, `ProductAttributes`, and catalog query types
//! - `Cart` and `CartService` for per-user cart operations
//! - `CheckoutService` for review, provider-order creation, and the
//!   capture-to-order writer
//! - `PaymentGateway` and the store traits as injection seams
//! - `ShopError` for typed error handling
//! - an in-memory store backend for tests and local runs
//!
//! ## Example
//!
//! ```rust,ignore
//! use shop_core::{CartService, CheckoutService, LineGroup};
//!
//! // Add to the user's cart (stock-checked, count kept in sync)
//! cart_service.add_item(&user_id, &product_id, 3).await?;
//!
//! // Re-price from the catalog and charge the grand total
//! let (provider_order, _summary) = checkout
//!     .create_provider_order(&user_id, &cart_id, &groups)
//!     .await?;
//!
//! // After payer approval: capture and persist exactly one order
//! let order = checkout
//!     .capture_and_place_order(&user_id, &provider_order.id, &cart_id, &groups)
//!     .await?;
//! ```

pub mod cart;
pub mod checkout;
pub mod error;
pub mod gateway;
pub mod memory;
pub mod order;
pub mod product;
pub mod store;
pub mod user;

// Re-exports for convenience
pub use cart::{Cart, CartLine, CartService, CartState, CartView};
pub use checkout::{
    CheckoutService, CheckoutSummary, DiscountRef, GroupSummary, LineGroup, RequestedLine,
    ReviewedLine,
};
pub use error::{ShopError, ShopResult};
pub use gateway::{Capture, PaymentGateway, ProviderOrder, SharedPaymentGateway, CAPTURE_COMPLETED};
pub use order::{
    CheckoutTotals, Order, OrderLine, OrderStatus, PaymentRecord, PaymentStatus, ShippingAddress,
};
pub use product::{
    Currency, Price, PriceRange, Product, ProductAttributes, ProductCategory, ProductPage,
    ProductPatch, ProductQuery, ProductSnapshot, ProductSort,
};
pub use store::{
    CartStore, CatalogStore, OrderStore, SharedCartStore, SharedCatalogStore, SharedOrderStore,
    SharedUserStore, UserStore,
};
pub use user::{ProfileUpdate, Role, User, UserProfile};
