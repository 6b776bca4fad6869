//! # Routes
//!
//! Axum router configuration for the shop API.
//!
//! Routes:
//! - Auth:
//!   - POST /auth/login - Login with email/password
//! - Users:
//!   - POST /users - Register (active cart auto-created)
//!   - GET  /users/me - Current user
//!   - PUT  /users/{user_id} - Self-service profile update
//! - Products:
//!   - GET   /products - Published list (filters, sort, pagination)
//!   - GET   /products/search - Same listing, name/description search
//!   - GET   /products/{product_id} - Single published product
//!   - POST  /products - Create (admin)
//!   - PATCH /products/{product_id} - Partial update (admin)
//!   - PATCH /products/{product_id}/stock - Absolute stock set (admin)
//! - Cart:
//!   - POST   /cart - Add/increment a line
//!   - GET    /cart - Active cart with snapshots
//!   - PATCH  /cart/update - Absolute line quantity
//!   - DELETE /cart - Remove a line
//! - Checkout:
//!   - POST /checkout - Review (re-priced from the catalog)
//!   - POST /checkout/orders - Create provider payment order
//!   - POST /checkout/orders/{provider_order_id}/capture - Capture and
//!     persist the confirmed order
//! - Orders:
//!   - GET /orders/completed - Caller's confirmed orders

use crate::handlers;
use crate::state::AppState;
use axum::{
    routing::{get, patch, post, put},
    Router,
};
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

/// Create the main application router
pub fn create_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let auth_routes = Router::new().route("/login", post(handlers::auth::login));

    let user_routes = Router::new()
        .route("/", post(handlers::users::register))
        .route("/me", get(handlers::users::me))
        .route("/{user_id}", put(handlers::users::update_profile));

    let product_routes = Router::new()
        .route(
            "/",
            get(handlers::products::list).post(handlers::products::create),
        )
        // Same listing handler; the search page passes ?search=
        .route("/search", get(handlers::products::list))
        .route(
            "/{product_id}",
            get(handlers::products::get).patch(handlers::products::update),
        )
        .route("/{product_id}/stock", patch(handlers::products::set_stock));

    let cart_routes = Router::new()
        .route(
            "/",
            post(handlers::cart::add)
                .get(handlers::cart::get)
                .delete(handlers::cart::remove),
        )
        .route("/update", patch(handlers::cart::update_quantity));

    let checkout_routes = Router::new()
        .route("/", post(handlers::checkout::review))
        .route("/orders", post(handlers::checkout::create_provider_order))
        .route(
            "/orders/{provider_order_id}/capture",
            post(handlers::checkout::capture),
        );

    let order_routes = Router::new().route("/completed", get(handlers::orders::completed));

    Router::new()
        // Health check at root
        .route("/health", get(handlers::health))
        .route("/", get(handlers::health))
        // Resources
        .nest("/auth", auth_routes)
        .nest("/users", user_routes)
        .nest("/products", product_routes)
        .nest("/cart", cart_routes)
        .nest("/checkout", checkout_routes)
        .nest("/orders", order_routes)
        // Middleware
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        // State
        .with_state(state)
}
