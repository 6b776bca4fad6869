//! # Request Handlers
//!
//! Axum handlers, one module per resource. All of them answer with the
//! `{success, data?, errors?, message?}` envelope.

pub mod auth;
pub mod cart;
pub mod checkout;
pub mod orders;
pub mod products;
pub mod users;

use axum::response::IntoResponse;
use axum::Json;

/// Health check endpoint
pub async fn health() -> impl IntoResponse {
    Json(serde_json::json!({
        "status": "healthy",
        "service": "gadget-shop",
        "version": env!("CARGO_PKG_VERSION")
    }))
}
