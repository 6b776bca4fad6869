//! Checkout: review, provider order creation, capture-to-order.

use crate::auth::AuthUser;
use crate::response::{respond, ApiResult};
use crate::state::AppState;
use axum::extract::{Path, State};
use axum::response::IntoResponse;
use axum::Json;
use serde::{Deserialize, Serialize};
use shop_core::{CheckoutSummary, LineGroup, ProviderOrder};
use tracing::instrument;

/// Cart id plus the discount-bucketed line groups. Claimed prices inside
/// the groups never reach a total; every review re-prices from the
/// catalog.
#[derive(Debug, Deserialize)]
pub struct CheckoutRequest {
    pub cart_id: String,
    #[serde(default)]
    pub order_groups: Vec<LineGroup>,
}

/// Advisory re-pricing pass; reserves nothing
#[instrument(skip(state, auth, request), fields(user_id = %auth.id))]
pub async fn review(
    auth: AuthUser,
    State(state): State<AppState>,
    Json(request): Json<CheckoutRequest>,
) -> ApiResult<impl IntoResponse> {
    let summary = state
        .checkout
        .review(&auth.id, &request.cart_id, &request.order_groups)
        .await?;
    Ok(respond(
        summary,
        "Checkout Order Review retrieved successfully",
    ))
}

#[derive(Debug, Serialize)]
pub struct ProviderOrderData {
    pub provider_order: ProviderOrder,
    pub summary: CheckoutSummary,
}

/// Re-review server-side and create a provider order for the grand total
#[instrument(skip(state, auth, request), fields(user_id = %auth.id))]
pub async fn create_provider_order(
    auth: AuthUser,
    State(state): State<AppState>,
    Json(request): Json<CheckoutRequest>,
) -> ApiResult<impl IntoResponse> {
    let (provider_order, summary) = state
        .checkout
        .create_provider_order(&auth.id, &request.cart_id, &request.order_groups)
        .await?;
    Ok(respond(
        ProviderOrderData {
            provider_order,
            summary,
        },
        "Payment order created",
    ))
}

/// Capture an approved provider order and persist the confirmed shop
/// order. Re-captures of the same provider order return the order that
/// was already written.
#[instrument(skip(state, auth, request), fields(user_id = %auth.id))]
pub async fn capture(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(provider_order_id): Path<String>,
    Json(request): Json<CheckoutRequest>,
) -> ApiResult<impl IntoResponse> {
    let order = state
        .checkout
        .capture_and_place_order(
            &auth.id,
            &provider_order_id,
            &request.cart_id,
            &request.order_groups,
        )
        .await?;
    Ok(respond(order, "Order captured successfully"))
}
