//! Cart operations for the authenticated user.

use crate::auth::AuthUser;
use crate::response::{respond, ApiResult};
use crate::state::AppState;
use axum::extract::State;
use axum::response::IntoResponse;
use axum::Json;
use serde::Deserialize;
use tracing::instrument;

#[derive(Debug, Deserialize)]
pub struct AddToCartRequest {
    pub product: CartItemRequest,
}

#[derive(Debug, Deserialize)]
pub struct CartItemRequest {
    pub product_id: String,
    pub quantity: u32,
}

/// Add a product to the cart, merging into an existing line
#[instrument(skip(state, auth, request), fields(user_id = %auth.id))]
pub async fn add(
    auth: AuthUser,
    State(state): State<AppState>,
    Json(request): Json<AddToCartRequest>,
) -> ApiResult<impl IntoResponse> {
    let view = state
        .carts
        .add_item(&auth.id, &request.product.product_id, request.product.quantity)
        .await?;
    Ok(respond(view, "Product added to cart successfully"))
}

/// The active cart with product snapshots resolved
pub async fn get(auth: AuthUser, State(state): State<AppState>) -> ApiResult<impl IntoResponse> {
    let view = state.carts.list(&auth.id).await?;
    Ok(respond(view, "Get list products in Cart successfully"))
}

#[derive(Debug, Deserialize)]
pub struct UpdateQuantityRequest {
    pub product_id: String,
    /// Absolute quantity; zero or less removes the line
    pub quantity: i64,
}

/// Set a line's absolute quantity
#[instrument(skip(state, auth, request), fields(user_id = %auth.id))]
pub async fn update_quantity(
    auth: AuthUser,
    State(state): State<AppState>,
    Json(request): Json<UpdateQuantityRequest>,
) -> ApiResult<impl IntoResponse> {
    let view = state
        .carts
        .set_item_quantity(&auth.id, &request.product_id, request.quantity)
        .await?;
    Ok(respond(
        view,
        "Updated product quantity in cart successfully",
    ))
}

#[derive(Debug, Deserialize)]
pub struct RemoveFromCartRequest {
    pub product_id: String,
}

/// Remove a line; removing an absent line is a no-op
#[instrument(skip(state, auth, request), fields(user_id = %auth.id))]
pub async fn remove(
    auth: AuthUser,
    State(state): State<AppState>,
    Json(request): Json<RemoveFromCartRequest>,
) -> ApiResult<impl IntoResponse> {
    let view = state
        .carts
        .remove_item(&auth.id, &request.product_id)
        .await?;
    Ok(respond(view, "Deleted product from cart successfully"))
}
