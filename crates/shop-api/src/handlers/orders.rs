//! Order history.

use crate::auth::AuthUser;
use crate::response::{respond, ApiResult};
use crate::state::AppState;
use axum::extract::State;
use axum::response::IntoResponse;

/// All confirmed orders for the current user, newest first
pub async fn completed(
    auth: AuthUser,
    State(state): State<AppState>,
) -> ApiResult<impl IntoResponse> {
    let orders = state.orders.find_confirmed_by_user(&auth.id).await?;
    Ok(respond(orders, "Completed orders retrieved successfully"))
}
