//! Login.

use crate::password;
use crate::response::{respond, ApiResult};
use crate::state::AppState;
use axum::extract::State;
use axum::response::IntoResponse;
use axum::Json;
use serde::{Deserialize, Serialize};
use shop_core::{ShopError, UserProfile};
use tracing::instrument;

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

/// Authenticated user plus a fresh access token
#[derive(Debug, Serialize)]
pub struct AuthData {
    pub user: UserProfile,
    pub access_token: String,
}

/// Login with email and password
#[instrument(skip(state, request), fields(email = %request.email))]
pub async fn login(
    State(state): State<AppState>,
    Json(request): Json<LoginRequest>,
) -> ApiResult<impl IntoResponse> {
    if request.email.is_empty() || !request.email.contains('@') {
        return Err(ShopError::InvalidRequest("Invalid email".to_string()).into());
    }
    if request.password.is_empty() {
        return Err(ShopError::InvalidRequest("Invalid password".to_string()).into());
    }

    let user = state
        .users
        .find_by_email(&request.email)
        .await?
        .ok_or(ShopError::InvalidCredentials)?;

    if !password::verify_password(&request.password, &user.password_hash) {
        return Err(ShopError::InvalidCredentials.into());
    }

    let access_token = state.tokens.issue(&user.id)?;

    Ok(respond(
        AuthData {
            user: user.profile(),
            access_token,
        },
        "Login successfully",
    ))
}
