//! Registration and profile management.

use crate::auth::AuthUser;
use crate::handlers::auth::AuthData;
use crate::password;
use crate::response::{respond, ApiResult};
use crate::state::AppState;
use axum::extract::{Path, State};
use axum::response::IntoResponse;
use axum::Json;
use serde::Deserialize;
use shop_core::{ProfileUpdate, ShopError, User};
use tracing::{info, instrument};

#[derive(Debug, Deserialize)]
pub struct RegisterRequest {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub phone: String,
    pub password: String,
}

/// Register a new user. The user's active cart is created alongside the
/// account so the first add-to-cart never races cart creation.
#[instrument(skip(state, request), fields(email = %request.email))]
pub async fn register(
    State(state): State<AppState>,
    Json(request): Json<RegisterRequest>,
) -> ApiResult<impl IntoResponse> {
    if request.email.is_empty() || !request.email.contains('@') {
        return Err(ShopError::InvalidRequest("Invalid email".to_string()).into());
    }
    if request.password.is_empty() {
        return Err(ShopError::InvalidRequest("Invalid password".to_string()).into());
    }
    if request.first_name.is_empty() || request.last_name.is_empty() {
        return Err(ShopError::InvalidRequest("Name is required".to_string()).into());
    }

    if state
        .users
        .find_by_email(&request.email)
        .await?
        .is_some()
    {
        return Err(ShopError::UserAlreadyExists {
            email: request.email,
        }
        .into());
    }

    let user = User::new(
        request.first_name,
        request.last_name,
        request.email,
        request.phone,
        password::hash_password(&request.password),
    );
    state.users.insert(&user).await?;

    state.carts.ensure_active(&user.id).await?;
    let access_token = state.tokens.issue(&user.id)?;

    info!(user_id = %user.id, "registered user");

    Ok(respond(
        AuthData {
            user: user.profile(),
            access_token,
        },
        "create user successfully",
    ))
}

/// Current user's profile
pub async fn me(
    auth: AuthUser,
    State(state): State<AppState>,
) -> ApiResult<impl IntoResponse> {
    let user = state
        .users
        .find_by_id(&auth.id)
        .await?
        .ok_or(ShopError::UserNotFound { user_id: auth.id })?;

    Ok(respond(user.profile(), "get current user successfully"))
}

/// Self-service profile update over the allow-listed fields
#[instrument(skip(state, auth, update))]
pub async fn update_profile(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(user_id): Path<String>,
    Json(update): Json<ProfileUpdate>,
) -> ApiResult<impl IntoResponse> {
    if auth.id != user_id {
        return Err(ShopError::Forbidden.into());
    }

    let mut user = state
        .users
        .find_by_id(&user_id)
        .await?
        .ok_or(ShopError::UserNotFound { user_id })?;

    if let Some(new_password) = update.password.as_deref().filter(|p| !p.is_empty()) {
        user.password_hash = password::hash_password(new_password);
    }
    update.apply(&mut user);

    state.users.update(&user).await?;

    Ok(respond(user.profile(), "Update user successfully"))
}
