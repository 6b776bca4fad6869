//! # Bearer Token Auth
//!
//! HS256 access tokens with a 24-hour expiry. The [`AuthUser`] extractor
//! verifies the `Authorization: Bearer` header and loads the caller's
//! role, so handlers receive an authenticated identity or a 401 envelope.

use crate::response::ApiError;
use crate::state::AppState;
use axum::extract::FromRequestParts;
use axum::http::header::AUTHORIZATION;
use axum::http::request::Parts;
use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use shop_core::{Role, ShopError, ShopResult};
use std::sync::Arc;

/// Access token lifetime
const TOKEN_TTL_HOURS: i64 = 24;

#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    /// User id
    pub sub: String,
    /// Expiry as a UTC timestamp
    pub exp: usize,
}

/// Shared signing/verification keys derived from the configured secret
#[derive(Clone)]
pub struct TokenKeys {
    encoding: Arc<EncodingKey>,
    decoding: Arc<DecodingKey>,
}

impl TokenKeys {
    pub fn new(secret: &str) -> Self {
        Self {
            encoding: Arc::new(EncodingKey::from_secret(secret.as_bytes())),
            decoding: Arc::new(DecodingKey::from_secret(secret.as_bytes())),
        }
    }

    /// Issue an access token for a user
    pub fn issue(&self, user_id: &str) -> ShopResult<String> {
        let claims = Claims {
            sub: user_id.to_string(),
            exp: (Utc::now() + Duration::hours(TOKEN_TTL_HOURS)).timestamp() as usize,
        };
        encode(&Header::default(), &claims, &self.encoding)
            .map_err(|e| ShopError::Internal(format!("failed to sign token: {e}")))
    }

    /// Verify a token; expired or tampered tokens are rejected alike
    pub fn verify(&self, token: &str) -> ShopResult<Claims> {
        decode::<Claims>(token, &self.decoding, &Validation::default())
            .map(|data| data.claims)
            .map_err(|_| ShopError::Unauthorized)
    }
}

/// Authenticated caller
#[derive(Debug, Clone)]
pub struct AuthUser {
    pub id: String,
    pub role: Role,
}

impl AuthUser {
    pub fn require_admin(&self) -> ShopResult<()> {
        if self.role != Role::Admin {
            return Err(ShopError::Forbidden);
        }
        Ok(())
    }
}

impl FromRequestParts<AppState> for AuthUser {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let header = parts
            .headers
            .get(AUTHORIZATION)
            .and_then(|v| v.to_str().ok())
            .ok_or(ShopError::Unauthorized)?;

        let token = header
            .strip_prefix("Bearer ")
            .ok_or(ShopError::Unauthorized)?;

        let claims = state.tokens.verify(token)?;

        // The role comes from the store, not the token, so a role change
        // takes effect without waiting out the token expiry.
        let user = state
            .users
            .find_by_id(&claims.sub)
            .await?
            .ok_or(ShopError::Unauthorized)?;

        Ok(AuthUser {
            id: user.id,
            role: user.role,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_issue_and_verify() {
        let keys = TokenKeys::new("test-secret");
        let token = keys.issue("user-1").unwrap();
        let claims = keys.verify(&token).unwrap();
        assert_eq!(claims.sub, "user-1");
    }

    #[test]
    fn test_wrong_secret_rejected() {
        let keys = TokenKeys::new("test-secret");
        let token = keys.issue("user-1").unwrap();

        let other = TokenKeys::new("other-secret");
        assert!(matches!(
            other.verify(&token),
            Err(ShopError::Unauthorized)
        ));
    }

    #[test]
    fn test_garbage_token_rejected() {
        let keys = TokenKeys::new("test-secret");
        assert!(keys.verify("not-a-token").is_err());
    }
}
