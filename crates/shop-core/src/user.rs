//! # User Types
//!
//! Accounts with a role flag and optional profile/address fields.
//! The stored record carries the password digest; [`User::profile`] is the
//! outward-facing view with the digest stripped.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum Role {
    #[default]
    User,
    Admin,
}

/// A stored user record
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    pub id: String,
    pub first_name: String,
    pub last_name: String,
    /// Unique across users
    pub email: String,
    pub phone: String,
    /// Salted digest; never serialized outward (see [`User::profile`])
    pub password_hash: String,
    #[serde(default)]
    pub role: Role,
    #[serde(default)]
    pub avatar_url: String,
    #[serde(default)]
    pub cover_url: String,
    #[serde(default)]
    pub city: String,
    #[serde(default)]
    pub country: String,
    #[serde(default)]
    pub state: String,
    #[serde(default)]
    pub zip_code: String,
    #[serde(default)]
    pub address: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl User {
    pub fn new(
        first_name: impl Into<String>,
        last_name: impl Into<String>,
        email: impl Into<String>,
        phone: impl Into<String>,
        password_hash: impl Into<String>,
    ) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4().to_string(),
            first_name: first_name.into(),
            last_name: last_name.into(),
            email: email.into(),
            phone: phone.into(),
            password_hash: password_hash.into(),
            role: Role::User,
            avatar_url: String::new(),
            cover_url: String::new(),
            city: String::new(),
            country: String::new(),
            state: String::new(),
            zip_code: String::new(),
            address: String::new(),
            created_at: now,
            updated_at: now,
        }
    }

    pub fn is_admin(&self) -> bool {
        self.role == Role::Admin
    }

    /// Outward-facing view without the password digest
    pub fn profile(&self) -> UserProfile {
        UserProfile {
            id: self.id.clone(),
            first_name: self.first_name.clone(),
            last_name: self.last_name.clone(),
            email: self.email.clone(),
            phone: self.phone.clone(),
            role: self.role,
            avatar_url: self.avatar_url.clone(),
            cover_url: self.cover_url.clone(),
            city: self.city.clone(),
            country: self.country.clone(),
            state: self.state.clone(),
            zip_code: self.zip_code.clone(),
            address: self.address.clone(),
            created_at: self.created_at,
            updated_at: self.updated_at,
        }
    }
}

/// What API responses expose of a user
#[derive(Debug, Clone, Serialize)]
pub struct UserProfile {
    pub id: String,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub phone: String,
    pub role: Role,
    pub avatar_url: String,
    pub cover_url: String,
    pub city: String,
    pub country: String,
    pub state: String,
    pub zip_code: String,
    pub address: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Self-service profile update over an allow-list of fields.
/// A password change is handled separately by the API layer, which owns
/// digest computation.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ProfileUpdate {
    #[serde(default)]
    pub first_name: Option<String>,
    #[serde(default)]
    pub last_name: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub password: Option<String>,
    #[serde(default)]
    pub avatar_url: Option<String>,
    #[serde(default)]
    pub cover_url: Option<String>,
    #[serde(default)]
    pub city: Option<String>,
    #[serde(default)]
    pub country: Option<String>,
    #[serde(default)]
    pub state: Option<String>,
    #[serde(default)]
    pub zip_code: Option<String>,
    #[serde(default)]
    pub address: Option<String>,
}

impl ProfileUpdate {
    /// Apply every allow-listed field except the password
    pub fn apply(&self, user: &mut User) {
        if let Some(v) = &self.first_name {
            user.first_name = v.clone();
        }
        if let Some(v) = &self.last_name {
            user.last_name = v.clone();
        }
        if let Some(v) = &self.email {
            user.email = v.clone();
        }
        if let Some(v) = &self.phone {
            user.phone = v.clone();
        }
        if let Some(v) = &self.avatar_url {
            user.avatar_url = v.clone();
        }
        if let Some(v) = &self.cover_url {
            user.cover_url = v.clone();
        }
        if let Some(v) = &self.city {
            user.city = v.clone();
        }
        if let Some(v) = &self.country {
            user.country = v.clone();
        }
        if let Some(v) = &self.state {
            user.state = v.clone();
        }
        if let Some(v) = &self.zip_code {
            user.zip_code = v.clone();
        }
        if let Some(v) = &self.address {
            user.address = v.clone();
        }
        user.updated_at = Utc::now();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_profile_strips_digest() {
        let user = User::new("Ada", "Lovelace", "ada@example.com", "555-0101", "salt$digest");
        let json = serde_json::to_value(user.profile()).unwrap();
        assert!(json.get("password_hash").is_none());
        assert_eq!(json["email"], "ada@example.com");
        assert_eq!(json["role"], "User");
    }

    #[test]
    fn test_profile_update_skips_password() {
        let mut user = User::new("Ada", "Lovelace", "ada@example.com", "555-0101", "old");
        let update = ProfileUpdate {
            city: Some("London".into()),
            password: Some("ignored-here".into()),
            ..Default::default()
        };
        update.apply(&mut user);
        assert_eq!(user.city, "London");
        assert_eq!(user.password_hash, "old");
    }
}
