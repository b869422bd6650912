// src/models/user.rs

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, types::Json};
use validator::Validate;

use super::fields;

/// Account role. Admins bypass ownership checks where the access rules allow it.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[serde(rename_all = "lowercase")]
#[sqlx(rename_all = "lowercase")]
pub enum Role {
    #[default]
    User,
    Admin,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::User => "user",
            Role::Admin => "admin",
        }
    }
}

/// Represents a user document.
#[derive(Debug, Clone, FromRow, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: String,

    pub name: String,

    /// Unique, stored lowercased.
    pub email: String,

    /// Argon2 password hash.
    /// Skipped during serialization to prevent leaking sensitive data.
    #[serde(skip)]
    pub password: String,

    pub role: Role,

    /// Ids of the posts this user owns, in creation order.
    pub posts: Json<Vec<String>>,

    /// Ids of the comments this user authored, in creation order.
    pub comments: Json<Vec<String>>,

    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Public projection of a user: name and reference lists only.
#[derive(Debug, Clone, Serialize)]
pub struct PublicUser {
    pub id: String,
    pub name: String,
    pub posts: Vec<String>,
    pub comments: Vec<String>,
}

impl From<User> for PublicUser {
    fn from(user: User) -> Self {
        Self {
            id: user.id,
            name: user.name,
            posts: user.posts.0,
            comments: user.comments.0,
        }
    }
}

/// Fields needed to insert a user. The password is already hashed.
#[derive(Debug)]
pub struct NewUser {
    pub name: String,
    pub email: String,
    pub password_hash: String,
    pub role: Role,
}

/// Partial update applied to a user document.
#[derive(Debug, Default)]
pub struct UserChanges {
    pub name: Option<String>,
    pub email: Option<String>,
    pub password_hash: Option<String>,
}

/// DTO for creating a new user (Registration).
#[derive(Debug, Deserialize, Validate)]
pub struct RegisterRequest {
    #[serde(deserialize_with = "fields::trimmed")]
    #[validate(length(
        min = 3,
        max = 50,
        message = "Name length must be between 3 and 50 characters."
    ))]
    pub name: String,

    #[serde(deserialize_with = "fields::email")]
    #[validate(email(message = "A valid email is required."))]
    pub email: String,

    #[validate(length(min = 6, message = "Password must be at least 6 characters."))]
    pub password: String,
}

/// DTO for user login.
#[derive(Debug, Deserialize, Validate)]
pub struct LoginRequest {
    #[serde(deserialize_with = "fields::email")]
    #[validate(email(message = "A valid email is required."))]
    pub email: String,
    #[validate(length(min = 1, max = 128))]
    pub password: String,
}

/// DTO for editing one's own profile. Any subset of fields may be sent.
#[derive(Debug, Default, Deserialize, Validate)]
pub struct UpdateUserRequest {
    #[serde(default, deserialize_with = "fields::trimmed_opt")]
    #[validate(length(
        min = 3,
        max = 50,
        message = "Name length must be between 3 and 50 characters."
    ))]
    pub name: Option<String>,

    #[serde(default, deserialize_with = "fields::email_opt")]
    #[validate(email(message = "A valid email is required."))]
    pub email: Option<String>,

    #[validate(length(min = 6, message = "Password must be at least 6 characters."))]
    pub password: Option<String>,
}

/// DTO for deleting an account.
#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct DeleteUserRequest {
    #[validate(length(min = 1, message = "userId is required"))]
    pub user_id: String,
    pub password: Option<String>,
}
