// src/handlers/auth.rs

use axum::{Json, extract::State, http::StatusCode, response::IntoResponse};
use serde_json::json;
use sqlx::SqlitePool;

use crate::{
    config::Config,
    error::AppError,
    extractors::ValidatedJson,
    models::{
        response::ApiResponse,
        user::{LoginRequest, NewUser, RegisterRequest, Role},
    },
    store::users,
    utils::{
        hash::{hash_password_blocking, verify_password_blocking},
        jwt::sign_jwt,
    },
};

/// Registers a new user.
///
/// Hashes the password using Argon2 before storing it.
/// Returns 201 Created and the user object (excluding password).
pub async fn register(
    State(pool): State<SqlitePool>,
    ValidatedJson(payload): ValidatedJson<RegisterRequest>,
) -> Result<impl IntoResponse, AppError> {
    let password_hash = hash_password_blocking(payload.password).await?;

    let user = users::insert(
        &pool,
        NewUser {
            name: payload.name,
            email: payload.email,
            password_hash,
            role: Role::User,
        },
    )
    .await?;

    tracing::info!("Registered user {}", user.id);

    Ok((StatusCode::CREATED, ApiResponse::data(user)))
}

/// Authenticates a user by email and password.
///
/// If valid, signs a JWT token with the user's ID and role.
pub async fn login(
    State(pool): State<SqlitePool>,
    State(config): State<Config>,
    ValidatedJson(payload): ValidatedJson<LoginRequest>,
) -> Result<Json<ApiResponse<serde_json::Value>>, AppError> {
    let invalid = || AppError::InvalidCredentials("Incorrect Credentials".to_string());

    let user = users::find_by_email(&pool, &payload.email)
        .await?
        .ok_or_else(invalid)?;

    if !verify_password_blocking(payload.password, user.password.clone()).await? {
        return Err(invalid());
    }

    let token = sign_jwt(
        &user.id,
        user.role,
        &config.jwt_secret,
        config.jwt_expiration,
    )?;

    Ok(ApiResponse::data(json!({
        "token": token,
        "type": "Bearer",
        "userId": user.id,
        "role": user.role,
    })))
}
