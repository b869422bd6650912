use std::sync::Arc;

use axum::{
    Json,
    extract::{Path, State},
};
use sqlx::SqlitePool;

use crate::{
    access::{self, UserDeletion},
    error::AppError,
    extractors::ValidatedJson,
    integrity::{self, CascadeReport},
    models::{
        response::ApiResponse,
        user::{DeleteUserRequest, PublicUser, UpdateUserRequest, User, UserChanges},
    },
    store::users,
    utils::{
        hash::{hash_password_blocking, verify_password_blocking},
        image::ImageHost,
        jwt::{AdminUser, CurrentUser},
    },
};

/// Updates the caller's own profile. Any subset of name, email and password
/// may be sent; a new password is re-hashed.
pub async fn update_user(
    State(pool): State<SqlitePool>,
    caller: CurrentUser,
    ValidatedJson(payload): ValidatedJson<UpdateUserRequest>,
) -> Result<Json<ApiResponse<User>>, AppError> {
    let password_hash = match payload.password {
        Some(password) => Some(hash_password_blocking(password).await?),
        None => None,
    };

    let changes = UserChanges {
        name: payload.name,
        email: payload.email,
        password_hash,
    };

    let user = users::update(&pool, &caller.id, changes)
        .await?
        .ok_or(AppError::NotFound("User does not exist".to_string()))?;

    Ok(ApiResponse::data(user))
}

/// Deletes an account and everything that depends on it.
///
/// Admins may delete anyone without a password; everyone else may only
/// delete themselves and must re-enter their password.
pub async fn delete_user(
    State(pool): State<SqlitePool>,
    State(images): State<Arc<dyn ImageHost>>,
    caller: CurrentUser,
    ValidatedJson(payload): ValidatedJson<DeleteUserRequest>,
) -> Result<Json<ApiResponse<CascadeReport>>, AppError> {
    let target = users::find_by_id(&pool, &payload.user_id)
        .await?
        .ok_or(AppError::NotFound("User does not exist".to_string()))?;

    if access::authorize_user_deletion(&caller, &target.id)? == UserDeletion::BySelf {
        let incorrect = || AppError::InvalidCredentials("Incorrect Credentials".to_string());
        let password = payload.password.ok_or_else(incorrect)?;
        if !verify_password_blocking(password, target.password.clone()).await? {
            return Err(incorrect());
        }
    }

    let report = integrity::delete_user(&pool, images.as_ref(), &target.id).await?;

    Ok(ApiResponse::with_message("User deleted successfully", report))
}

/// Public profile: name and reference lists only.
pub async fn get_user(
    State(pool): State<SqlitePool>,
    Path(user_id): Path<String>,
) -> Result<Json<ApiResponse<PublicUser>>, AppError> {
    let user = users::find_by_id(&pool, &user_id)
        .await?
        .ok_or(AppError::NotFound("User not found".to_string()))?;

    Ok(ApiResponse::data(user.into()))
}

/// Lists all users.
/// Admin only.
pub async fn list_users(
    State(pool): State<SqlitePool>,
    _admin: AdminUser,
) -> Result<Json<ApiResponse<Vec<PublicUser>>>, AppError> {
    let users = users::list_all(&pool)
        .await?
        .into_iter()
        .map(PublicUser::from)
        .collect();

    Ok(ApiResponse::data(users))
}
