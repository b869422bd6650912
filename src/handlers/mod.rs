// src/handlers/mod.rs

pub mod auth;
pub mod comment;
pub mod post;
pub mod user;

use sqlx::SqlitePool;

use crate::{error::AppError, store::users, utils::jwt::CurrentUser};

/// Tokens can outlive their user; writes that record the caller's id must
/// not create references to a deleted account.
pub(crate) async fn ensure_caller_exists(
    pool: &SqlitePool,
    caller: &CurrentUser,
) -> Result<(), AppError> {
    if users::exists(pool, &caller.id).await? {
        Ok(())
    } else {
        Err(AppError::NotFound("User not found".to_string()))
    }
}
