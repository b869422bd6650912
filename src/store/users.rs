use chrono::Utc;
use sqlx::{SqliteExecutor, SqlitePool};

use crate::{
    error::AppError,
    models::user::{NewUser, User, UserChanges},
};

const COLUMNS: &str = "id, name, email, password, role, posts, comments, created_at, updated_at";

/// Maps a unique-constraint violation on `users.email` to `DuplicateEmail`.
fn map_unique_email(err: sqlx::Error, email: &str) -> AppError {
    match err.as_database_error() {
        Some(db_err) if db_err.is_unique_violation() => {
            AppError::DuplicateEmail(format!("Email '{}' is already registered", email))
        }
        _ => AppError::from(err),
    }
}

/// Inserts a user with empty reference lists.
pub async fn insert(pool: &SqlitePool, new_user: NewUser) -> Result<User, AppError> {
    if find_by_email(pool, &new_user.email).await?.is_some() {
        return Err(AppError::DuplicateEmail(format!(
            "Email '{}' is already registered",
            new_user.email
        )));
    }

    let now = Utc::now();
    let sql = format!(
        "INSERT INTO users (id, name, email, password, role, created_at, updated_at) \
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?6) \
         RETURNING {COLUMNS}"
    );

    sqlx::query_as::<_, User>(&sql)
        .bind(crate::store::new_id())
        .bind(&new_user.name)
        .bind(&new_user.email)
        .bind(&new_user.password_hash)
        .bind(new_user.role)
        .bind(now)
        .fetch_one(pool)
        .await
        .map_err(|e| map_unique_email(e, &new_user.email))
}

pub async fn find_by_id<'e>(
    db: impl SqliteExecutor<'e>,
    id: &str,
) -> Result<Option<User>, AppError> {
    let sql = format!("SELECT {COLUMNS} FROM users WHERE id = ?1");
    Ok(sqlx::query_as::<_, User>(&sql)
        .bind(id)
        .fetch_optional(db)
        .await?)
}

pub async fn find_by_email<'e>(
    db: impl SqliteExecutor<'e>,
    email: &str,
) -> Result<Option<User>, AppError> {
    let sql = format!("SELECT {COLUMNS} FROM users WHERE email = ?1");
    Ok(sqlx::query_as::<_, User>(&sql)
        .bind(email)
        .fetch_optional(db)
        .await?)
}

pub async fn exists<'e>(db: impl SqliteExecutor<'e>, id: &str) -> Result<bool, AppError> {
    Ok(
        sqlx::query_scalar::<_, bool>("SELECT EXISTS (SELECT 1 FROM users WHERE id = ?1)")
            .bind(id)
            .fetch_one(db)
            .await?,
    )
}

/// All users in registration order.
pub async fn list_all(pool: &SqlitePool) -> Result<Vec<User>, AppError> {
    let sql = format!("SELECT {COLUMNS} FROM users ORDER BY rowid");
    Ok(sqlx::query_as::<_, User>(&sql).fetch_all(pool).await?)
}

/// Applies the provided fields. Returns `None` if the user does not exist.
pub async fn update(
    pool: &SqlitePool,
    id: &str,
    changes: UserChanges,
) -> Result<Option<User>, AppError> {
    if let Some(email) = &changes.email {
        if let Some(other) = find_by_email(pool, email).await? {
            if other.id != id {
                return Err(AppError::DuplicateEmail(format!(
                    "Email '{}' is already registered",
                    email
                )));
            }
        }
    }

    let sql = format!(
        "UPDATE users SET \
           name = COALESCE(?1, name), \
           email = COALESCE(?2, email), \
           password = COALESCE(?3, password), \
           updated_at = ?4 \
         WHERE id = ?5 \
         RETURNING {COLUMNS}"
    );

    sqlx::query_as::<_, User>(&sql)
        .bind(&changes.name)
        .bind(&changes.email)
        .bind(&changes.password_hash)
        .bind(Utc::now())
        .bind(id)
        .fetch_optional(pool)
        .await
        .map_err(|e| map_unique_email(e, changes.email.as_deref().unwrap_or_default()))
}

/// Removes the user document only. Callers wanting referential consistency
/// go through [`crate::integrity::delete_user`].
pub async fn delete_record<'e>(db: impl SqliteExecutor<'e>, id: &str) -> Result<bool, AppError> {
    let result = sqlx::query("DELETE FROM users WHERE id = ?1")
        .bind(id)
        .execute(db)
        .await?;
    Ok(result.rows_affected() > 0)
}
