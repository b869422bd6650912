use chrono::Utc;
use sqlx::{SqliteExecutor, SqlitePool};

use crate::{error::AppError, models::comment::Comment};

const COLUMNS: &str = "id, user_id, post_id, comment, likes, created_at, updated_at";

/// Inserts a comment document. Linking it into its post and author is done
/// by [`crate::integrity::link_comment`].
pub async fn insert<'e>(
    db: impl SqliteExecutor<'e>,
    user_id: &str,
    post_id: &str,
    text: &str,
) -> Result<Comment, AppError> {
    let sql = format!(
        "INSERT INTO comments (id, user_id, post_id, comment, created_at, updated_at) \
         VALUES (?1, ?2, ?3, ?4, ?5, ?5) \
         RETURNING {COLUMNS}"
    );

    Ok(sqlx::query_as::<_, Comment>(&sql)
        .bind(crate::store::new_id())
        .bind(user_id)
        .bind(post_id)
        .bind(text)
        .bind(Utc::now())
        .fetch_one(db)
        .await?)
}

pub async fn find_by_id<'e>(
    db: impl SqliteExecutor<'e>,
    id: &str,
) -> Result<Option<Comment>, AppError> {
    let sql = format!("SELECT {COLUMNS} FROM comments WHERE id = ?1");
    Ok(sqlx::query_as::<_, Comment>(&sql)
        .bind(id)
        .fetch_optional(db)
        .await?)
}

/// Comments whose parent is `post_id`, oldest first.
pub async fn list_by_post(pool: &SqlitePool, post_id: &str) -> Result<Vec<Comment>, AppError> {
    let sql = format!("SELECT {COLUMNS} FROM comments WHERE post_id = ?1 ORDER BY rowid");
    Ok(sqlx::query_as::<_, Comment>(&sql)
        .bind(post_id)
        .fetch_all(pool)
        .await?)
}

pub async fn ids_by_post<'e>(
    db: impl SqliteExecutor<'e>,
    post_id: &str,
) -> Result<Vec<String>, AppError> {
    Ok(
        sqlx::query_scalar::<_, String>("SELECT id FROM comments WHERE post_id = ?1 ORDER BY rowid")
            .bind(post_id)
            .fetch_all(db)
            .await?,
    )
}

pub async fn ids_by_owner<'e>(
    db: impl SqliteExecutor<'e>,
    user_id: &str,
) -> Result<Vec<String>, AppError> {
    Ok(
        sqlx::query_scalar::<_, String>("SELECT id FROM comments WHERE user_id = ?1 ORDER BY rowid")
            .bind(user_id)
            .fetch_all(db)
            .await?,
    )
}

/// Replaces the comment text. Returns `None` if the comment does not exist.
pub async fn update_text<'e>(
    db: impl SqliteExecutor<'e>,
    id: &str,
    text: &str,
) -> Result<Option<Comment>, AppError> {
    let sql = format!(
        "UPDATE comments SET comment = ?1, updated_at = ?2 WHERE id = ?3 RETURNING {COLUMNS}"
    );

    Ok(sqlx::query_as::<_, Comment>(&sql)
        .bind(text)
        .bind(Utc::now())
        .bind(id)
        .fetch_optional(db)
        .await?)
}

/// Removes the comment document only.
pub async fn delete_record<'e>(db: impl SqliteExecutor<'e>, id: &str) -> Result<bool, AppError> {
    let result = sqlx::query("DELETE FROM comments WHERE id = ?1")
        .bind(id)
        .execute(db)
        .await?;
    Ok(result.rows_affected() > 0)
}
