use chrono::Utc;
use sqlx::{SqliteExecutor, SqlitePool, types::Json};

use crate::{
    error::AppError,
    models::post::{NewPost, Post, PostChanges},
};

const COLUMNS: &str =
    "id, title, text, category, image, user_id, is_featured, comments, likes, created_at, updated_at";

/// Inserts a post with empty comment and like lists.
pub async fn insert<'e>(db: impl SqliteExecutor<'e>, new_post: NewPost) -> Result<Post, AppError> {
    let now = Utc::now();
    let sql = format!(
        "INSERT INTO posts (id, title, text, category, image, user_id, created_at, updated_at) \
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?7) \
         RETURNING {COLUMNS}"
    );

    Ok(sqlx::query_as::<_, Post>(&sql)
        .bind(crate::store::new_id())
        .bind(&new_post.title)
        .bind(&new_post.text)
        .bind(new_post.category)
        .bind(new_post.image.map(Json))
        .bind(&new_post.user_id)
        .bind(now)
        .fetch_one(db)
        .await?)
}

pub async fn find_by_id<'e>(
    db: impl SqliteExecutor<'e>,
    id: &str,
) -> Result<Option<Post>, AppError> {
    let sql = format!("SELECT {COLUMNS} FROM posts WHERE id = ?1");
    Ok(sqlx::query_as::<_, Post>(&sql)
        .bind(id)
        .fetch_optional(db)
        .await?)
}

pub async fn exists<'e>(db: impl SqliteExecutor<'e>, id: &str) -> Result<bool, AppError> {
    Ok(
        sqlx::query_scalar::<_, bool>("SELECT EXISTS (SELECT 1 FROM posts WHERE id = ?1)")
            .bind(id)
            .fetch_one(db)
            .await?,
    )
}

/// Exact-match title lookup used by the creation-time uniqueness check.
pub async fn title_taken<'e>(db: impl SqliteExecutor<'e>, title: &str) -> Result<bool, AppError> {
    Ok(
        sqlx::query_scalar::<_, bool>("SELECT EXISTS (SELECT 1 FROM posts WHERE title = ?1)")
            .bind(title)
            .fetch_one(db)
            .await?,
    )
}

/// Every post, in creation order. Unpaginated.
pub async fn list_all(pool: &SqlitePool) -> Result<Vec<Post>, AppError> {
    let sql = format!("SELECT {COLUMNS} FROM posts ORDER BY rowid");
    Ok(sqlx::query_as::<_, Post>(&sql).fetch_all(pool).await?)
}

/// Ids of every post whose owner field is `user_id`.
pub async fn ids_by_owner<'e>(
    db: impl SqliteExecutor<'e>,
    user_id: &str,
) -> Result<Vec<String>, AppError> {
    Ok(
        sqlx::query_scalar::<_, String>("SELECT id FROM posts WHERE user_id = ?1 ORDER BY rowid")
            .bind(user_id)
            .fetch_all(db)
            .await?,
    )
}

/// Applies the provided fields. Returns `None` if the post does not exist.
pub async fn update<'e>(
    db: impl SqliteExecutor<'e>,
    id: &str,
    changes: PostChanges,
) -> Result<Option<Post>, AppError> {
    let sql = format!(
        "UPDATE posts SET \
           title = COALESCE(?1, title), \
           text = COALESCE(?2, text), \
           category = COALESCE(?3, category), \
           image = COALESCE(?4, image), \
           is_featured = COALESCE(?5, is_featured), \
           updated_at = ?6 \
         WHERE id = ?7 \
         RETURNING {COLUMNS}"
    );

    Ok(sqlx::query_as::<_, Post>(&sql)
        .bind(changes.title)
        .bind(changes.text)
        .bind(changes.category)
        .bind(changes.image.map(Json))
        .bind(changes.is_featured)
        .bind(Utc::now())
        .bind(id)
        .fetch_optional(db)
        .await?)
}

/// Removes the post document only. Callers wanting the cascade go through
/// [`crate::integrity::delete_post`].
pub async fn delete_record<'e>(db: impl SqliteExecutor<'e>, id: &str) -> Result<bool, AppError> {
    let result = sqlx::query("DELETE FROM posts WHERE id = ?1")
        .bind(id)
        .execute(db)
        .await?;
    Ok(result.rows_affected() > 0)
}
