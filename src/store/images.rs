use chrono::Utc;
use sqlx::SqliteExecutor;

use crate::{
    error::AppError,
    models::post::{HostedImage, PostImage},
};

/// Remembers an asset the image host just issued to `user_id`.
pub async fn record<'e>(
    db: impl SqliteExecutor<'e>,
    image: &PostImage,
    user_id: &str,
) -> Result<(), AppError> {
    sqlx::query("INSERT INTO images (public_id, url, user_id, created_at) VALUES (?1, ?2, ?3, ?4)")
        .bind(&image.public_id)
        .bind(&image.url)
        .bind(user_id)
        .bind(Utc::now())
        .execute(db)
        .await?;
    Ok(())
}

pub async fn find<'e>(
    db: impl SqliteExecutor<'e>,
    public_id: &str,
) -> Result<Option<HostedImage>, AppError> {
    Ok(sqlx::query_as::<_, HostedImage>(
        "SELECT public_id, url, user_id, created_at FROM images WHERE public_id = ?1",
    )
    .bind(public_id)
    .fetch_optional(db)
    .await?)
}

/// Whether a post other than `except_post` already shows this asset.
pub async fn used_by_other_post<'e>(
    db: impl SqliteExecutor<'e>,
    public_id: &str,
    except_post: Option<&str>,
) -> Result<bool, AppError> {
    Ok(sqlx::query_scalar::<_, bool>(
        "SELECT EXISTS (SELECT 1 FROM posts \
         WHERE json_extract(image, '$.publicId') = ?1 AND id IS NOT ?2)",
    )
    .bind(public_id)
    .bind(except_post)
    .fetch_one(db)
    .await?)
}

/// Uploads by `user_id` that no post shows.
pub async fn unattached_by_owner<'e>(
    db: impl SqliteExecutor<'e>,
    user_id: &str,
) -> Result<Vec<String>, AppError> {
    Ok(sqlx::query_scalar::<_, String>(
        "SELECT public_id FROM images \
         WHERE user_id = ?1 AND NOT EXISTS ( \
           SELECT 1 FROM posts WHERE json_extract(posts.image, '$.publicId') = images.public_id \
         ) \
         ORDER BY rowid",
    )
    .bind(user_id)
    .fetch_all(db)
    .await?)
}

/// Drops the record of a released asset.
pub async fn forget<'e>(db: impl SqliteExecutor<'e>, public_id: &str) -> Result<bool, AppError> {
    let result = sqlx::query("DELETE FROM images WHERE public_id = ?1")
        .bind(public_id)
        .execute(db)
        .await?;
    Ok(result.rows_affected() > 0)
}
