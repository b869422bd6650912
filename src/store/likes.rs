use sqlx::SqlitePool;

use crate::{
    error::AppError,
    models::response::LikeOutcome,
    store::refs::{self, RefList},
};

/// What is being liked.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LikeTarget {
    Post,
    Comment,
}

impl LikeTarget {
    fn list(self) -> RefList {
        match self {
            LikeTarget::Post => RefList::PostLikes,
            LikeTarget::Comment => RefList::CommentLikes,
        }
    }
}

/// Flips `user_id`'s membership in the target's like set.
///
/// Returns `None` if the target does not exist. The push and pull statements
/// are themselves set operations, so concurrent toggles can never leave a
/// duplicate id behind.
pub async fn toggle(
    pool: &SqlitePool,
    target: LikeTarget,
    target_id: &str,
    user_id: &str,
) -> Result<Option<LikeOutcome>, AppError> {
    let list = target.list();

    if refs::len(pool, list, target_id).await?.is_none() {
        return Ok(None);
    }

    let liked = if refs::contains(pool, list, target_id, user_id).await? {
        refs::pull(pool, list, target_id, user_id).await?;
        false
    } else {
        refs::push(pool, list, target_id, user_id).await?;
        true
    };

    let likes = refs::len(pool, list, target_id).await?.unwrap_or_default();

    Ok(Some(LikeOutcome { liked, likes }))
}
