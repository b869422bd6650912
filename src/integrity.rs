//! Referential integrity between users, posts and comments.
//!
//! Documents reference each other by id only, so every write that creates or
//! removes a document also has to fix the lists that point at it. All such
//! multi-document writes live here. They run as separate single-document
//! statements: a failure between two of them can leave a dangling id or an
//! orphan, and a future transactional version only needs to change the
//! bodies below, not their callers.
//!
//! After any delete in this module completes, no remaining post or user
//! references a removed comment or post, and no comment outlives its post.

use std::ops::AddAssign;

use serde::Serialize;
use sqlx::SqlitePool;

use crate::{
    error::AppError,
    models::{
        comment::Comment,
        post::{Post, PostImage},
    },
    store::{
        comments, images as hosted, posts,
        refs::{self, RefList},
        users,
    },
    utils::image::ImageHost,
};

/// What a cascade removed.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct CascadeReport {
    pub posts: usize,
    pub comments: usize,
    pub images: usize,
}

impl AddAssign for CascadeReport {
    fn add_assign(&mut self, other: Self) {
        self.posts += other.posts;
        self.comments += other.comments;
        self.images += other.images;
    }
}

/// Records a freshly inserted post in its owner's post list.
pub async fn link_post(pool: &SqlitePool, post: &Post) -> Result<(), AppError> {
    refs::push(pool, RefList::UserPosts, &post.user_id, &post.id).await?;
    Ok(())
}

/// Records a freshly inserted comment in its post's and its author's lists.
pub async fn link_comment(pool: &SqlitePool, comment: &Comment) -> Result<(), AppError> {
    refs::push(pool, RefList::PostComments, &comment.post_id, &comment.id).await?;
    refs::push(pool, RefList::UserComments, &comment.user_id, &comment.id).await?;
    Ok(())
}

/// Deletes a comment and removes it from its post's and author's lists.
pub async fn delete_comment(pool: &SqlitePool, comment: &Comment) -> Result<(), AppError> {
    refs::pull(pool, RefList::PostComments, &comment.post_id, &comment.id).await?;
    refs::pull(pool, RefList::UserComments, &comment.user_id, &comment.id).await?;
    comments::delete_record(pool, &comment.id).await?;
    Ok(())
}

/// Like [`delete_comment`] but by id. Returns whether a comment was removed.
async fn delete_comment_by_id(pool: &SqlitePool, comment_id: &str) -> Result<bool, AppError> {
    match comments::find_by_id(pool, comment_id).await? {
        Some(comment) => {
            delete_comment(pool, &comment).await?;
            Ok(true)
        }
        None => Ok(false),
    }
}

/// Appends the ids from `extra` not already in `ids`, keeping order.
fn merge_ids(mut ids: Vec<String>, extra: Vec<String>) -> Vec<String> {
    for id in extra {
        if !ids.contains(&id) {
            ids.push(id);
        }
    }
    ids
}

/// Releases a hosted asset and forgets its upload record. A host failure is
/// logged and reported as `false`; the record is kept so the asset can still
/// be found.
pub async fn release_image(
    pool: &SqlitePool,
    images: &dyn ImageHost,
    image: &PostImage,
) -> Result<bool, AppError> {
    release_by_id(pool, images, &image.public_id).await
}

async fn release_by_id(
    pool: &SqlitePool,
    images: &dyn ImageHost,
    public_id: &str,
) -> Result<bool, AppError> {
    match images.release(public_id).await {
        Ok(()) => {
            hosted::forget(pool, public_id).await?;
            Ok(true)
        }
        Err(e) => {
            tracing::warn!("Failed to release image {}: {}", public_id, e);
            Ok(false)
        }
    }
}

/// Deletes a post together with its comments and hosted image.
///
/// Comments are found both through the post's own list and by their parent
/// field, so orphans from an interrupted comment creation are swept too.
/// An image that cannot be released is logged and skipped.
pub async fn delete_post(
    pool: &SqlitePool,
    images: &dyn ImageHost,
    post_id: &str,
) -> Result<CascadeReport, AppError> {
    let post = posts::find_by_id(pool, post_id)
        .await?
        .ok_or(AppError::NotFound("Post not found".to_string()))?;

    let mut report = CascadeReport::default();

    let comment_ids = merge_ids(post.comments.0.clone(), comments::ids_by_post(pool, &post.id).await?);
    for comment_id in &comment_ids {
        if delete_comment_by_id(pool, comment_id).await? {
            report.comments += 1;
        }
    }

    if let Some(image) = &post.image {
        if release_image(pool, images, image).await? {
            report.images += 1;
        }
    }

    refs::pull(pool, RefList::UserPosts, &post.user_id, &post.id).await?;
    if posts::delete_record(pool, &post.id).await? {
        report.posts += 1;
    }

    tracing::info!(
        "Deleted post {} ({} comments, {} images)",
        post.id,
        report.comments,
        report.images
    );

    Ok(report)
}

/// Deletes a user with everything that depends on them: their posts (and
/// those posts' comments and images), their comments on other posts, uploads
/// no post shows, and their likes.
pub async fn delete_user(
    pool: &SqlitePool,
    images: &dyn ImageHost,
    user_id: &str,
) -> Result<CascadeReport, AppError> {
    let user = users::find_by_id(pool, user_id)
        .await?
        .ok_or(AppError::NotFound("User not found".to_string()))?;

    let mut report = CascadeReport::default();

    let post_ids = merge_ids(user.posts.0.clone(), posts::ids_by_owner(pool, &user.id).await?);
    for post_id in &post_ids {
        if posts::exists(pool, post_id).await? {
            report += delete_post(pool, images, post_id).await?;
        }
    }

    let comment_ids = merge_ids(
        user.comments.0.clone(),
        comments::ids_by_owner(pool, &user.id).await?,
    );
    for comment_id in &comment_ids {
        if delete_comment_by_id(pool, comment_id).await? {
            report.comments += 1;
        }
    }

    // Redundant with the post cascade above unless a post vanished between
    // the two reads; comments must never outlive their post.
    for post_id in &post_ids {
        for comment_id in comments::ids_by_post(pool, post_id).await? {
            if delete_comment_by_id(pool, &comment_id).await? {
                report.comments += 1;
            }
        }
    }

    for public_id in hosted::unattached_by_owner(pool, &user.id).await? {
        if release_by_id(pool, images, &public_id).await? {
            report.images += 1;
        }
    }

    refs::pull_everywhere(pool, RefList::PostLikes, &user.id).await?;
    refs::pull_everywhere(pool, RefList::CommentLikes, &user.id).await?;

    users::delete_record(pool, &user.id).await?;

    tracing::info!(
        "Deleted user {} ({} posts, {} comments, {} images)",
        user.id,
        report.posts,
        report.comments,
        report.images
    );

    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::merge_ids;

    #[test]
    fn merge_ids_keeps_order_and_dedupes() {
        let merged = merge_ids(
            vec!["a".into(), "b".into()],
            vec!["b".into(), "c".into(), "a".into()],
        );
        assert_eq!(merged, vec!["a", "b", "c"]);
    }
}
