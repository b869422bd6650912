use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
};
use sqlx::SqlitePool;

use crate::{
    access,
    config::Config,
    error::AppError,
    extractors::ValidatedJson,
    handlers::ensure_caller_exists,
    integrity,
    models::{
        comment::{Comment, CreateCommentRequest, DeleteCommentRequest, UpdateCommentRequest},
        response::{ApiResponse, LikeOutcome},
    },
    store::{
        comments,
        likes::{self, LikeTarget},
        posts,
    },
    utils::jwt::CurrentUser,
};

/// Loads a comment addressed through its post, checking the post exists, the
/// comment exists and the comment actually belongs to that post.
async fn find_comment_on_post(
    pool: &SqlitePool,
    comment_id: &str,
    post_id: &str,
) -> Result<Comment, AppError> {
    if !posts::exists(pool, post_id).await? {
        return Err(AppError::NotFound("Post not found".to_string()));
    }

    let comment = comments::find_by_id(pool, comment_id)
        .await?
        .ok_or(AppError::NotFound("Comment does not exist".to_string()))?;

    if comment.post_id != post_id {
        return Err(AppError::MismatchedParent(
            "Comment does not belong to this post".to_string(),
        ));
    }

    Ok(comment)
}

/// Adds a comment to a post and links it into the post and the author.
pub async fn create_comment(
    State(pool): State<SqlitePool>,
    caller: CurrentUser,
    ValidatedJson(payload): ValidatedJson<CreateCommentRequest>,
) -> Result<impl IntoResponse, AppError> {
    ensure_caller_exists(&pool, &caller).await?;

    if !posts::exists(&pool, &payload.post_id).await? {
        return Err(AppError::NotFound("Post not found".to_string()));
    }

    let comment = comments::insert(&pool, &caller.id, &payload.post_id, &payload.comment).await?;

    integrity::link_comment(&pool, &comment).await?;

    Ok((StatusCode::CREATED, ApiResponse::data(comment)))
}

/// Edits a comment. Only its author may do this, admins included.
pub async fn update_comment(
    State(pool): State<SqlitePool>,
    caller: CurrentUser,
    ValidatedJson(payload): ValidatedJson<UpdateCommentRequest>,
) -> Result<Json<ApiResponse<Comment>>, AppError> {
    let comment = find_comment_on_post(&pool, &payload.comment_id, &payload.post_id).await?;

    access::ensure_can_edit_comment(&caller, &comment)?;

    let updated = comments::update_text(&pool, &comment.id, &payload.comment)
        .await?
        .ok_or(AppError::NotFound("Comment does not exist".to_string()))?;

    Ok(ApiResponse::data(updated))
}

/// Deletes a comment. Its author or an admin may do this.
pub async fn delete_comment(
    State(pool): State<SqlitePool>,
    caller: CurrentUser,
    ValidatedJson(payload): ValidatedJson<DeleteCommentRequest>,
) -> Result<Json<ApiResponse<()>>, AppError> {
    let comment = find_comment_on_post(&pool, &payload.comment_id, &payload.post_id).await?;

    access::ensure_can_delete_comment(&caller, &comment)?;

    integrity::delete_comment(&pool, &comment).await?;

    Ok(ApiResponse::message("Comment deleted"))
}

pub async fn get_comment(
    State(pool): State<SqlitePool>,
    Path(comment_id): Path<String>,
) -> Result<Json<ApiResponse<Comment>>, AppError> {
    let comment = comments::find_by_id(&pool, &comment_id)
        .await?
        .ok_or(AppError::NotFound("Comment not found".to_string()))?;

    Ok(ApiResponse::data(comment))
}

/// Comments on a post, oldest first.
///
/// With `empty_comments_not_found` set, a post without comments answers 404
/// just like an unknown post; otherwise an existing post yields an empty list.
pub async fn list_post_comments(
    State(pool): State<SqlitePool>,
    State(config): State<Config>,
    Path(post_id): Path<String>,
) -> Result<Json<ApiResponse<Vec<Comment>>>, AppError> {
    let comments = comments::list_by_post(&pool, &post_id).await?;

    if comments.is_empty() {
        if config.empty_comments_not_found {
            return Err(AppError::NotFound("No comments for this post".to_string()));
        }
        if !posts::exists(&pool, &post_id).await? {
            return Err(AppError::NotFound("Post not found".to_string()));
        }
    }

    Ok(ApiResponse::data(comments))
}

/// Likes the comment, or unlikes it if the caller already does.
pub async fn toggle_like(
    State(pool): State<SqlitePool>,
    caller: CurrentUser,
    Path(comment_id): Path<String>,
) -> Result<Json<ApiResponse<LikeOutcome>>, AppError> {
    ensure_caller_exists(&pool, &caller).await?;

    let outcome = likes::toggle(&pool, LikeTarget::Comment, &comment_id, &caller.id)
        .await?
        .ok_or(AppError::NotFound("Comment not found".to_string()))?;

    let message = if outcome.liked {
        "Liked comment"
    } else {
        "Unliked comment"
    };

    Ok(ApiResponse::with_message(message, outcome))
}
