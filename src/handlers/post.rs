use std::sync::Arc;

use axum::{
    Json,
    extract::{Multipart, Path, State},
    http::StatusCode,
    response::IntoResponse,
};
use sqlx::SqlitePool;

use crate::{
    access,
    error::AppError,
    extractors::ValidatedJson,
    handlers::ensure_caller_exists,
    integrity::{self, CascadeReport},
    models::{
        post::{CreatePostRequest, NewPost, Post, PostChanges, PostImage, UpdatePostRequest},
        response::{ApiResponse, LikeOutcome},
    },
    store::{
        images as hosted,
        likes::{self, LikeTarget},
        posts,
    },
    utils::{
        image::{ImageHost, Upload},
        jwt::CurrentUser,
    },
};

/// Multipart field carrying the image.
const UPLOAD_FIELD: &str = "my_file";

/// Uploads an image to the image host and returns `{url, publicId}` for use
/// when creating or editing a post. The asset is recorded against the caller.
pub async fn upload_image(
    State(pool): State<SqlitePool>,
    State(images): State<Arc<dyn ImageHost>>,
    caller: CurrentUser,
    mut multipart: Multipart,
) -> Result<Json<ApiResponse<PostImage>>, AppError> {
    ensure_caller_exists(&pool, &caller).await?;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::Validation(e.body_text()))?
    {
        if field.name() != Some(UPLOAD_FIELD) {
            continue;
        }

        let content_type = field.content_type().map(str::to_owned);
        let file_name = field.file_name().map(str::to_owned);
        let bytes = field
            .bytes()
            .await
            .map_err(|e| AppError::Validation(e.body_text()))?;

        let image = images
            .upload(Upload {
                bytes,
                content_type,
                file_name,
            })
            .await?;

        if let Err(e) = hosted::record(&pool, &image, &caller.id).await {
            integrity::release_image(&pool, images.as_ref(), &image).await?;
            return Err(e);
        }

        return Ok(ApiResponse::data(image));
    }

    Err(AppError::Validation("Please upload an image".to_string()))
}

/// Resolves a requested image against the upload records. The stored url
/// replaces whatever the client sent.
async fn attach_image(
    pool: &SqlitePool,
    caller: &CurrentUser,
    post_owner: &str,
    post_id: Option<&str>,
    requested: PostImage,
) -> Result<PostImage, AppError> {
    let image = hosted::find(pool, &requested.public_id)
        .await?
        .ok_or(AppError::Validation(
            "Unknown image, please upload it first".to_string(),
        ))?;

    access::ensure_can_attach_image(caller, post_owner, &image)?;

    if hosted::used_by_other_post(pool, &image.public_id, post_id).await? {
        return Err(AppError::Validation(
            "Image is already used by another post".to_string(),
        ));
    }

    Ok(image.into())
}

/// Creates a post owned by the caller. Titles must be unique at creation.
pub async fn create_post(
    State(pool): State<SqlitePool>,
    caller: CurrentUser,
    ValidatedJson(payload): ValidatedJson<CreatePostRequest>,
) -> Result<impl IntoResponse, AppError> {
    ensure_caller_exists(&pool, &caller).await?;

    if posts::title_taken(&pool, &payload.title).await? {
        return Err(AppError::DuplicateTitle("Duplicate post".to_string()));
    }

    let image = match payload.image {
        Some(requested) => Some(attach_image(&pool, &caller, &caller.id, None, requested).await?),
        None => None,
    };

    let post = posts::insert(
        &pool,
        NewPost {
            title: payload.title,
            text: payload.text,
            category: payload.category,
            image,
            user_id: caller.id,
        },
    )
    .await?;

    integrity::link_post(&pool, &post).await?;

    tracing::info!("Created post {} by {}", post.id, post.user_id);

    Ok((StatusCode::CREATED, ApiResponse::data(post)))
}

/// Edits a post. Owner or admin only; `isFeatured` is applied for admins and
/// silently dropped for everyone else. Title uniqueness is not re-checked.
/// A replaced image is released once the edit is stored.
pub async fn update_post(
    State(pool): State<SqlitePool>,
    State(images): State<Arc<dyn ImageHost>>,
    caller: CurrentUser,
    Path(post_id): Path<String>,
    ValidatedJson(payload): ValidatedJson<UpdatePostRequest>,
) -> Result<Json<ApiResponse<Post>>, AppError> {
    let post = posts::find_by_id(&pool, &post_id)
        .await?
        .ok_or(AppError::NotFound("Post not found".to_string()))?;

    access::ensure_can_modify_post(&caller, &post)?;

    let image = match payload.image {
        Some(requested) => {
            Some(attach_image(&pool, &caller, &post.user_id, Some(post.id.as_str()), requested).await?)
        }
        None => None,
    };

    let changes = PostChanges {
        title: payload.title,
        text: payload.text,
        category: payload.category,
        image,
        is_featured: access::featured_change(&caller, payload.is_featured),
    };

    let updated = posts::update(&pool, &post.id, changes)
        .await?
        .ok_or(AppError::NotFound("Post not found".to_string()))?;

    if let (Some(old), Some(new)) = (&post.image, &updated.image) {
        if old.public_id != new.public_id {
            integrity::release_image(&pool, images.as_ref(), old).await?;
        }
    }

    Ok(ApiResponse::data(updated))
}

/// Deletes a post with its comments and image. Owner or admin only.
pub async fn delete_post(
    State(pool): State<SqlitePool>,
    State(images): State<Arc<dyn ImageHost>>,
    caller: CurrentUser,
    Path(post_id): Path<String>,
) -> Result<Json<ApiResponse<CascadeReport>>, AppError> {
    let post = posts::find_by_id(&pool, &post_id)
        .await?
        .ok_or(AppError::NotFound("Post not found".to_string()))?;

    access::ensure_can_modify_post(&caller, &post)?;

    let report = integrity::delete_post(&pool, images.as_ref(), &post.id).await?;

    Ok(ApiResponse::with_message("Post deleted successfully", report))
}

pub async fn get_post(
    State(pool): State<SqlitePool>,
    Path(post_id): Path<String>,
) -> Result<Json<ApiResponse<Post>>, AppError> {
    let post = posts::find_by_id(&pool, &post_id)
        .await?
        .ok_or(AppError::NotFound("Post not found".to_string()))?;

    Ok(ApiResponse::data(post))
}

/// Every post, oldest first. Not paginated.
pub async fn list_posts(
    State(pool): State<SqlitePool>,
) -> Result<Json<ApiResponse<Vec<Post>>>, AppError> {
    let posts = posts::list_all(&pool).await?;
    Ok(ApiResponse::data(posts))
}

/// Likes the post, or unlikes it if the caller already does.
pub async fn toggle_like(
    State(pool): State<SqlitePool>,
    caller: CurrentUser,
    Path(post_id): Path<String>,
) -> Result<Json<ApiResponse<LikeOutcome>>, AppError> {
    ensure_caller_exists(&pool, &caller).await?;

    let outcome = likes::toggle(&pool, LikeTarget::Post, &post_id, &caller.id)
        .await?
        .ok_or(AppError::NotFound("Post not found".to_string()))?;

    let message = if outcome.liked {
        "Liked post"
    } else {
        "Unliked post"
    };

    Ok(ApiResponse::with_message(message, outcome))
}
