use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, types::Json};
use validator::Validate;

use super::fields;

/// Post category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[serde(rename_all = "lowercase")]
#[sqlx(rename_all = "lowercase")]
pub enum Category {
    General,
    Sport,
    Entertainment,
    Business,
    Health,
}

/// Reference to an image held by the external image host.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct PostImage {
    #[validate(url(message = "Image url must be a valid URL"))]
    pub url: String,
    #[validate(length(min = 1, max = 200, message = "Image publicId is required"))]
    pub public_id: String,
}

/// An asset the image host issued, and who asked for it.
#[derive(Debug, Clone, FromRow)]
pub struct HostedImage {
    pub public_id: String,
    pub url: String,
    /// Uploader.
    pub user_id: String,
    pub created_at: DateTime<Utc>,
}

impl From<HostedImage> for PostImage {
    fn from(hosted: HostedImage) -> Self {
        PostImage {
            url: hosted.url,
            public_id: hosted.public_id,
        }
    }
}

/// Represents a post document.
#[derive(Debug, Clone, FromRow, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Post {
    pub id: String,
    pub title: String,
    pub text: String,
    pub category: Category,
    pub image: Option<Json<PostImage>>,

    /// Owner.
    pub user_id: String,

    /// Only admins can change this flag.
    pub is_featured: bool,

    /// Ids of the comments attached to this post.
    pub comments: Json<Vec<String>>,

    /// Ids of the users who like this post. Each id appears at most once.
    pub likes: Json<Vec<String>>,

    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Fields needed to insert a post.
#[derive(Debug)]
pub struct NewPost {
    pub title: String,
    pub text: String,
    pub category: Category,
    pub image: Option<PostImage>,
    pub user_id: String,
}

/// Partial update applied to a post document.
#[derive(Debug, Default)]
pub struct PostChanges {
    pub title: Option<String>,
    pub text: Option<String>,
    pub category: Option<Category>,
    pub image: Option<PostImage>,
    pub is_featured: Option<bool>,
}

/// DTO for creating a new post.
#[derive(Debug, Deserialize, Validate)]
pub struct CreatePostRequest {
    #[serde(deserialize_with = "fields::sanitized")]
    #[validate(length(
        min = 5,
        max = 150,
        message = "Title length must be between 5 and 150 chars"
    ))]
    pub title: String,

    #[serde(deserialize_with = "fields::sanitized")]
    #[validate(length(
        min = 50,
        max = 5000,
        message = "Text length must be between 50 and 5000 chars"
    ))]
    pub text: String,

    pub category: Category,

    #[validate(nested)]
    pub image: Option<PostImage>,
}

/// DTO for editing a post. Only provided fields are validated and applied.
#[derive(Debug, Default, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct UpdatePostRequest {
    #[serde(default, deserialize_with = "fields::sanitized_opt")]
    #[validate(length(
        min = 5,
        max = 150,
        message = "Title length must be between 5 and 150 chars"
    ))]
    pub title: Option<String>,

    #[serde(default, deserialize_with = "fields::sanitized_opt")]
    #[validate(length(
        min = 50,
        max = 5000,
        message = "Text length must be between 50 and 5000 chars"
    ))]
    pub text: Option<String>,

    pub category: Option<Category>,

    #[validate(nested)]
    pub image: Option<PostImage>,

    /// Ignored unless the caller is an admin.
    pub is_featured: Option<bool>,
}
