use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, types::Json};
use validator::Validate;

use super::fields;

/// Represents a comment document.
#[derive(Debug, Clone, FromRow, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Comment {
    pub id: String,
    /// Author.
    pub user_id: String,
    /// Parent post.
    pub post_id: String,
    pub comment: String,
    /// Ids of the users who like this comment. Each id appears at most once.
    pub likes: Json<Vec<String>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// DTO for adding a comment to a post.
#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateCommentRequest {
    #[validate(length(min = 1, message = "postId is required"))]
    pub post_id: String,

    #[serde(deserialize_with = "fields::sanitized")]
    #[validate(length(
        min = 5,
        max = 300,
        message = "Comment must be between 5 and 300 characters"
    ))]
    pub comment: String,
}

/// DTO for editing a comment.
#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct UpdateCommentRequest {
    #[validate(length(min = 1, message = "commentId is required"))]
    pub comment_id: String,

    #[validate(length(min = 1, message = "postId is required"))]
    pub post_id: String,

    #[serde(deserialize_with = "fields::sanitized")]
    #[validate(length(
        min = 5,
        max = 300,
        message = "Comment must be between 5 and 300 characters"
    ))]
    pub comment: String,
}

/// DTO for deleting a comment.
#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct DeleteCommentRequest {
    #[validate(length(min = 1, message = "commentId is required"))]
    pub comment_id: String,

    #[validate(length(min = 1, message = "postId is required"))]
    pub post_id: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn comment_length_is_bounded() {
        let make = |text: &str| CreateCommentRequest {
            post_id: "p".into(),
            comment: text.into(),
        };
        assert!(make("tiny").validate().is_err());
        assert!(make("just right").validate().is_ok());
        assert!(make(&"x".repeat(301)).validate().is_err());
        assert!(make(&"x".repeat(300)).validate().is_ok());
    }

    #[test]
    fn length_is_checked_on_the_sanitized_text() {
        let parse = |text: String| -> CreateCommentRequest {
            serde_json::from_value(serde_json::json!({ "postId": "p", "comment": text })).unwrap()
        };

        let markup_only = parse("<script>alert(1)</script>".to_string());
        assert_eq!(markup_only.comment, "");
        assert!(markup_only.validate().is_err());

        let escaped = parse("&".repeat(300));
        assert_eq!(escaped.comment.len(), 1500);
        assert!(escaped.validate().is_err());
    }
}
