//! Per-operation authorization rules.
//!
//! | Operation              | Allowed                                   |
//! |------------------------|-------------------------------------------|
//! | edit / delete post     | owner or admin                            |
//! | edit comment           | owner only (admins are not exempt)        |
//! | delete comment         | owner or admin                            |
//! | delete user            | self with password, or admin without one  |
//! | set `isFeatured`       | admin only (silently dropped otherwise)   |
//! | list users             | admin only (see [`crate::utils::jwt::AdminUser`]) |
//! | attach image to post   | uploaded by the caller or the post's owner |

use crate::{
    error::AppError,
    models::{
        comment::Comment,
        post::{HostedImage, Post},
    },
    utils::jwt::CurrentUser,
};

/// How a user deletion was authorized.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UserDeletion {
    /// An admin deleting any account; no password needed.
    ByAdmin,
    /// A user deleting their own account; the password must be re-verified.
    BySelf,
}

pub fn ensure_can_modify_post(caller: &CurrentUser, post: &Post) -> Result<(), AppError> {
    if caller.is_admin() || post.user_id == caller.id {
        Ok(())
    } else {
        Err(AppError::Forbidden(
            "Unauthorized: You can only modify your own posts".to_string(),
        ))
    }
}

pub fn ensure_can_edit_comment(caller: &CurrentUser, comment: &Comment) -> Result<(), AppError> {
    if comment.user_id == caller.id {
        Ok(())
    } else {
        Err(AppError::Forbidden(
            "Only the user who created a comment can edit it".to_string(),
        ))
    }
}

pub fn ensure_can_delete_comment(caller: &CurrentUser, comment: &Comment) -> Result<(), AppError> {
    if caller.is_admin() || comment.user_id == caller.id {
        Ok(())
    } else {
        Err(AppError::Forbidden(
            "Only an admin or the user who created the comment can delete it".to_string(),
        ))
    }
}

pub fn authorize_user_deletion(
    caller: &CurrentUser,
    target_user_id: &str,
) -> Result<UserDeletion, AppError> {
    if caller.is_admin() {
        Ok(UserDeletion::ByAdmin)
    } else if caller.id == target_user_id {
        Ok(UserDeletion::BySelf)
    } else {
        Err(AppError::Forbidden(
            "You can only delete your own account".to_string(),
        ))
    }
}

/// A post may show an image uploaded by the caller or by the post's owner,
/// never one taken from another user's uploads.
pub fn ensure_can_attach_image(
    caller: &CurrentUser,
    post_owner: &str,
    image: &HostedImage,
) -> Result<(), AppError> {
    if image.user_id == caller.id || image.user_id == post_owner {
        Ok(())
    } else {
        Err(AppError::Forbidden(
            "This image was uploaded by another user".to_string(),
        ))
    }
}

/// The `isFeatured` value to apply: the requested one for admins, nothing
/// for anyone else.
pub fn featured_change(caller: &CurrentUser, requested: Option<bool>) -> Option<bool> {
    if caller.is_admin() { requested } else { None }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{post::Category, user::Role};
    use chrono::Utc;
    use sqlx::types::Json;

    fn user(id: &str) -> CurrentUser {
        CurrentUser {
            id: id.to_string(),
            role: Role::User,
        }
    }

    fn admin() -> CurrentUser {
        CurrentUser {
            id: "admin".to_string(),
            role: Role::Admin,
        }
    }

    fn post_owned_by(owner: &str) -> Post {
        Post {
            id: "p1".into(),
            title: "Title".into(),
            text: "Text".into(),
            category: Category::General,
            image: None,
            user_id: owner.into(),
            is_featured: false,
            comments: Json(vec![]),
            likes: Json(vec![]),
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    fn comment_owned_by(owner: &str) -> Comment {
        Comment {
            id: "c1".into(),
            user_id: owner.into(),
            post_id: "p1".into(),
            comment: "Nice post".into(),
            likes: Json(vec![]),
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn post_modification_allows_owner_and_admin() {
        let post = post_owned_by("alice");
        assert!(ensure_can_modify_post(&user("alice"), &post).is_ok());
        assert!(ensure_can_modify_post(&admin(), &post).is_ok());
        assert!(matches!(
            ensure_can_modify_post(&user("bob"), &post),
            Err(AppError::Forbidden(_))
        ));
    }

    #[test]
    fn comment_edit_excludes_admin_but_delete_includes_admin() {
        let comment = comment_owned_by("alice");

        assert!(ensure_can_edit_comment(&user("alice"), &comment).is_ok());
        assert!(matches!(
            ensure_can_edit_comment(&admin(), &comment),
            Err(AppError::Forbidden(_))
        ));

        assert!(ensure_can_delete_comment(&admin(), &comment).is_ok());
        assert!(ensure_can_delete_comment(&user("alice"), &comment).is_ok());
        assert!(ensure_can_delete_comment(&user("bob"), &comment).is_err());
    }

    #[test]
    fn user_deletion_modes() {
        assert_eq!(
            authorize_user_deletion(&admin(), "anyone").unwrap(),
            UserDeletion::ByAdmin
        );
        assert_eq!(
            authorize_user_deletion(&user("alice"), "alice").unwrap(),
            UserDeletion::BySelf
        );
        assert!(authorize_user_deletion(&user("alice"), "bob").is_err());
    }

    #[test]
    fn images_attach_only_from_caller_or_owner_uploads() {
        let uploaded_by = |owner: &str| HostedImage {
            public_id: "img.png".into(),
            url: "http://localhost:3000/uploads/img.png".into(),
            user_id: owner.into(),
            created_at: Utc::now(),
        };

        assert!(ensure_can_attach_image(&user("alice"), "alice", &uploaded_by("alice")).is_ok());
        assert!(ensure_can_attach_image(&admin(), "alice", &uploaded_by("alice")).is_ok());
        assert!(ensure_can_attach_image(&admin(), "alice", &uploaded_by("admin")).is_ok());
        assert!(matches!(
            ensure_can_attach_image(&user("bob"), "bob", &uploaded_by("alice")),
            Err(AppError::Forbidden(_))
        ));
    }

    #[test]
    fn featured_flag_only_passes_for_admin() {
        assert_eq!(featured_change(&admin(), Some(true)), Some(true));
        assert_eq!(featured_change(&user("alice"), Some(true)), None);
    }
}
