// src/utils/image.rs

use std::path::PathBuf;

use async_trait::async_trait;
use axum::body::Bytes;

use crate::{error::AppError, models::post::PostImage};

/// A file received from a multipart upload.
#[derive(Debug)]
pub struct Upload {
    pub bytes: Bytes,
    pub content_type: Option<String>,
    pub file_name: Option<String>,
}

/// External image hosting: stores uploads and releases them when the post
/// that references them is deleted.
#[async_trait]
pub trait ImageHost: Send + Sync {
    async fn upload(&self, file: Upload) -> Result<PostImage, AppError>;

    /// Releases a previously uploaded asset. Releasing an unknown asset is
    /// not an error.
    async fn release(&self, public_id: &str) -> Result<(), AppError>;
}

/// Image host backed by a local directory served under `/uploads`.
#[derive(Debug, Clone)]
pub struct LocalImageHost {
    root: PathBuf,
    base_url: String,
}

impl LocalImageHost {
    pub fn new(root: impl Into<PathBuf>, public_url: &str) -> Self {
        Self {
            root: root.into(),
            base_url: format!("{}/uploads", public_url.trim_end_matches('/')),
        }
    }

    fn path_for(&self, public_id: &str) -> Result<PathBuf, AppError> {
        let safe = !public_id.is_empty()
            && public_id
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '.')
            && !public_id.starts_with('.');
        if !safe {
            return Err(AppError::Validation(format!(
                "Invalid image id '{}'",
                public_id
            )));
        }
        Ok(self.root.join(public_id))
    }
}

/// Picks a file extension for an image upload, rejecting non-image types.
fn image_extension(file: &Upload) -> Result<&'static str, AppError> {
    let mime = match &file.content_type {
        Some(ct) => ct.split(';').next().unwrap_or_default().trim().to_lowercase(),
        None => file
            .file_name
            .as_deref()
            .and_then(|name| mime_guess::from_path(name).first_raw())
            .unwrap_or("application/octet-stream")
            .to_string(),
    };

    // SVG can carry scripts and is served from our own origin.
    if !mime.starts_with("image/") || mime.starts_with("image/svg") {
        return Err(AppError::Validation(format!(
            "Unsupported file type '{}', please upload an image",
            mime
        )));
    }

    let subtype = &mime["image/".len()..];
    let ext = mime_guess::get_mime_extensions_str(&mime)
        .and_then(|exts| exts.iter().copied().find(|e| *e == subtype).or(exts.first().copied()))
        .unwrap_or("img");
    Ok(ext)
}

#[async_trait]
impl ImageHost for LocalImageHost {
    async fn upload(&self, file: Upload) -> Result<PostImage, AppError> {
        if file.bytes.is_empty() {
            return Err(AppError::Validation("Please upload an image".to_string()));
        }
        let ext = image_extension(&file)?;
        let public_id = format!("{}.{}", uuid::Uuid::new_v4(), ext);
        let path = self.path_for(&public_id)?;

        tokio::fs::create_dir_all(&self.root)
            .await
            .map_err(|e| AppError::InternalServerError(e.to_string()))?;
        tokio::fs::write(&path, &file.bytes)
            .await
            .map_err(|e| AppError::InternalServerError(e.to_string()))?;

        tracing::info!("Stored image {} ({} bytes)", public_id, file.bytes.len());

        Ok(PostImage {
            url: format!("{}/{}", self.base_url, public_id),
            public_id,
        })
    }

    async fn release(&self, public_id: &str) -> Result<(), AppError> {
        let path = self.path_for(public_id)?;
        match tokio::fs::remove_file(&path).await {
            Ok(()) => {
                tracing::info!("Released image {}", public_id);
                Ok(())
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(AppError::InternalServerError(e.to_string())),
        }
    }
}
