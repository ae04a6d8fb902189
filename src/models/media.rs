// src/models/media.rs

use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use crate::error::AppError;

/// Content types accepted by the comment upload route.
static ALLOWED_IMAGE_TYPES: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^image/(jpg|jpeg|png|gif|webp)$").expect("static regex is valid")
});

/// Kind of attachment. The `comment_media.type` CHECK constraint admits both,
/// although only images are accepted from clients today.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MediaKind {
    Image,
    Video,
}

impl MediaKind {
    /// Derives the kind from a declared MIME type.
    pub fn from_content_type(content_type: &str) -> Self {
        if content_type.trim().to_ascii_lowercase().starts_with("video/") {
            MediaKind::Video
        } else {
            MediaKind::Image
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            MediaKind::Image => "image",
            MediaKind::Video => "video",
        }
    }
}

/// Represents the 'comment_media' table in the database.
#[derive(Debug, Clone, FromRow)]
pub struct MediaAttachment {
    pub id: i64,
    pub comment_id: i64,
    #[sqlx(rename = "type")]
    pub kind: String,
    pub url: String,
    pub created_at: chrono::DateTime<chrono::Utc>,
}

/// Media entry as embedded in a comment or reply view.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct MediaView {
    pub id: i64,
    #[serde(rename = "type")]
    pub kind: String,
    pub url: String,
}

impl From<MediaAttachment> for MediaView {
    fn from(m: MediaAttachment) -> Self {
        Self {
            id: m.id,
            kind: m.kind,
            url: m.url,
        }
    }
}

/// A binary payload received from the client, not yet stored.
#[derive(Debug, Clone)]
pub struct MediaUpload {
    pub file_name: String,
    pub content_type: String,
    pub bytes: Vec<u8>,
}

impl MediaUpload {
    pub fn kind(&self) -> MediaKind {
        MediaKind::from_content_type(&self.content_type)
    }

    /// Lower-cased extension of the original file name, if any.
    pub fn extension(&self) -> Option<String> {
        std::path::Path::new(&self.file_name)
            .extension()
            .and_then(|ext| ext.to_str())
            .map(|ext| ext.to_ascii_lowercase())
            .filter(|ext| ext.chars().all(|c| c.is_ascii_alphanumeric()))
    }
}

/// Checks a client upload against the image allow-list and size cap.
pub fn validate_image_upload(upload: &MediaUpload, max_bytes: usize) -> Result<(), AppError> {
    if upload.bytes.is_empty() {
        return Err(AppError::BadRequest("Uploaded file is empty".to_string()));
    }
    if upload.bytes.len() > max_bytes {
        return Err(AppError::BadRequest(format!(
            "File exceeds the {} byte limit",
            max_bytes
        )));
    }
    if !ALLOWED_IMAGE_TYPES.is_match(&upload.content_type.to_ascii_lowercase()) {
        return Err(AppError::BadRequest("Only image files are allowed!".to_string()));
    }
    Ok(())
}
