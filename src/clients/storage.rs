// src/clients/storage.rs

use std::{io::ErrorKind, path::PathBuf};

use async_trait::async_trait;

use crate::{error::AppError, models::media::MediaUpload};

/// Public URL prefix under which locally stored media is served.
pub const PUBLIC_MEDIA_PREFIX: &str = "/uploads/comments";

/// Persists uploaded comment media and hands back a URL for it.
#[async_trait]
pub trait MediaStorage: Send + Sync {
    async fn store(&self, upload: &MediaUpload) -> Result<String, AppError>;

    /// Removes a previously stored file. Unknown URLs are not an error.
    async fn remove(&self, url: &str) -> Result<(), AppError>;
}

/// Writes media to a directory on local disk.
#[derive(Debug, Clone)]
pub struct LocalMediaStorage {
    root: PathBuf,
}

impl LocalMediaStorage {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &PathBuf {
        &self.root
    }

    fn file_name_for(url: &str) -> Option<&str> {
        let name = url.strip_prefix(PUBLIC_MEDIA_PREFIX)?.strip_prefix('/')?;
        let safe = !name.is_empty() && !name.contains('/') && !name.contains('\\') && name != "..";
        safe.then_some(name)
    }
}

#[async_trait]
impl MediaStorage for LocalMediaStorage {
    async fn store(&self, upload: &MediaUpload) -> Result<String, AppError> {
        tokio::fs::create_dir_all(&self.root)
            .await
            .map_err(|e| AppError::Upstream(format!("Cannot prepare media directory: {}", e)))?;

        let file_name = match upload.extension() {
            Some(ext) => format!("comment-{}.{}", uuid::Uuid::new_v4(), ext),
            None => format!("comment-{}", uuid::Uuid::new_v4()),
        };

        tokio::fs::write(self.root.join(&file_name), &upload.bytes)
            .await
            .map_err(|e| AppError::Upstream(format!("Failed to store media: {}", e)))?;

        tracing::debug!("Stored comment media {} ({} bytes)", file_name, upload.bytes.len());
        Ok(format!("{}/{}", PUBLIC_MEDIA_PREFIX, file_name))
    }

    async fn remove(&self, url: &str) -> Result<(), AppError> {
        let Some(file_name) = Self::file_name_for(url) else {
            tracing::warn!("Refusing to remove media outside the upload directory: {}", url);
            return Ok(());
        };

        match tokio::fs::remove_file(self.root.join(file_name)).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(AppError::Upstream(format!("Failed to remove media: {}", e))),
        }
    }
}
