// src/services/deletion.rs

use serde::Serialize;
use sqlx::PgPool;

use crate::{clients::MediaStorage, error::AppError};

/// What a successful delete removed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DeletionReport {
    pub comment_id: i64,
    pub replies_removed: i64,
    pub media_removed: usize,
}

/// Deletes a comment or reply on behalf of its author.
///
/// The store cascades replies, likes and media rows. Stored media files are
/// removed after commit; a file that cannot be removed is only logged.
pub async fn delete_comment(
    pool: &PgPool,
    storage: &dyn MediaStorage,
    comment_id: i64,
    requester_id: i64,
) -> Result<DeletionReport, AppError> {
    let mut tx = pool.begin().await?;

    let author_id = sqlx::query_scalar::<_, i64>(
        "SELECT user_id FROM comments WHERE id = $1 FOR UPDATE",
    )
    .bind(comment_id)
    .fetch_optional(&mut *tx)
    .await?
    .ok_or(AppError::NotFound("Comment not found".to_string()))?;

    if author_id != requester_id {
        return Err(AppError::Forbidden(
            "You are not authorized to delete this comment".to_string(),
        ));
    }

    let replies_removed =
        sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM comments WHERE parent_id = $1")
            .bind(comment_id)
            .fetch_one(&mut *tx)
            .await?;

    let media_urls = sqlx::query_scalar::<_, String>(
        r#"
        SELECT m.url
        FROM comment_media m
        JOIN comments c ON c.id = m.comment_id
        WHERE c.id = $1 OR c.parent_id = $1
        "#,
    )
    .bind(comment_id)
    .fetch_all(&mut *tx)
    .await?;

    sqlx::query("DELETE FROM comments WHERE id = $1")
        .bind(comment_id)
        .execute(&mut *tx)
        .await
        .map_err(|e| {
            tracing::error!("Failed to delete comment {}: {:?}", comment_id, e);
            AppError::from(e)
        })?;

    tx.commit().await?;

    for url in &media_urls {
        if let Err(e) = storage.remove(url).await {
            tracing::warn!("Failed to remove media {} of comment {}: {}", url, comment_id, e);
        }
    }

    tracing::info!(
        "User {} deleted comment {} ({} replies, {} media)",
        requester_id,
        comment_id,
        replies_removed,
        media_urls.len()
    );

    Ok(DeletionReport {
        comment_id,
        replies_removed,
        media_removed: media_urls.len(),
    })
}
