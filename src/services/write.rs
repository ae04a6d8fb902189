// src/services/write.rs

use sqlx::{Connection, PgPool, Postgres, Transaction};

use crate::{
    clients::{CatalogClient, MediaStorage},
    config::MediaFailurePolicy,
    error::AppError,
    models::{
        comment::{Comment, CommentView, NewComment, NewReply, ReplyView, validate_content},
        media::{MediaAttachment, MediaUpload, MediaView},
    },
    services::{movies::ensure_movie_reference, users::find_profile},
};

const COMMENT_RETURNING: &str =
    "RETURNING id, user_id, movie_id, parent_id, content, created_at, updated_at";

/// Creates a top-level comment, optionally with one media attachment.
///
/// The movie and the author are resolved before anything is written. The
/// comment insert and the attachment share one transaction; what happens when
/// the attachment fails is decided by `policy`.
pub async fn create_comment(
    pool: &PgPool,
    catalog: &dyn CatalogClient,
    storage: &dyn MediaStorage,
    policy: MediaFailurePolicy,
    input: NewComment,
) -> Result<CommentView, AppError> {
    let content = validate_content(&input.content)?;

    ensure_movie_reference(pool, catalog, &input.movie_id).await?;
    let author = find_profile(pool, input.author_id).await?;

    let mut tx = pool.begin().await?;

    let comment = sqlx::query_as::<_, Comment>(&format!(
        "INSERT INTO comments (user_id, movie_id, parent_id, content) VALUES ($1, $2, NULL, $3) {}",
        COMMENT_RETURNING
    ))
    .bind(author.id)
    .bind(&input.movie_id)
    .bind(&content)
    .fetch_one(&mut *tx)
    .await
    .map_err(|e| {
        tracing::error!("Failed to create comment: {:?}", e);
        AppError::from(e)
    })?;

    let mut media = Vec::new();
    if let Some(upload) = &input.media {
        match attach_media(&mut tx, storage, comment.id, upload).await {
            Ok(attached) => media.push(attached),
            Err(e) if policy == MediaFailurePolicy::KeepText => {
                tracing::warn!(
                    "Media for comment {} was dropped, keeping text only: {}",
                    comment.id,
                    e
                );
            }
            // Dropping `tx` rolls the comment back with the attachment.
            Err(e) => return Err(e),
        }
    }

    tx.commit().await?;

    Ok(CommentView {
        id: comment.id,
        user_id: author.id,
        username: Some(author.username),
        user_avatar: author.avatar_url,
        content: comment.content,
        likes: 0,
        is_liked: false,
        replies: Vec::new(),
        reply_count: 0,
        media,
        created_at: comment.created_at,
    })
}

/// Stores the payload and records it against `comment_id`.
///
/// The row is written inside a savepoint so a failed insert leaves the
/// surrounding transaction usable. A stored file whose row could not be
/// written is removed again.
pub async fn attach_media(
    tx: &mut Transaction<'_, Postgres>,
    storage: &dyn MediaStorage,
    comment_id: i64,
    upload: &MediaUpload,
) -> Result<MediaView, AppError> {
    let url = storage.store(upload).await?;

    let inserted = async {
        let mut savepoint = Connection::begin(&mut **tx).await?;
        let attachment = sqlx::query_as::<_, MediaAttachment>(
            r#"
            INSERT INTO comment_media (comment_id, type, url)
            VALUES ($1, $2, $3)
            RETURNING id, comment_id, type, url, created_at
            "#,
        )
        .bind(comment_id)
        .bind(upload.kind().as_str())
        .bind(&url)
        .fetch_one(&mut *savepoint)
        .await?;
        savepoint.commit().await?;
        Ok::<_, sqlx::Error>(attachment)
    }
    .await;

    match inserted {
        Ok(attachment) => Ok(attachment.into()),
        Err(e) => {
            if let Err(cleanup) = storage.remove(&url).await {
                tracing::warn!("Failed to clean up orphaned media {}: {}", url, cleanup);
            }
            Err(AppError::from(e))
        }
    }
}

/// Creates a reply under a top-level comment.
/// Replies inherit the parent's movie and can never be replied to themselves.
pub async fn create_reply(pool: &PgPool, input: NewReply) -> Result<ReplyView, AppError> {
    let content = validate_content(&input.content)?;

    let mut tx = pool.begin().await?;

    // FOR SHARE keeps the parent from being deleted until the reply is in.
    let parent = sqlx::query_as::<_, Comment>(
        r#"
        SELECT id, user_id, movie_id, parent_id, content, created_at, updated_at
        FROM comments
        WHERE id = $1
        FOR SHARE
        "#,
    )
    .bind(input.parent_id)
    .fetch_optional(&mut *tx)
    .await?
    .ok_or(AppError::NotFound("Comment not found".to_string()))?;

    if parent.is_reply() {
        return Err(AppError::BadRequest(
            "Cannot reply to a reply. Please reply to the parent comment.".to_string(),
        ));
    }

    let author = find_profile(&mut *tx, input.author_id).await?;

    let reply = sqlx::query_as::<_, Comment>(&format!(
        "INSERT INTO comments (user_id, movie_id, parent_id, content) VALUES ($1, $2, $3, $4) {}",
        COMMENT_RETURNING
    ))
    .bind(author.id)
    .bind(&parent.movie_id)
    .bind(parent.id)
    .bind(&content)
    .fetch_one(&mut *tx)
    .await?;

    tx.commit().await?;

    Ok(ReplyView {
        id: reply.id,
        user_id: author.id,
        username: Some(author.username),
        user_avatar: author.avatar_url,
        content: reply.content,
        likes: 0,
        is_liked: false,
        media: Vec::new(),
        created_at: reply.created_at,
    })
}
