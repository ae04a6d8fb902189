// src/services/reactions.rs

use sqlx::PgPool;

use crate::{error::AppError, services::users::find_profile};

/// Toggles `user_id`'s like on a comment or reply.
/// Returns `true` when the comment is liked afterwards.
///
/// Delete-first: if a like was removed the toggle is an unlike. Otherwise the
/// insert races only against another toggle by the same user, and
/// `ON CONFLICT DO NOTHING` lets both converge on a single row.
pub async fn toggle_like(pool: &PgPool, comment_id: i64, user_id: i64) -> Result<bool, AppError> {
    let mut tx = pool.begin().await?;

    // FOR SHARE keeps the comment from being deleted until the toggle commits.
    sqlx::query_scalar::<_, i64>("SELECT id FROM comments WHERE id = $1 FOR SHARE")
        .bind(comment_id)
        .fetch_optional(&mut *tx)
        .await?
        .ok_or(AppError::NotFound("Comment not found".to_string()))?;

    find_profile(&mut *tx, user_id).await?;

    let removed = sqlx::query("DELETE FROM comment_likes WHERE comment_id = $1 AND user_id = $2")
        .bind(comment_id)
        .bind(user_id)
        .execute(&mut *tx)
        .await?
        .rows_affected();

    let liked = if removed > 0 {
        false
    } else {
        let inserted = sqlx::query(
            r#"
            INSERT INTO comment_likes (comment_id, user_id)
            VALUES ($1, $2)
            ON CONFLICT (comment_id, user_id) DO NOTHING
            "#,
        )
        .bind(comment_id)
        .bind(user_id)
        .execute(&mut *tx)
        .await
        .map_err(|e| {
            tracing::error!("Failed to like comment {}: {:?}", comment_id, e);
            AppError::from(e)
        })?
        .rows_affected();

        if inserted == 0 {
            tracing::debug!(
                "Concurrent like on comment {} by user {} converged",
                comment_id,
                user_id
            );
        }
        true
    };

    tx.commit().await?;

    Ok(liked)
}

/// Number of likes currently recorded for a comment.
pub async fn count_likes(pool: &PgPool, comment_id: i64) -> Result<i64, AppError> {
    let count =
        sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM comment_likes WHERE comment_id = $1")
            .bind(comment_id)
            .fetch_one(pool)
            .await?;
    Ok(count)
}
