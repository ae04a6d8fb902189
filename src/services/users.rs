// src/services/users.rs

use sqlx::{PgExecutor, PgPool};

use crate::{
    error::AppError,
    models::{
        pagination::Pagination,
        user::{UserCommentPage, UserCommentView, UserProfile},
    },
};

/// Loads the author fields shown next to a comment.
pub async fn find_profile<'e, E>(executor: E, user_id: i64) -> Result<UserProfile, AppError>
where
    E: PgExecutor<'e>,
{
    sqlx::query_as::<_, UserProfile>("SELECT id, username, avatar_url FROM users WHERE id = $1")
        .bind(user_id)
        .fetch_optional(executor)
        .await?
        .ok_or(AppError::NotFound("User not found".to_string()))
}

/// Lists a user's comments and replies, newest first, with the commented title.
pub async fn list_user_comments(
    pool: &PgPool,
    user_id: i64,
    pagination: Pagination,
) -> Result<UserCommentPage, AppError> {
    let comments = sqlx::query_as::<_, UserCommentView>(
        r#"
        SELECT
            c.id, c.movie_id, m.title AS movie_title, m.poster_url AS movie_poster_url,
            c.content, m.external_rating AS rating, c.created_at
        FROM comments c
        JOIN movies m ON m.id = c.movie_id
        WHERE c.user_id = $1
        ORDER BY c.created_at DESC, c.id DESC
        LIMIT $2 OFFSET $3
        "#,
    )
    .bind(user_id)
    .bind(pagination.limit)
    .bind(pagination.offset())
    .fetch_all(pool)
    .await?;

    let total = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM comments WHERE user_id = $1")
        .bind(user_id)
        .fetch_one(pool)
        .await?;

    Ok(UserCommentPage {
        comments,
        total,
        page: pagination.page,
        limit: pagination.limit,
        total_pages: pagination.total_pages(total),
    })
}
