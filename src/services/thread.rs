// src/services/thread.rs

use std::collections::HashMap;

use sqlx::PgPool;

use crate::{
    error::AppError,
    models::{
        comment::{CommentRow, CommentView, ReplyOrder, ReplyView, ThreadPage},
        media::{MediaAttachment, MediaView},
        pagination::Pagination,
    },
};

/// Everything needed to read one page of a movie's discussion.
#[derive(Debug, Clone)]
pub struct ThreadQuery {
    pub movie_id: String,
    pub pagination: Pagination,
    /// The reader, when authenticated. Drives `is_liked`.
    pub viewer_id: Option<i64>,
    pub reply_order: ReplyOrder,
}

// Counters are computed per row with correlated subqueries, which the
// (comment_id) and (parent_id) indexes keep cheap.
const TOP_LEVEL_PAGE: &str = r#"
    SELECT
        c.id, c.parent_id, c.user_id,
        u.username, u.avatar_url AS user_avatar,
        c.content, c.created_at,
        (SELECT COUNT(*) FROM comment_likes l WHERE l.comment_id = c.id) AS likes,
        EXISTS(
            SELECT 1 FROM comment_likes l
            WHERE l.comment_id = c.id AND l.user_id = $2
        ) AS is_liked,
        (SELECT COUNT(*) FROM comments r WHERE r.parent_id = c.id) AS reply_count
    FROM comments c
    LEFT JOIN users u ON u.id = c.user_id
    WHERE c.movie_id = $1 AND c.parent_id IS NULL
    ORDER BY c.created_at DESC, c.id DESC
    LIMIT $3 OFFSET $4
"#;

const REPLIES_SELECT: &str = r#"
    SELECT
        c.id, c.parent_id, c.user_id,
        u.username, u.avatar_url AS user_avatar,
        c.content, c.created_at,
        (SELECT COUNT(*) FROM comment_likes l WHERE l.comment_id = c.id) AS likes,
        EXISTS(
            SELECT 1 FROM comment_likes l
            WHERE l.comment_id = c.id AND l.user_id = $2
        ) AS is_liked,
        0::BIGINT AS reply_count
    FROM comments c
    LEFT JOIN users u ON u.id = c.user_id
    WHERE c.parent_id = ANY($1)
"#;

/// Reads one page of top-level comments with all of their replies nested.
///
/// Four queries at most: the page itself, the replies of every comment on the
/// page, the media of all of those, and the total count. The count is not
/// taken in the same snapshot as the page, so concurrent inserts can make the
/// two disagree by a few rows.
pub async fn get_thread_page(pool: &PgPool, query: &ThreadQuery) -> Result<ThreadPage, AppError> {
    let Pagination { page, limit } = query.pagination;

    let top_level = sqlx::query_as::<_, CommentRow>(TOP_LEVEL_PAGE)
        .bind(&query.movie_id)
        .bind(query.viewer_id)
        .bind(limit)
        .bind(query.pagination.offset())
        .fetch_all(pool)
        .await
        .map_err(|e| {
            tracing::error!("Failed to load comments for {}: {:?}", query.movie_id, e);
            AppError::from(e)
        })?;

    if top_level.is_empty() {
        // An empty first page means the movie has no comments at all.
        let total = if page == 1 {
            0
        } else {
            count_top_level(pool, &query.movie_id).await?
        };
        return Ok(ThreadPage {
            comments: Vec::new(),
            total,
            page,
            limit,
            total_pages: query.pagination.total_pages(total),
        });
    }

    let parent_ids: Vec<i64> = top_level.iter().map(|c| c.id).collect();

    let replies_sql = match query.reply_order {
        ReplyOrder::Asc => format!("{} ORDER BY c.created_at ASC, c.id ASC", REPLIES_SELECT),
        ReplyOrder::Desc => format!("{} ORDER BY c.created_at DESC, c.id DESC", REPLIES_SELECT),
    };
    let replies = sqlx::query_as::<_, CommentRow>(&replies_sql)
        .bind(&parent_ids)
        .bind(query.viewer_id)
        .fetch_all(pool)
        .await?;

    let mut owner_ids = parent_ids;
    owner_ids.extend(replies.iter().map(|r| r.id));

    let media = sqlx::query_as::<_, MediaAttachment>(
        r#"
        SELECT id, comment_id, type, url, created_at
        FROM comment_media
        WHERE comment_id = ANY($1)
        ORDER BY id ASC
        "#,
    )
    .bind(&owner_ids)
    .fetch_all(pool)
    .await?;

    let total = count_top_level(pool, &query.movie_id).await?;

    Ok(ThreadPage {
        comments: assemble_thread(top_level, replies, media),
        total,
        page,
        limit,
        total_pages: query.pagination.total_pages(total),
    })
}

async fn count_top_level(pool: &PgPool, movie_id: &str) -> Result<i64, AppError> {
    let total = sqlx::query_scalar::<_, i64>(
        "SELECT COUNT(*) FROM comments WHERE movie_id = $1 AND parent_id IS NULL",
    )
    .bind(movie_id)
    .fetch_one(pool)
    .await?;
    Ok(total)
}

/// Nests replies under their parents and attaches media by owner id.
/// Input order of `top_level` and `replies` is preserved.
pub fn assemble_thread(
    top_level: Vec<CommentRow>,
    replies: Vec<CommentRow>,
    media: Vec<MediaAttachment>,
) -> Vec<CommentView> {
    let mut media_by_owner: HashMap<i64, Vec<MediaView>> = HashMap::new();
    for attachment in media {
        media_by_owner
            .entry(attachment.comment_id)
            .or_default()
            .push(attachment.into());
    }

    let mut replies_by_parent: HashMap<i64, Vec<ReplyView>> = HashMap::new();
    for row in replies {
        let Some(parent_id) = row.parent_id else {
            continue;
        };
        let id = row.id;
        let mut reply = ReplyView::from(row);
        reply.media = media_by_owner.remove(&id).unwrap_or_default();
        replies_by_parent.entry(parent_id).or_default().push(reply);
    }

    top_level
        .into_iter()
        .map(|row| {
            let id = row.id;
            let mut comment = CommentView::from(row);
            comment.replies = replies_by_parent.remove(&id).unwrap_or_default();
            comment.media = media_by_owner.remove(&id).unwrap_or_default();
            comment
        })
        .collect()
}
