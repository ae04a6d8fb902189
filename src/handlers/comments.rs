// src/handlers/comments.rs

use axum::{
    Json,
    extract::{Multipart, Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
};
use sqlx::PgPool;
use validator::Validate;

use crate::{
    error::AppError,
    models::{
        comment::{CreateReplyRequest, NewComment, NewReply, ThreadParams},
        media::{MediaUpload, validate_image_upload},
        pagination::Pagination,
    },
    services::{
        deletion, reactions,
        thread::{self, ThreadQuery},
        write,
    },
    state::AppState,
    utils::jwt::{AuthUser, Viewer},
};

/// List one page of a movie's comments (newest first) with nested replies.
/// Anonymous readers get `isLiked = false` everywhere.
pub async fn list_comments(
    State(pool): State<PgPool>,
    Viewer(viewer_id): Viewer,
    Path(movie_id): Path<String>,
    Query(params): Query<ThreadParams>,
) -> Result<impl IntoResponse, AppError> {
    let query = ThreadQuery {
        movie_id,
        pagination: Pagination::new(params.page, params.limit),
        viewer_id,
        reply_order: params.replies.unwrap_or_default(),
    };

    let page = thread::get_thread_page(&pool, &query).await?;

    Ok(Json(page))
}

/// Create a top-level comment.
/// Multipart form: `content` (text) and optional `media` (one image file).
pub async fn create_comment(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Path(movie_id): Path<String>,
    mut multipart: Multipart,
) -> Result<impl IntoResponse, AppError> {
    let mut content: Option<String> = None;
    let mut media: Option<MediaUpload> = None;

    while let Some(field) = multipart.next_field().await? {
        let name = field.name().unwrap_or_default().to_string();
        match name.as_str() {
            "content" => content = Some(field.text().await?),
            "media" => {
                let file_name = field.file_name().unwrap_or_default().to_string();
                let content_type = field
                    .content_type()
                    .unwrap_or("application/octet-stream")
                    .to_string();
                let bytes = field.bytes().await?;

                // Browsers submit an empty part when no file was picked.
                if file_name.is_empty() && bytes.is_empty() {
                    continue;
                }

                let upload = MediaUpload {
                    file_name,
                    content_type,
                    bytes: bytes.to_vec(),
                };
                validate_image_upload(&upload, state.config.max_upload_bytes)?;
                media = Some(upload);
            }
            other => tracing::debug!("Ignoring unexpected form field '{}'", other),
        }
    }

    let content = content.ok_or(AppError::BadRequest("Content is required".to_string()))?;

    let comment = write::create_comment(
        &state.pool,
        state.catalog.as_ref(),
        state.media.as_ref(),
        state.config.media_failure_policy,
        NewComment {
            movie_id,
            author_id: user_id,
            content,
            media,
        },
    )
    .await?;

    Ok((StatusCode::CREATED, Json(comment)))
}

/// Reply to a top-level comment. Replies to replies are rejected.
pub async fn create_reply(
    State(pool): State<PgPool>,
    AuthUser(user_id): AuthUser,
    Path(comment_id): Path<i64>,
    Json(payload): Json<CreateReplyRequest>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate()?;

    let reply = write::create_reply(
        &pool,
        NewReply {
            parent_id: comment_id,
            author_id: user_id,
            content: payload.content,
        },
    )
    .await?;

    Ok((StatusCode::CREATED, Json(reply)))
}

/// Toggle the caller's like on a comment or reply.
pub async fn toggle_like(
    State(pool): State<PgPool>,
    AuthUser(user_id): AuthUser,
    Path(comment_id): Path<i64>,
) -> Result<impl IntoResponse, AppError> {
    let liked = reactions::toggle_like(&pool, comment_id, user_id).await?;

    Ok(Json(serde_json::json!({ "liked": liked })))
}

/// Delete a comment or reply.
/// Requires: Login + Author.
pub async fn delete_comment(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Path(comment_id): Path<i64>,
) -> Result<impl IntoResponse, AppError> {
    deletion::delete_comment(&state.pool, state.media.as_ref(), comment_id, user_id).await?;

    Ok(StatusCode::NO_CONTENT)
}
