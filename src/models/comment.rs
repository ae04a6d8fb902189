// src/models/comment.rs

use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use validator::Validate;

use crate::{
    error::AppError,
    models::media::{MediaUpload, MediaView},
};

/// Longest comment body accepted, in characters.
pub const MAX_CONTENT_CHARS: usize = 2000;

/// Represents the 'comments' table in the database.
/// `parent_id` is NULL for top-level comments and points at a top-level
/// comment for replies. Deeper nesting is rejected by the write path.
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct Comment {
    pub id: i64,
    pub user_id: i64,
    pub movie_id: String,
    pub parent_id: Option<i64>,
    pub content: String,
    pub created_at: chrono::DateTime<chrono::Utc>,
    pub updated_at: chrono::DateTime<chrono::Utc>,
}

impl Comment {
    pub fn is_reply(&self) -> bool {
        self.parent_id.is_some()
    }
}

/// One comment or reply joined with its author and aggregated counters,
/// as produced by the thread read queries.
#[derive(Debug, Clone, FromRow)]
pub struct CommentRow {
    pub id: i64,
    pub parent_id: Option<i64>,
    pub user_id: i64,
    pub username: Option<String>,
    pub user_avatar: Option<String>,
    pub content: String,
    pub likes: i64,
    pub is_liked: bool,
    pub reply_count: i64,
    pub created_at: chrono::DateTime<chrono::Utc>,
}

/// DTO for displaying a top-level comment with its replies.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct CommentView {
    pub id: i64,
    pub user_id: i64,
    pub username: Option<String>,
    pub user_avatar: Option<String>,
    pub content: String,
    pub likes: i64,
    pub is_liked: bool,
    pub replies: Vec<ReplyView>,
    pub reply_count: i64,
    pub media: Vec<MediaView>,
    pub created_at: chrono::DateTime<chrono::Utc>,
}

/// DTO for displaying a reply. Same shape as `CommentView` without nesting.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ReplyView {
    pub id: i64,
    pub user_id: i64,
    pub username: Option<String>,
    pub user_avatar: Option<String>,
    pub content: String,
    pub likes: i64,
    pub is_liked: bool,
    pub media: Vec<MediaView>,
    pub created_at: chrono::DateTime<chrono::Utc>,
}

impl From<CommentRow> for CommentView {
    fn from(row: CommentRow) -> Self {
        Self {
            id: row.id,
            user_id: row.user_id,
            username: row.username,
            user_avatar: row.user_avatar,
            content: row.content,
            likes: row.likes,
            is_liked: row.is_liked,
            replies: Vec::new(),
            reply_count: row.reply_count,
            media: Vec::new(),
            created_at: row.created_at,
        }
    }
}

impl From<CommentRow> for ReplyView {
    fn from(row: CommentRow) -> Self {
        Self {
            id: row.id,
            user_id: row.user_id,
            username: row.username,
            user_avatar: row.user_avatar,
            content: row.content,
            likes: row.likes,
            is_liked: row.is_liked,
            media: Vec::new(),
            created_at: row.created_at,
        }
    }
}

/// DTO for creating a reply.
#[derive(Debug, Deserialize, Validate)]
pub struct CreateReplyRequest {
    #[validate(length(
        min = 1,
        max = 2000,
        message = "Content must be between 1 and 2000 characters"
    ))]
    pub content: String,
}

/// Input of the top-level comment write path.
#[derive(Debug)]
pub struct NewComment {
    pub movie_id: String,
    pub author_id: i64,
    pub content: String,
    pub media: Option<MediaUpload>,
}

/// Input of the reply write path. The movie is always taken from the parent.
#[derive(Debug)]
pub struct NewReply {
    pub parent_id: i64,
    pub author_id: i64,
    pub content: String,
}

/// Order in which replies are nested under their parent.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReplyOrder {
    #[default]
    Asc,
    Desc,
}

/// Query parameters for reading a thread page.
#[derive(Debug, Default, Deserialize)]
pub struct ThreadParams {
    /// 1-indexed page number (default: 1).
    pub page: Option<i64>,

    /// Top-level comments per page (default: 10, max: 50).
    pub limit: Option<i64>,

    /// Reply ordering: 'asc' (default) or 'desc'.
    pub replies: Option<ReplyOrder>,
}

/// One page of a movie's discussion.
#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ThreadPage {
    pub comments: Vec<CommentView>,
    pub total: i64,
    pub page: i64,
    pub limit: i64,
    pub total_pages: i64,
}

/// Checks a comment body and returns it unchanged.
/// Blank bodies are rejected; the length limit counts every character sent.
pub fn validate_content(raw: &str) -> Result<String, AppError> {
    if raw.trim().is_empty() {
        return Err(AppError::BadRequest("Content is required".to_string()));
    }
    if raw.chars().count() > MAX_CONTENT_CHARS {
        return Err(AppError::BadRequest(format!(
            "Content must be {} characters or less",
            MAX_CONTENT_CHARS
        )));
    }
    Ok(raw.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn whitespace_only_content_is_rejected() {
        assert!(matches!(validate_content("   \n\t "), Err(AppError::BadRequest(_))));
        assert!(matches!(validate_content(""), Err(AppError::BadRequest(_))));
    }

    #[test]
    fn oversized_content_is_rejected() {
        let long = "a".repeat(MAX_CONTENT_CHARS + 1);
        assert!(matches!(validate_content(&long), Err(AppError::BadRequest(_))));

        let exact = "é".repeat(MAX_CONTENT_CHARS);
        assert_eq!(validate_content(&exact).unwrap().chars().count(), MAX_CONTENT_CHARS);
    }

    #[test]
    fn content_is_kept_verbatim() {
        let content = validate_content("Great film||but slow start||").unwrap();
        assert_eq!(content, "Great film||but slow start||");

        assert_eq!(validate_content("  indented\n").unwrap(), "  indented\n");
    }

    #[test]
    fn surrounding_whitespace_counts_toward_the_limit() {
        let padded = format!("  {}  ", "a".repeat(MAX_CONTENT_CHARS - 1));
        assert!(matches!(validate_content(&padded), Err(AppError::BadRequest(_))));

        let fits = format!(" {}", "a".repeat(MAX_CONTENT_CHARS - 1));
        assert_eq!(validate_content(&fits).unwrap(), fits);
    }

    #[test]
    fn reply_order_defaults_to_ascending() {
        let params: ThreadParams = serde_json::from_str(r#"{"page": 2}"#).unwrap();
        assert_eq!(params.replies.unwrap_or_default(), ReplyOrder::Asc);

        let params: ThreadParams = serde_json::from_str(r#"{"replies": "desc"}"#).unwrap();
        assert_eq!(params.replies, Some(ReplyOrder::Desc));
    }

    #[test]
    fn views_serialize_in_camel_case() {
        let view = ReplyView {
            id: 3,
            user_id: 7,
            username: Some("vincent".into()),
            user_avatar: None,
            content: "Royale with cheese".into(),
            likes: 0,
            is_liked: false,
            media: vec![],
            created_at: chrono::Utc::now(),
        };
        let json = serde_json::to_value(&view).unwrap();
        assert_eq!(json["userId"], 7);
        assert_eq!(json["isLiked"], false);
        assert!(json.get("userAvatar").is_some());
        assert!(json.get("replies").is_none());
    }
}
