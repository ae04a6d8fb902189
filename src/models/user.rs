// src/models/user.rs

use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// Represents the 'users' mirror table.
/// Rows are maintained by the authentication service; this crate only reads
/// them to denormalize author fields into comment views.
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct UserProfile {
    pub id: i64,
    pub username: String,
    pub avatar_url: Option<String>,
}

/// One entry of a user's comment history, joined with the commented title.
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserCommentView {
    pub id: i64,
    pub movie_id: String,
    pub movie_title: String,
    pub movie_poster_url: Option<String>,
    pub content: String,
    pub rating: Option<f64>,
    pub created_at: chrono::DateTime<chrono::Utc>,
}

/// Query parameters for a user's comment history.
#[derive(Debug, Default, Deserialize)]
pub struct HistoryParams {
    pub page: Option<i64>,
    pub limit: Option<i64>,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserCommentPage {
    pub comments: Vec<UserCommentView>,
    pub total: i64,
    pub page: i64,
    pub limit: i64,
    pub total_pages: i64,
}
