// src/handlers/users.rs

use axum::{
    Json,
    extract::{Path, Query, State},
    response::IntoResponse,
};
use sqlx::PgPool;

use crate::{
    error::AppError,
    models::{pagination::Pagination, user::HistoryParams},
    services::users,
};

/// List a user's comment history for their profile page.
pub async fn list_user_comments(
    State(pool): State<PgPool>,
    Path(user_id): Path<i64>,
    Query(params): Query<HistoryParams>,
) -> Result<impl IntoResponse, AppError> {
    let page =
        users::list_user_comments(&pool, user_id, Pagination::new(params.page, params.limit)).await?;

    Ok(Json(page))
}
