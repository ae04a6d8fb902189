// src/services/movies.rs

use sqlx::PgPool;

use crate::{
    clients::CatalogClient,
    error::AppError,
    models::movie::{CatalogMovie, MovieReference},
};

pub async fn find_movie(pool: &PgPool, movie_id: &str) -> Result<Option<MovieReference>, AppError> {
    let movie = sqlx::query_as::<_, MovieReference>(
        r#"
        SELECT id, title, production_year, external_rating, poster_url, created_at
        FROM movies
        WHERE id = $1
        "#,
    )
    .bind(movie_id)
    .fetch_optional(pool)
    .await?;

    Ok(movie)
}

/// Makes sure a local movie row exists, materializing it from the catalog
/// the first time a title is commented on.
///
/// Fails with `NotFound` when the catalog does not know the title, so a
/// comment can never point at a nonexistent movie.
pub async fn ensure_movie_reference(
    pool: &PgPool,
    catalog: &dyn CatalogClient,
    movie_id: &str,
) -> Result<(), AppError> {
    if movie_id.trim().is_empty() || movie_id.len() > 50 {
        return Err(AppError::BadRequest("Invalid movie id".to_string()));
    }

    if find_movie(pool, movie_id).await?.is_some() {
        return Ok(());
    }

    let canonical = catalog
        .fetch_movie(movie_id)
        .await?
        .ok_or(AppError::NotFound("Movie not found".to_string()))?;

    insert_movie_stub(pool, movie_id, &canonical).await?;
    tracing::info!("Materialized movie reference {} ({})", movie_id, canonical.title);
    Ok(())
}

/// Two first comments may race here; the loser's insert is a no-op.
async fn insert_movie_stub(
    pool: &PgPool,
    movie_id: &str,
    movie: &CatalogMovie,
) -> Result<(), AppError> {
    sqlx::query(
        r#"
        INSERT INTO movies (id, title, production_year, external_rating, poster_url)
        VALUES ($1, $2, $3, $4, $5)
        ON CONFLICT (id) DO NOTHING
        "#,
    )
    .bind(movie_id)
    .bind(&movie.title)
    .bind(movie.production_year)
    .bind(movie.external_rating)
    .bind(&movie.poster_url)
    .execute(pool)
    .await?;

    Ok(())
}
