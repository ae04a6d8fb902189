// src/models/movie.rs

use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// Represents the 'movies' table: the minimal local mirror of a catalog title.
/// Rows are inserted on the first comment and never updated afterwards.
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct MovieReference {
    /// External title identifier (e.g. an IMDb id such as "tt0110912").
    pub id: String,
    pub title: String,
    pub production_year: Option<i32>,
    pub external_rating: Option<f64>,
    pub poster_url: Option<String>,
    pub created_at: chrono::DateTime<chrono::Utc>,
}

/// Canonical title metadata returned by the catalog collaborator.
#[derive(Debug, Clone, PartialEq)]
pub struct CatalogMovie {
    pub id: String,
    pub title: String,
    pub production_year: Option<i32>,
    pub external_rating: Option<f64>,
    pub poster_url: Option<String>,
}
