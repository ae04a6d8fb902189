// tests/common/mod.rs

#![allow(dead_code)]

use std::{
    collections::HashMap,
    sync::{
        Mutex,
        atomic::{AtomicUsize, Ordering},
    },
};

use async_trait::async_trait;
use movie_comments::{
    clients::{CatalogClient, MediaStorage},
    error::AppError,
    models::{media::MediaUpload, movie::CatalogMovie},
    utils::jwt::Claims,
};
use sqlx::{PgPool, postgres::PgPoolOptions};

/// Connects to the test database and applies migrations.
pub async fn test_pool() -> PgPool {
    // Note: For Postgres, you must have a running database.
    let database_url = std::env::var("DATABASE_URL").expect("DATABASE_URL must be set");

    let pool = PgPoolOptions::new()
        .max_connections(5)
        .connect(&database_url)
        .await
        .expect("Failed to connect to Postgres for testing. Make sure DATABASE_URL is set.");

    sqlx::migrate!("./migrations")
        .run(&pool)
        .await
        .expect("Failed to migrate database");

    pool
}

/// An `Authorization` header value as the authentication service would issue it.
pub fn bearer(user_id: i64, secret: &str) -> String {
    let claims = Claims {
        sub: user_id.to_string(),
        exp: jsonwebtoken::get_current_timestamp() as usize + 600,
    };
    let token = jsonwebtoken::encode(
        &jsonwebtoken::Header::default(),
        &claims,
        &jsonwebtoken::EncodingKey::from_secret(secret.as_bytes()),
    )
    .expect("Failed to sign test token");
    format!("Bearer {}", token)
}

/// Inserts a user into the mirror table and returns its id.
pub async fn seed_user(pool: &PgPool) -> i64 {
    let username = format!("u_{}", &uuid::Uuid::new_v4().simple().to_string()[..12]);
    sqlx::query_scalar::<_, i64>(
        "INSERT INTO users (username, avatar_url) VALUES ($1, $2) RETURNING id",
    )
    .bind(&username)
    .bind(format!("/avatars/{}.png", username))
    .fetch_one(pool)
    .await
    .expect("Failed to seed user")
}

/// A movie id no other test uses.
pub fn unique_movie_id() -> String {
    format!("tt{}", &uuid::Uuid::new_v4().simple().to_string()[..16])
}

pub async fn count(pool: &PgPool, sql: &str, id: i64) -> i64 {
    sqlx::query_scalar::<_, i64>(sql)
        .bind(id)
        .fetch_one(pool)
        .await
        .expect("count query failed")
}

/// Knows every title except ids containing "missing".
#[derive(Default)]
pub struct StubCatalog {
    pub lookups: AtomicUsize,
}

impl StubCatalog {
    pub fn lookups(&self) -> usize {
        self.lookups.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl CatalogClient for StubCatalog {
    async fn fetch_movie(&self, movie_id: &str) -> Result<Option<CatalogMovie>, AppError> {
        self.lookups.fetch_add(1, Ordering::SeqCst);
        if movie_id.contains("missing") {
            return Ok(None);
        }
        Ok(Some(CatalogMovie {
            id: movie_id.to_string(),
            title: "Pulp Fiction".to_string(),
            production_year: Some(1994),
            external_rating: Some(8.9),
            poster_url: Some("https://img.example/pulp.jpg".to_string()),
        }))
    }
}

pub struct DownCatalog;

#[async_trait]
impl CatalogClient for DownCatalog {
    async fn fetch_movie(&self, _movie_id: &str) -> Result<Option<CatalogMovie>, AppError> {
        Err(AppError::Upstream("catalog timed out".to_string()))
    }
}

/// Keeps uploads in memory, keyed by the URL it hands out.
#[derive(Default)]
pub struct MemoryStorage {
    files: Mutex<HashMap<String, Vec<u8>>>,
    next: AtomicUsize,
}

impl MemoryStorage {
    pub fn contains(&self, url: &str) -> bool {
        self.files.lock().unwrap().contains_key(url)
    }

    pub fn len(&self) -> usize {
        self.files.lock().unwrap().len()
    }
}

#[async_trait]
impl MediaStorage for MemoryStorage {
    async fn store(&self, upload: &MediaUpload) -> Result<String, AppError> {
        let n = self.next.fetch_add(1, Ordering::SeqCst);
        let url = format!(
            "/uploads/comments/mem-{}.{}",
            n,
            upload.extension().unwrap_or_else(|| "bin".into())
        );
        self.files.lock().unwrap().insert(url.clone(), upload.bytes.clone());
        Ok(url)
    }

    async fn remove(&self, url: &str) -> Result<(), AppError> {
        self.files.lock().unwrap().remove(url);
        Ok(())
    }
}

pub struct BrokenStorage;

#[async_trait]
impl MediaStorage for BrokenStorage {
    async fn store(&self, _upload: &MediaUpload) -> Result<String, AppError> {
        Err(AppError::Upstream("disk full".to_string()))
    }

    async fn remove(&self, _url: &str) -> Result<(), AppError> {
        Ok(())
    }
}

pub fn png(name: &str) -> MediaUpload {
    MediaUpload {
        file_name: name.to_string(),
        content_type: "image/png".to_string(),
        bytes: vec![0x89, b'P', b'N', b'G'],
    }
}
