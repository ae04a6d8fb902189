// tests/comment_api_tests.rs

mod common;

use std::sync::Arc;

use common::{MemoryStorage, StubCatalog, seed_user, test_pool, unique_movie_id};
use movie_comments::{
    config::{Config, MediaFailurePolicy},
    routes,
    state::AppState,
};
use reqwest::multipart::{Form, Part};
use serde_json::Value;
use sqlx::PgPool;

const SECRET: &str = "test_secret_for_integration_tests";

/// Spawns the app on a random port for testing.
/// Returns the base URL (e.g., "http://127.0.0.1:12345") and the pool.
async fn spawn_app() -> (String, PgPool) {
    let pool = test_pool().await;

    let config = Config {
        database_url: std::env::var("DATABASE_URL").unwrap_or_default(),
        jwt_secret: SECRET.to_string(),
        rust_log: "error".to_string(),
        bind_addr: ([127, 0, 0, 1], 0).into(),
        catalog_base_url: "http://localhost".to_string(),
        catalog_api_key: None,
        upload_dir: std::env::temp_dir(),
        max_upload_bytes: 64 * 1024,
        media_failure_policy: MediaFailurePolicy::Rollback,
    };

    let state = AppState {
        pool: pool.clone(),
        config,
        catalog: Arc::new(StubCatalog::default()),
        media: Arc::new(MemoryStorage::default()),
    };

    let app = routes::create_router(state);

    // Bind to port 0 to get a random available port
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("Failed to bind random port");
    let port = listener.local_addr().unwrap().port();
    let address = format!("http://127.0.0.1:{}", port);

    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    (address, pool)
}

fn bearer(user_id: i64) -> String {
    common::bearer(user_id, SECRET)
}

#[tokio::test]
async fn health_check_404() {
    let (address, _pool) = spawn_app().await;
    let client = reqwest::Client::new();

    let response = client
        .get(format!("{}/random_path_that_does_not_exist", address))
        .send()
        .await
        .expect("Failed to execute request");

    assert_eq!(response.status().as_u16(), 404);
}

#[tokio::test]
async fn comment_lifecycle_over_http() {
    let (address, pool) = spawn_app().await;
    let client = reqwest::Client::new();
    let author = seed_user(&pool).await;
    let reader = seed_user(&pool).await;
    let movie = unique_movie_id();

    // Create with an image attachment
    let form = Form::new().text("content", "Great film||but slow start||").part(
        "media",
        Part::bytes(vec![0x89, b'P', b'N', b'G'])
            .file_name("still.png")
            .mime_str("image/png")
            .unwrap(),
    );
    let response = client
        .post(format!("{}/api/movies/{}/comments", address, movie))
        .header("Authorization", bearer(author))
        .multipart(form)
        .send()
        .await
        .expect("Failed to execute request");
    assert_eq!(response.status().as_u16(), 201);
    let created: Value = response.json().await.unwrap();
    let comment_id = created["id"].as_i64().expect("comment id");
    assert_eq!(created["content"], "Great film||but slow start||");
    assert_eq!(created["media"][0]["type"], "image");
    assert_eq!(created["likes"], 0);

    // Reply as another user
    let response = client
        .post(format!("{}/api/comments/{}/replies", address, comment_id))
        .header("Authorization", bearer(reader))
        .json(&serde_json::json!({ "content": "Agreed" }))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status().as_u16(), 201);
    let reply: Value = response.json().await.unwrap();
    let reply_id = reply["id"].as_i64().expect("reply id");

    // Replying to the reply is refused
    let response = client
        .post(format!("{}/api/comments/{}/replies", address, reply_id))
        .header("Authorization", bearer(author))
        .json(&serde_json::json!({ "content": "Deeper" }))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status().as_u16(), 400);

    // Like, then read as the liker
    let response = client
        .post(format!("{}/api/comments/{}/like", address, comment_id))
        .header("Authorization", bearer(reader))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status().as_u16(), 200);
    let toggled: Value = response.json().await.unwrap();
    assert_eq!(toggled["liked"], true);

    let page: Value = client
        .get(format!("{}/api/comments/{}", address, movie))
        .header("Authorization", bearer(reader))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(page["total"], 1);
    let thread = &page["comments"][0];
    assert_eq!(thread["id"], comment_id);
    assert_eq!(thread["likes"], 1);
    assert_eq!(thread["isLiked"], true);
    assert_eq!(thread["replyCount"], 1);
    assert_eq!(thread["replies"][0]["id"], reply_id);

    // Anonymous readers never see isLiked
    let page: Value = client
        .get(format!("{}/api/comments/{}", address, movie))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(page["comments"][0]["isLiked"], false);

    // Only the author may delete
    let response = client
        .delete(format!("{}/api/comments/{}", address, comment_id))
        .header("Authorization", bearer(reader))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status().as_u16(), 403);

    let response = client
        .delete(format!("{}/api/comments/{}", address, comment_id))
        .header("Authorization", bearer(author))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status().as_u16(), 204);

    let response = client
        .delete(format!("{}/api/comments/{}", address, comment_id))
        .header("Authorization", bearer(author))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status().as_u16(), 404);

    let page: Value = client
        .get(format!("{}/api/comments/{}", address, movie))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(page["total"], 0);
}

#[tokio::test]
async fn unknown_movie_returns_404() {
    let (address, pool) = spawn_app().await;
    let client = reqwest::Client::new();
    let author = seed_user(&pool).await;

    let form = Form::new().text("content", "Does this exist?");
    let response = client
        .post(format!("{}/api/movies/tt-missing-title/comments", address))
        .header("Authorization", bearer(author))
        .multipart(form)
        .send()
        .await
        .unwrap();

    assert_eq!(response.status().as_u16(), 404);
    let body: Value = response.json().await.unwrap();
    assert!(body["error"].is_string());
}

#[tokio::test]
async fn user_history_is_public() {
    let (address, pool) = spawn_app().await;
    let client = reqwest::Client::new();
    let author = seed_user(&pool).await;
    let movie = unique_movie_id();

    let response = client
        .post(format!("{}/api/movies/{}/comments", address, movie))
        .header("Authorization", bearer(author))
        .multipart(Form::new().text("content", "Worth a rewatch"))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status().as_u16(), 201);

    let history: Value = client
        .get(format!("{}/api/users/{}/comments", address, author))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(history["total"], 1);
    assert_eq!(history["comments"][0]["movieId"], movie);
    assert_eq!(history["comments"][0]["movieTitle"], "Pulp Fiction");
}
