// src/routes.rs

use axum::{
    Router,
    extract::DefaultBodyLimit,
    http::{HeaderValue, Method, header},
    middleware,
    routing::{get, post},
};
use tower_http::{cors::CorsLayer, services::ServeDir, trace::TraceLayer};

use crate::{
    clients::storage::PUBLIC_MEDIA_PREFIX,
    handlers::{comments, users},
    state::AppState,
    utils::jwt::auth_middleware,
};

/// Room for multipart boundaries and the text fields next to the file.
const MULTIPART_OVERHEAD: usize = 64 * 1024;

/// Assembles the main application router.
///
/// * Merges all sub-routers (comments, movies, users).
/// * Applies global middleware (Trace, CORS) and token verification on `/api`.
/// * Serves stored comment media.
pub fn create_router(state: AppState) -> Router {
    let origins = [
        HeaderValue::from_static("http://localhost:3000"),
        HeaderValue::from_static("http://127.0.0.1:3000"),
    ];

    let cors = CorsLayer::new()
        .allow_origin(origins)
        .allow_methods([Method::GET, Method::POST, Method::DELETE])
        .allow_headers([header::AUTHORIZATION, header::CONTENT_TYPE]);

    // `{id}` is a movie id on GET and a comment id everywhere else.
    let comment_routes = Router::new()
        .route(
            "/{id}",
            get(comments::list_comments).delete(comments::delete_comment),
        )
        .route("/{id}/replies", post(comments::create_reply))
        .route("/{id}/like", post(comments::toggle_like));

    let movie_routes = Router::new().route(
        "/{id}/comments",
        post(comments::create_comment).layer(DefaultBodyLimit::max(
            state.config.max_upload_bytes + MULTIPART_OVERHEAD,
        )),
    );

    let user_routes = Router::new().route("/{id}/comments", get(users::list_user_comments));

    let api_routes = Router::new()
        .nest("/comments", comment_routes)
        .nest("/movies", movie_routes)
        .nest("/users", user_routes)
        .layer(middleware::from_fn_with_state(state.clone(), auth_middleware));

    Router::new()
        .nest("/api", api_routes)
        .nest_service(PUBLIC_MEDIA_PREFIX, ServeDir::new(&state.config.upload_dir))
        // Global Middleware (applied from outside in)
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}
