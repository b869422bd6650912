// src/routes.rs

use axum::{
    Router,
    extract::DefaultBodyLimit,
    http::{HeaderValue, Method, header},
    routing::{get, post},
};
use tower_http::{cors::CorsLayer, services::ServeDir, trace::TraceLayer};

use crate::{
    handlers::{auth, comment, post, user},
    state::AppState,
};

/// Assembles the main application router.
///
/// * Merges all sub-routers (auth, user, post, comment) under `/api`.
/// * Serves locally hosted images under `/uploads`.
/// * Applies global middleware (Trace, CORS).
///
/// Protected handlers take a `CurrentUser`/`AdminUser` extractor, so public
/// and protected methods can share a path.
pub fn create_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin([
            HeaderValue::from_static("http://localhost:3000"),
            HeaderValue::from_static("http://127.0.0.1:3000"),
        ])
        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::DELETE])
        .allow_headers([header::AUTHORIZATION, header::CONTENT_TYPE]);

    let auth_routes = Router::new()
        .route("/register", post(auth::register))
        .route("/login", post(auth::login));

    let user_routes = Router::new()
        .route(
            "/",
            get(user::list_users)
                .put(user::update_user)
                .delete(user::delete_user),
        )
        .route("/{user_id}", get(user::get_user));

    let post_routes = Router::new()
        .route("/", get(post::list_posts).post(post::create_post))
        .route(
            "/upload",
            post(post::upload_image).layer(DefaultBodyLimit::max(state.config.max_upload_bytes)),
        )
        .route("/like/{post_id}", post(post::toggle_like))
        .route(
            "/{post_id}",
            get(post::get_post)
                .put(post::update_post)
                .delete(post::delete_post),
        );

    let comment_routes = Router::new()
        .route(
            "/",
            post(comment::create_comment)
                .put(comment::update_comment)
                .delete(comment::delete_comment),
        )
        .route("/post/{post_id}", get(comment::list_post_comments))
        .route("/like/{comment_id}", post(comment::toggle_like))
        .route("/{comment_id}", get(comment::get_comment));

    let uploads = ServeDir::new(&state.config.upload_dir);

    Router::new()
        .nest("/api/auth", auth_routes)
        .nest("/api/user", user_routes)
        .nest("/api/post", post_routes)
        .nest("/api/comment", comment_routes)
        .nest_service("/uploads", uploads)
        // Global Middleware (applied from outside in)
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}
