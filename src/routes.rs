// src/routes.rs

use axum::{
    Json, Router,
    http::Method,
    middleware,
    routing::{get, post, put},
};
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use utoipa::OpenApi;

use crate::{
    docs::ApiDoc,
    handlers::{auth, quiz, result},
    state::AppState,
    utils::jwt::auth_middleware,
};

/// Assembles the main application router.
///
/// * Public routes: auth, quiz browsing, leaderboard, OpenAPI document.
/// * Protected routes sit behind `auth_middleware`.
/// * Applies global middleware (Trace, CORS).
pub fn create_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(tower_http::cors::Any)
        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::DELETE])
        .allow_headers([
            axum::http::header::AUTHORIZATION,
            axum::http::header::CONTENT_TYPE,
        ]);

    let auth_routes = Router::new()
        .route("/register", post(auth::register))
        .route("/login", post(auth::login));

    let quiz_routes = Router::new()
        .route("/", get(quiz::list_quizzes))
        .route("/{id}", get(quiz::get_quiz))
        // Protected quiz routes
        .merge(
            Router::new()
                .route("/", post(quiz::create_quiz))
                .route("/{id}", put(quiz::update_quiz).delete(quiz::delete_quiz))
                .route("/{id}/attempt", get(quiz::get_quiz_for_attempt))
                .route("/{id}/publish", put(quiz::toggle_publish))
                .route_layer(middleware::from_fn_with_state(
                    state.clone(),
                    auth_middleware,
                )),
        );

    let result_routes = Router::new()
        .route("/leaderboard", get(result::get_leaderboard))
        // Protected result routes
        .merge(
            Router::new()
                .route("/", post(result::submit_result).get(result::list_my_results))
                .route("/stats/{user_id}", get(result::get_user_stats))
                .route("/{id}", get(result::get_result))
                .route_layer(middleware::from_fn_with_state(
                    state.clone(),
                    auth_middleware,
                )),
        );

    Router::new()
        .route("/", get(|| async { "Quiz API is running..." }))
        .route("/api/openapi.json", get(|| async { Json(ApiDoc::openapi()) }))
        .nest("/api/auth", auth_routes)
        .nest("/api/quizzes", quiz_routes)
        .nest("/api/results", result_routes)
        // Global Middleware (applied from outside in)
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}
