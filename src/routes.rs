// src/routes.rs

use axum::{
    Router, http::Method, middleware,
    routing::{get, post, put},
};
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::{
    handlers::{auth, history, practice},
    state::AppState,
    utils::jwt::auth_middleware,
};

/// Assembles the main application router.
///
/// * Merges all sub-routers (auth, practice, history).
/// * Everything except login sits behind the session-token middleware.
/// * Applies global middleware (Trace, CORS).
/// * Injects global state.
pub fn create_router(state: AppState) -> Router {
    let origins: [axum::http::HeaderValue; 2] = [
        "http://localhost:3000".parse().unwrap(),
        "http://127.0.0.1:3000".parse().unwrap(),
    ];

    let cors = CorsLayer::new()
        .allow_origin(origins)
        .allow_methods([Method::GET, Method::POST, Method::PUT])
        .allow_headers([
            axum::http::header::AUTHORIZATION,
            axum::http::header::CONTENT_TYPE,
        ]);

    let auth_routes = Router::new().route("/login", post(auth::login));

    let practice_routes = Router::new()
        .route("/topics", get(practice::list_topics))
        .route("/generate", post(practice::generate))
        .route("/generate/stream", post(practice::generate_stream))
        .route("/session", get(practice::session_view))
        .route("/draft", put(practice::update_draft))
        .route("/structure", post(practice::structure_hint))
        .route("/evaluate", post(practice::evaluate))
        .route("/timer", post(practice::arm_timer).get(practice::timer_status))
        .layer(middleware::from_fn_with_state(state.clone(), auth_middleware));

    let history_routes = Router::new()
        .route("/", get(history::list_history))
        .layer(middleware::from_fn_with_state(state.clone(), auth_middleware));

    Router::new()
        .nest("/api/auth", auth_routes)
        .nest("/api/practice", practice_routes)
        .nest("/api/history", history_routes)
        // Global Middleware (applied from outside in)
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}
