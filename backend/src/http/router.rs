//! Router configuration for the HTTP API.
//!
//! This module sets up all routes, middleware (CORS, compression, tracing),
//! and creates the axum router ready for serving.

use axum::{
    extract::DefaultBodyLimit,
    routing::{get, post},
    Router,
};
use tower_http::{
    compression::CompressionLayer,
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

use super::handlers;
use super::state::AppState;

/// Upper bound for uploaded spreadsheets.
const MAX_UPLOAD_BYTES: usize = 50 * 1024 * 1024;

/// Create the main application router with all routes and middleware.
pub fn create_router(state: AppState) -> Router {
    // CORS configuration - permissive for development, should be restricted in production
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let api_v1 = Router::new()
        // Revisions and ingestion
        .route(
            "/revisions",
            post(handlers::upload_revision).get(handlers::list_revisions),
        )
        .route("/revisions/{revision_id}", get(handlers::get_revision))
        .route("/revisions/{revision_id}/verify", post(handlers::verify_revision))
        .route("/revisions/{revision_id}/commit", post(handlers::commit_revision))
        .route(
            "/revisions/{revision_id}/courses",
            get(handlers::list_revision_courses),
        )
        .route("/schedules", get(handlers::list_schedules))
        // Guidelines
        .route(
            "/guidelines",
            post(handlers::create_guideline).get(handlers::search_guidelines_handler),
        )
        .route(
            "/guidelines/{guideline_id}",
            get(handlers::get_guideline).delete(handlers::delete_guideline),
        )
        // Reference data
        .route("/campuses", post(handlers::create_campus))
        .route("/departments", post(handlers::create_department))
        .route(
            "/buildings",
            post(handlers::create_building).get(handlers::list_buildings),
        )
        .route(
            "/faculty",
            post(handlers::create_faculty).get(handlers::list_faculty),
        );

    Router::new()
        .route("/health", get(handlers::health_check))
        .nest("/v1", api_v1)
        .layer(DefaultBodyLimit::max(MAX_UPLOAD_BYTES))
        .layer(CompressionLayer::new())
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}
