use axum::{
    middleware,
    routing::{get, post},
    Router,
};
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use super::handlers;
use super::AppState;
use crate::middleware::{make_span_with_request_id, request_id_middleware};

/// Creates the application router with all routes
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(handlers::health_check))
        .nest("/api/v1", api_routes())
        .layer(TraceLayer::new_for_http().make_span_with(make_span_with_request_id))
        .layer(middleware::from_fn(request_id_middleware))
        .layer(CorsLayer::permissive())
        .with_state(state)
}

/// API routes under /api/v1
fn api_routes() -> Router<AppState> {
    Router::new()
        // Onboarding catalogs
        .route("/industries", get(handlers::list_industries))
        .route("/genres", get(handlers::list_genres))
        .route("/titles/search", get(handlers::search_titles))
        .route("/trending", get(handlers::trending))
        // Preferences
        .route(
            "/preferences",
            get(handlers::get_preferences)
                .put(handlers::save_preferences)
                .delete(handlers::clear_preferences),
        )
        // Feed
        .route("/feed", get(handlers::get_feed))
        .route("/feed/refresh", post(handlers::refresh_feed))
        .route("/feed/more", post(handlers::load_more))
        // Details
        .route("/movies/:id", get(handlers::open_movie))
        .route("/movies/:id/similar", get(handlers::similar_movies))
        .route("/corpus/:id/similar", get(handlers::corpus_similar))
}
