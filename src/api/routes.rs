use axum::{
    middleware,
    routing::{get, post},
    Router,
};
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::middleware::request_id::{make_span_with_request_id, request_id_middleware};

use super::handlers;
use super::AppState;

/// Creates the main API router with all routes
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(handlers::health_check))
        .nest("/api/v1", api_routes())
        .layer(TraceLayer::new_for_http().make_span_with(make_span_with_request_id))
        // outermost, so the trace span can read the id
        .layer(middleware::from_fn(request_id_middleware))
        .layer(CorsLayer::permissive())
        .with_state(state)
}

/// API routes under /api/v1
fn api_routes() -> Router<AppState> {
    Router::new()
        // Predictor
        .route("/options", get(handlers::get_form_options))
        .route("/estimate", post(handlers::estimate))
        // Analysis
        .route("/analysis/sectors", get(handlers::get_sector_summaries))
        .route("/analysis/sector-names", get(handlers::get_sectors))
        .route("/analysis/words", get(handlers::get_word_cloud))
        // Recommendation
        .route("/locations", get(handlers::get_locations))
        .route("/properties", get(handlers::get_properties))
        .route("/nearby", get(handlers::get_nearby))
        .route("/recommendations/:property_name", get(handlers::get_recommendations))
}
