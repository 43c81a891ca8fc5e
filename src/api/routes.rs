use axum::{
    middleware,
    routing::{get, post},
    Router,
};
use tower::ServiceBuilder;
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::middleware::{make_span_with_request_id, request_id_middleware};

use super::handlers;
use super::AppState;

/// Creates the main API router with all routes
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(handlers::health_check))
        // Catalog
        .route("/users", get(handlers::list_users))
        .route("/users/:user_id/likes", get(handlers::user_likes))
        // Recommendations
        .route("/recommendations/:user_id", get(handlers::user_overview))
        .route(
            "/recommendations/:user_id/:strategy",
            get(handlers::strategy_recommendations),
        )
        // Interactions
        .route("/like_product", post(handlers::like_product))
        .route("/analytics", get(handlers::analytics))
        .layer(
            ServiceBuilder::new()
                .layer(middleware::from_fn(request_id_middleware))
                .layer(TraceLayer::new_for_http().make_span_with(make_span_with_request_id))
                .layer(CorsLayer::permissive()),
        )
        .with_state(state)
}
