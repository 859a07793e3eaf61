//! API routes.

pub mod events;
pub mod health;

use axum::{
    extract::DefaultBodyLimit,
    routing::get,
    Router,
};
use engine_core::limits::MAX_BODY_SIZE_BYTES;
use tower::ServiceBuilder;
use tower_http::{
    compression::CompressionLayer,
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

use crate::state::AppState;

/// Creates the API router.
pub fn router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route(
            "/events",
            get(events::search_handler).post(events::ingest_handler),
        )
        .route("/mongo/events", get(events::durable_list_handler))
        .route("/ping", get(health::ping_handler))
        .route("/health", get(health::health_handler))
        .route("/health/ready", get(health::ready_handler))
        .route("/health/live", get(health::live_handler))
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(cors)
                .layer(CompressionLayer::new())
                .layer(DefaultBodyLimit::max(MAX_BODY_SIZE_BYTES)),
        )
        .with_state(state)
}
