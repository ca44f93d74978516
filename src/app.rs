//! HTTP router assembly.

use axum::{Router, routing::get};
use tower_http::trace::TraceLayer;

use crate::{db::supervisor::DataLayer, handlers};

/// Build the router with the data layer as shared state.
pub fn router(layer: DataLayer) -> Router {
    Router::new()
        .route("/health", get(handlers::health::health_check))
        .route("/api/v1/status", get(handlers::status::data_layer_status))
        // Add distributed tracing middleware for observability
        .layer(TraceLayer::new_for_http())
        // Share the data layer with all handlers via State extraction
        .with_state(layer)
}
