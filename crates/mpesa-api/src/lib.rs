//! REST API surface for the M-Pesa payment ingestion core (§6)
//!
//! Thin HTTP layer over the domain crates: handlers parse/validate
//! requests, delegate to `AppState`'s services and repositories, and map
//! results back through `ApiError` (§7).

pub mod dto;
pub mod error;
pub mod handlers;
pub mod routes;
pub mod state;

use std::sync::Arc;

use axum::Router;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use state::AppState;

/// Create the API router, fully wired to `state`.
pub fn create_router(state: Arc<AppState>) -> Router {
    Router::new()
        .nest("/api", routes::api_routes())
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}
