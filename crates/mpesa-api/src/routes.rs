//! API routes (§6)
//!
//! Mirrors the external interface table exactly: one route per row, nested
//! under the domain area it belongs to.

use std::sync::Arc;

use axum::routing::{get, post};
use axum::Router;

use crate::handlers;
use crate::state::AppState;

pub fn api_routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/health", get(handlers::health::health_check))
        .route("/ready", get(handlers::health::readiness_check))
        .nest("/payments", payment_routes())
        .nest("/daraja", daraja_routes())
        .nest("/landlords", landlord_routes())
        .nest("/mpesa", mpesa_routes())
}

fn payment_routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/stk", post(handlers::payments::initiate_stk))
        .route("/stk/byId/{intent_id}", get(handlers::payments::get_intent_by_id))
        .route("/stk/{checkout_request_id}", get(handlers::payments::get_intent))
        .route("/{payment_id}/receipt", get(handlers::receipts::get))
}

fn daraja_routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/callback", post(handlers::daraja::callback))
        .route("/timeout", post(handlers::daraja::timeout))
}

fn landlord_routes() -> Router<Arc<AppState>> {
    Router::new()
        .route(
            "/{id}/daraja/configure",
            post(handlers::landlords::configure).delete(handlers::landlords::delete),
        )
        .route("/{id}/daraja/status", get(handlers::landlords::status))
        .route("/{id}/daraja/test", post(handlers::landlords::test))
}

fn mpesa_routes() -> Router<Arc<AppState>> {
    Router::new()
        .route(
            "/statements",
            post(handlers::statements::upload).get(handlers::statements::list),
        )
        .route(
            "/statements/{id}",
            get(handlers::statements::get).delete(handlers::statements::delete),
        )
        .route("/matches/{id}/approve", post(handlers::matches::approve))
        .route("/matches/{id}/reject", post(handlers::matches::reject))
        .route("/matches/{id}/manual-match", post(handlers::matches::manual_match))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn router_builds() {
        let _: Router<Arc<AppState>> = api_routes();
    }
}
