use std::sync::Arc;

use axum::routing::{get, post};
use axum::Router;
use seed_ledger::InMemoryLedger;
use seed_protocol::endpoints;
use tower_http::trace::TraceLayer;

use crate::handler::{self, AppState};
use crate::validator;

/// Build the certification facade router.
pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route(endpoints::CERTIFY, post(handler::certify_handler))
        .route(
            &format!("{}/:record_id", endpoints::VERIFY),
            get(handler::verify_handler),
        )
        .route(endpoints::HEALTH, get(handler::health_handler))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Build the development validator router over `ledger`.
pub fn build_validator_router(ledger: Arc<InMemoryLedger>) -> Router {
    Router::new()
        .route(endpoints::BATCHES, post(validator::submit_batches))
        .route(endpoints::BATCH_STATUSES, get(validator::batch_statuses))
        .route(&format!("{}/:address", endpoints::STATE), get(validator::state))
        .layer(TraceLayer::new_for_http())
        .with_state(ledger)
}
