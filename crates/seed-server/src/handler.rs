use std::sync::Arc;

use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, State};
use axum::response::Json;
use seed_protocol::{CertifyRequest, CertifyResponse, HealthResponse};
use seed_sync::CertificationBackend;
use seed_types::Record;

use crate::error::{ServerError, ServerResult};

/// Shared state of the certification facade.
#[derive(Clone)]
pub struct AppState {
    pub backend: Arc<dyn CertificationBackend>,
}

impl AppState {
    pub fn new(backend: Arc<dyn CertificationBackend>) -> Self {
        Self { backend }
    }
}

/// `POST /certify`
pub async fn certify_handler(
    State(state): State<AppState>,
    body: Result<Json<CertifyRequest>, JsonRejection>,
) -> ServerResult<Json<CertifyResponse>> {
    let Json(request) = body.map_err(|e| ServerError::Validation(e.body_text()))?;
    request
        .validate()
        .map_err(|e| ServerError::Validation(e.to_string()))?;

    let receipt = state.backend.certify(&request).await?;
    let message = if receipt.committed {
        format!("Seed {} certified", request.record_id)
    } else {
        format!(
            "Seed {} submitted; confirmation pending",
            request.record_id
        )
    };
    tracing::info!(
        record_id = %request.record_id,
        transaction_id = %receipt.transaction_id,
        committed = receipt.committed,
        "certify request handled"
    );
    Ok(Json(CertifyResponse {
        success: true,
        message,
        record_id: request.record_id,
        transaction_id: receipt.transaction_id,
        committed: receipt.committed,
        backend_type: receipt.backend_type,
    }))
}

/// `GET /verify/:record_id`
///
/// Both an absent record and a failed ledger query answer 404; the body's
/// `error` code tells them apart.
pub async fn verify_handler(
    State(state): State<AppState>,
    Path(record_id): Path<String>,
) -> ServerResult<Json<Record>> {
    state
        .backend
        .fetch_record(&record_id)
        .await
        .map_err(|e| ServerError::LookupFailed(e.to_string()))?
        .map(Json)
        .ok_or(ServerError::NotFound(record_id))
}

/// `GET /health`
pub async fn health_handler(State(state): State<AppState>) -> Json<HealthResponse> {
    Json(HealthResponse::ok(state.backend.name()))
}
