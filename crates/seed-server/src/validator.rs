//! Development validator: the ledger REST API served over an
//! [`InMemoryLedger`].

use std::collections::HashMap;
use std::sync::Arc;

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Json, Response};
use bytes::Bytes;
use seed_ledger::{InMemoryLedger, LedgerError};
use seed_protocol::{endpoints, BatchStatusList, StateResponse, SubmitBatchesResponse};
use seed_types::Address;
use serde::Serialize;

#[derive(Debug, Serialize)]
struct ErrorBody {
    error: ErrorDetail,
}

#[derive(Debug, Serialize)]
struct ErrorDetail {
    code: u16,
    title: &'static str,
    message: String,
}

fn error_response(status: StatusCode, title: &'static str, message: impl Into<String>) -> Response {
    let body = ErrorBody {
        error: ErrorDetail {
            code: status.as_u16(),
            title,
            message: message.into(),
        },
    };
    (status, Json(body)).into_response()
}

fn ledger_failure(e: LedgerError) -> Response {
    match e {
        LedgerError::InvalidBatch(_) | LedgerError::Decode(_) => {
            error_response(StatusCode::BAD_REQUEST, "Submitted Batches Invalid", e.to_string())
        }
        _ => error_response(
            StatusCode::INTERNAL_SERVER_ERROR,
            "Internal Error",
            e.to_string(),
        ),
    }
}

/// `POST /batches`
pub async fn submit_batches(State(ledger): State<Arc<InMemoryLedger>>, body: Bytes) -> Response {
    match ledger.submit(&body) {
        Ok(ids) => {
            tracing::debug!(batches = ids.len(), "batches accepted");
            let link = format!("{}?id={}", endpoints::BATCH_STATUSES, ids.join(","));
            (StatusCode::ACCEPTED, Json(SubmitBatchesResponse { link })).into_response()
        }
        Err(e) => {
            tracing::warn!(error = %e, "batch submission refused");
            ledger_failure(e)
        }
    }
}

/// `GET /batch_statuses?id=a,b`
pub async fn batch_statuses(
    State(ledger): State<Arc<InMemoryLedger>>,
    Query(query): Query<HashMap<String, String>>,
) -> Response {
    let Some(ids) = query.get("id").filter(|ids| !ids.is_empty()) else {
        return error_response(
            StatusCode::BAD_REQUEST,
            "Missing Id Query",
            "batch_statuses requires an id query parameter",
        );
    };
    let mut data = Vec::new();
    for id in ids.split(',') {
        match ledger.batch_outcome(id) {
            Ok(outcome) => data.push(outcome.to_status_entry(id)),
            Err(e) => return ledger_failure(e),
        }
    }
    Json(BatchStatusList { data }).into_response()
}

/// `GET /state/:address`
pub async fn state(
    State(ledger): State<Arc<InMemoryLedger>>,
    Path(address): Path<String>,
) -> Response {
    let address = match Address::parse(&address) {
        Ok(address) => address,
        Err(e) => {
            return error_response(
                StatusCode::BAD_REQUEST,
                "Invalid State Address",
                e.to_string(),
            )
        }
    };
    match ledger.state(address.as_str()) {
        Ok(Some(value)) => Json(StateResponse::from_bytes(&value)).into_response(),
        Ok(None) => error_response(
            StatusCode::NOT_FOUND,
            "State Not Found",
            format!("no value at {address}"),
        ),
        Err(e) => ledger_failure(e),
    }
}
