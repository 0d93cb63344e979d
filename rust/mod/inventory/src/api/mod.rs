//! Callable endpoints.
//!
//! Requests carry `{"data": <input>}`; success is `200 {"result": <output>}`
//! and failures use the `ServiceError` envelope
//! `{"error": {"status": ..., "message": ...}}`.

pub mod bulk_load;
pub mod report;

use std::sync::Arc;

use axum::body::Bytes;
use axum::response::{IntoResponse, Response};
use axum::routing::post;
use axum::{Json, Router};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use sicopa_core::ServiceError;

use crate::service::InventoryService;

/// Shared application state.
pub type AppState = Arc<InventoryService>;

/// Build the inventory router. The binary nests it under `/inventory`.
pub fn router(state: AppState) -> Router {
    Router::new()
        .route(
            "/generate-inventory-report",
            post(report::generate_inventory_report),
        )
        .route("/bulk-load-assets", post(bulk_load::bulk_load_assets))
        .with_state(state)
}

#[derive(Debug, Default, Deserialize)]
struct CallableRequest {
    #[serde(default)]
    data: Value,
}

#[derive(Debug, Serialize)]
struct CallableResponse<T> {
    result: T,
}

/// Pull `data` out of a callable request body. An empty body means no input.
pub(crate) fn callable_data(body: &Bytes) -> Result<Value, ServiceError> {
    if body.iter().all(u8::is_ascii_whitespace) {
        return Ok(Value::Null);
    }
    serde_json::from_slice::<CallableRequest>(body)
        .map(|request| request.data)
        .map_err(|e| ServiceError::InvalidArgument(format!("Solicitud mal formada: {}", e)))
}

/// Wrap a service result into the callable response envelope.
pub(crate) fn callable_json<T: Serialize>(result: Result<T, ServiceError>) -> Response {
    match result {
        Ok(result) => Json(CallableResponse { result }).into_response(),
        Err(e) => e.into_response(),
    }
}
