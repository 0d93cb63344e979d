use axum::body::Bytes;
use axum::extract::State;
use axum::response::Response;
use sicopa_core::Caller;

use super::{callable_data, callable_json, AppState};

/// `POST /generate-inventory-report` with `{"data": {"area": "..."}}`.
pub async fn generate_inventory_report(
    State(service): State<AppState>,
    caller: Caller,
    body: Bytes,
) -> Response {
    let result = callable_data(&body)
        .and_then(|data| service.generate_report(caller.principal(), data));
    callable_json(result)
}
