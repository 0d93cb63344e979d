use axum::body::Bytes;
use axum::extract::State;
use axum::response::Response;
use sicopa_core::Caller;

use super::{callable_data, callable_json, AppState};

/// `POST /bulk-load-assets` with `{"data": {"bienes": [...]}}`.
pub async fn bulk_load_assets(
    State(service): State<AppState>,
    caller: Caller,
    body: Bytes,
) -> Response {
    let result = callable_data(&body)
        .and_then(|data| service.bulk_load(caller.principal(), data));
    callable_json(result)
}
