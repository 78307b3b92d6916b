//! Store health endpoint.

use crate::AppState;
use axum::{extract::State, http::StatusCode, Json};
use serde_json::{json, Value};

/// `200 {"ok": true}` while the store answers, else `503 {"ok": false}`.
pub async fn healthz(State(state): State<AppState>) -> (StatusCode, Json<Value>) {
    if state.service.healthy() {
        (StatusCode::OK, Json(json!({ "ok": true })))
    } else {
        (StatusCode::SERVICE_UNAVAILABLE, Json(json!({ "ok": false })))
    }
}
