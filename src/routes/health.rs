use axum::{extract::State, http::StatusCode, response::Json};
use serde_json::json;

use crate::state::AppState;

pub async fn health_check() -> (StatusCode, Json<serde_json::Value>) {
    (StatusCode::OK, Json(json!({ "status": "ok" })))
}

pub async fn ping(State(state): State<AppState>) -> Json<serde_json::Value> {
    Json(json!({ "message": state.config.ping_message }))
}
