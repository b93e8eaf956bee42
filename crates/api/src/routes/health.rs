use axum::{Json, extract::State};

use crate::state::AppState;

/// Liveness. Reports whether the record store answers but never fails on it.
pub async fn health_check(State(state): State<AppState>) -> Json<serde_json::Value> {
    let reachable = state.store.ping().await.is_ok();
    Json(serde_json::json!({
        "status": "ok",
        "version": env!("CARGO_PKG_VERSION"),
        "record_store": {
            "backend": state.store.name(),
            "reachable": reachable,
        },
    }))
}
