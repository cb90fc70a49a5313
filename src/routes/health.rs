use axum::extract::State;
use axum::Json;
use serde::Serialize;

use crate::state::AppState;

#[derive(Serialize)]
pub(super) struct HealthResponse {
    status: &'static str,
    store: &'static str,
    uptime: u64,
}

pub(super) async fn root(State(state): State<AppState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        store: state.store().backend(),
        uptime: state.uptime_seconds(),
    })
}
