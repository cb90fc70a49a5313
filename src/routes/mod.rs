mod answers;
mod health;
mod phrases;

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::Router;

use crate::response::json_error;
use crate::state::AppState;

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/", get(health::root).fallback(fallback_handler))
        .route("/next_phrase", get(phrases::next_phrase).fallback(fallback_handler))
        .route("/task", post(phrases::task).fallback(fallback_handler))
        .route("/answer", post(answers::analyze).fallback(fallback_handler))
        .route("/analyze", post(answers::analyze).fallback(fallback_handler))
        .route("/mark_done", post(phrases::mark_done).fallback(fallback_handler))
        .route("/add_phrase", post(phrases::add_phrase).fallback(fallback_handler))
        .fallback(fallback_handler)
        .with_state(state)
}

async fn fallback_handler() -> Response {
    json_error(StatusCode::NOT_FOUND, "NOT_FOUND", "Маршрут не найден").into_response()
}
