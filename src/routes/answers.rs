use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::Json;
use serde::Deserialize;

use crate::response::AppError;
use crate::services::answer_grader::{self, GradingResult};
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub(super) struct AnswerRequest {
    phrase_id: i64,
    answer: String,
}

pub(super) async fn analyze(
    State(state): State<AppState>,
    payload: Result<Json<AnswerRequest>, JsonRejection>,
) -> Result<Json<GradingResult>, AppError> {
    let Json(body) = payload?;
    let result = answer_grader::grade(
        state.store(),
        state.oracle(),
        state.grading_timeout(),
        body.phrase_id,
        &body.answer,
    )
    .await?;
    Ok(Json(result))
}
