use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::Json;
use serde::{Deserialize, Serialize};

use crate::response::AppError;
use crate::services::answer_grader::{self, DrillTask};
use crate::services::phrase_lifecycle;
use crate::services::phrase_selector::{self, PhraseCard};
use crate::state::AppState;

pub const NO_PHRASES_MESSAGE: &str = "Нет новых фраз";

#[derive(Debug, Deserialize)]
pub(super) struct PhraseIdRequest {
    phrase_id: i64,
}

#[derive(Debug, Deserialize)]
pub(super) struct AddPhraseRequest {
    phrase_fr: String,
}

#[derive(Serialize)]
#[serde(untagged)]
pub(super) enum NextPhraseResponse {
    Phrase(PhraseCard),
    Empty { message: &'static str },
}

#[derive(Serialize)]
pub(super) struct StatusResponse {
    status: &'static str,
}

#[derive(Serialize)]
pub(super) struct AddedResponse {
    status: &'static str,
    id: i64,
}

pub(super) async fn next_phrase(
    State(state): State<AppState>,
) -> Result<Json<NextPhraseResponse>, AppError> {
    let response = match phrase_selector::select_next(state.store(), state.selection()).await? {
        Some(card) => NextPhraseResponse::Phrase(card),
        None => NextPhraseResponse::Empty {
            message: NO_PHRASES_MESSAGE,
        },
    };
    Ok(Json(response))
}

pub(super) async fn task(
    State(state): State<AppState>,
    payload: Result<Json<PhraseIdRequest>, JsonRejection>,
) -> Result<Json<DrillTask>, AppError> {
    let Json(body) = payload?;
    let task = answer_grader::describe_task(state.store(), body.phrase_id).await?;
    Ok(Json(task))
}

pub(super) async fn mark_done(
    State(state): State<AppState>,
    payload: Result<Json<PhraseIdRequest>, JsonRejection>,
) -> Result<Json<StatusResponse>, AppError> {
    let Json(body) = payload?;
    phrase_lifecycle::mark_done(state.store(), body.phrase_id).await?;
    Ok(Json(StatusResponse { status: "ok" }))
}

pub(super) async fn add_phrase(
    State(state): State<AppState>,
    payload: Result<Json<AddPhraseRequest>, JsonRejection>,
) -> Result<Json<AddedResponse>, AppError> {
    let Json(body) = payload?;
    let phrase = phrase_lifecycle::add_phrase(state.store(), &body.phrase_fr).await?;
    Ok(Json(AddedResponse {
        status: "added",
        id: phrase.id,
    }))
}
