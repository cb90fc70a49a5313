use std::time::Duration;

use serde::Serialize;

use crate::db::{Phrase, PhraseStore};
use crate::services::llm_provider::{LLMError, LLMProvider};
use crate::services::prompts;
use crate::services::DrillError;

pub const MAX_ANSWER_CHARS: usize = 2000;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GradingResult {
    pub analysis: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DrillTask {
    pub phrase_id: i64,
    pub task: String,
}

async fn find_phrase(store: &PhraseStore, phrase_id: i64) -> Result<Phrase, DrillError> {
    store.get(phrase_id).await?.ok_or(DrillError::NotFound(phrase_id))
}

pub async fn describe_task(store: &PhraseStore, phrase_id: i64) -> Result<DrillTask, DrillError> {
    let phrase = find_phrase(store, phrase_id).await?;
    Ok(DrillTask {
        phrase_id: phrase.id,
        task: prompts::task_instruction(&phrase.phrase_fr),
    })
}

/// Grades `answer` against the stored construction. The oracle's text is
/// returned as-is apart from trimming; its sections are not interpreted.
/// The oracle is only called once the phrase exists and the answer is
/// non-blank. `timeout` bounds the whole call including retries.
pub async fn grade(
    store: &PhraseStore,
    oracle: &LLMProvider,
    timeout: Duration,
    phrase_id: i64,
    answer: &str,
) -> Result<GradingResult, DrillError> {
    let phrase = find_phrase(store, phrase_id).await?;
    validate_answer(answer)?;

    let prompt = prompts::grading_prompt(&phrase.phrase_fr, answer);
    let completion = tokio::time::timeout(
        timeout,
        oracle.complete_with_system(prompts::GRADER_SYSTEM_ROLE, &prompt),
    )
    .await
    .unwrap_or(Err(LLMError::Timeout(timeout)))
    .map_err(|err| {
        tracing::error!(phrase_id, model = oracle.model(), error = %err, "grading failed");
        DrillError::GradingUnavailable(err)
    })?;

    Ok(GradingResult {
        analysis: completion.trim().to_string(),
    })
}

fn validate_answer(answer: &str) -> Result<(), DrillError> {
    if answer.trim().is_empty() {
        return Err(DrillError::InvalidInput("answer must not be blank".to_string()));
    }
    if answer.chars().count() > MAX_ANSWER_CHARS {
        return Err(DrillError::InvalidInput(format!(
            "answer exceeds {MAX_ANSWER_CHARS} characters"
        )));
    }
    Ok(())
}
