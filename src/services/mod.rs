pub mod answer_grader;
pub mod llm_provider;
pub mod phrase_lifecycle;
pub mod phrase_selector;
pub mod prompts;

use thiserror::Error;

use crate::db::StoreError;
use crate::services::llm_provider::LLMError;

#[derive(Debug, Error)]
pub enum DrillError {
    #[error("phrase {0} not found")]
    NotFound(i64),
    #[error("invalid input: {0}")]
    InvalidInput(String),
    #[error("grading unavailable: {0}")]
    GradingUnavailable(#[source] LLMError),
    #[error(transparent)]
    Store(#[from] StoreError),
}
