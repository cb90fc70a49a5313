use crate::db::{Phrase, PhraseStore};
use crate::services::DrillError;

pub const MAX_PHRASE_CHARS: usize = 500;

/// Stores a new phrase as `new` with zero attempts. Surrounding whitespace
/// is dropped.
pub async fn add_phrase(store: &PhraseStore, text: &str) -> Result<Phrase, DrillError> {
    let text = normalize_phrase(text)?;
    let phrase = store.insert(text).await?;
    tracing::info!(phrase_id = phrase.id, "phrase added");
    Ok(phrase)
}

/// Idempotent: an already `done` phrase stays `done`.
pub async fn mark_done(store: &PhraseStore, phrase_id: i64) -> Result<(), DrillError> {
    if !store.mark_done(phrase_id).await? {
        return Err(DrillError::NotFound(phrase_id));
    }
    tracing::info!(phrase_id, "phrase marked done");
    Ok(())
}

fn normalize_phrase(text: &str) -> Result<&str, DrillError> {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        return Err(DrillError::InvalidInput("phrase_fr must not be blank".to_string()));
    }
    if trimmed.chars().count() > MAX_PHRASE_CHARS {
        return Err(DrillError::InvalidInput(format!(
            "phrase_fr exceeds {MAX_PHRASE_CHARS} characters"
        )));
    }
    Ok(trimmed)
}
