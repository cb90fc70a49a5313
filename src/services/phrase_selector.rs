use chrono::Utc;
use rand::seq::SliceRandom;
use serde::Serialize;
use tracing::{debug, warn};

use crate::db::{PhraseCandidate, PhraseStore};
use crate::services::DrillError;

const MAX_CLAIM_ROUNDS: usize = 3;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SelectionMode {
    /// Lowest id first.
    #[default]
    Ordered,
    /// Uniform over all `new` phrases.
    Random,
}

impl SelectionMode {
    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "ordered" | "sequential" => Some(SelectionMode::Ordered),
            "random" => Some(SelectionMode::Random),
            _ => None,
        }
    }
}

/// Public view of a selected phrase.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PhraseCard {
    pub id: i64,
    pub phrase_fr: String,
}

impl From<PhraseCandidate> for PhraseCard {
    fn from(candidate: PhraseCandidate) -> Self {
        Self {
            id: candidate.id,
            phrase_fr: candidate.phrase_fr,
        }
    }
}

/// Picks the next `new` phrase and records the presentation on it.
///
/// Each candidate is claimed with a conditional update keyed on the
/// `attempts` value read from the listing, so two concurrent callers never
/// both count the same presentation. A caller that loses every claim in a
/// round re-reads the listing; after `MAX_CLAIM_ROUNDS` it reports nothing
/// available. `Ok(None)` means no `new` phrase exists.
pub async fn select_next(
    store: &PhraseStore,
    mode: SelectionMode,
) -> Result<Option<PhraseCard>, DrillError> {
    for round in 0..MAX_CLAIM_ROUNDS {
        let mut candidates = store.list_new().await?;
        if candidates.is_empty() {
            return Ok(None);
        }
        if mode == SelectionMode::Random {
            candidates.shuffle(&mut rand::rng());
        }

        for candidate in candidates {
            if store.claim(candidate.id, candidate.attempts, Utc::now()).await? {
                debug!(phrase_id = candidate.id, round, "phrase claimed");
                return Ok(Some(candidate.into()));
            }
            debug!(phrase_id = candidate.id, round, "claim lost to a concurrent selection");
        }
    }

    warn!(rounds = MAX_CLAIM_ROUNDS, "every phrase claim was contended");
    Ok(None)
}
