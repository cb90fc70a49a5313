use std::sync::Arc;
use std::time::{Duration, Instant};

use crate::db::PhraseStore;
use crate::services::llm_provider::LLMProvider;
use crate::services::phrase_selector::SelectionMode;

/// Handles built once at startup and shared by every request.
#[derive(Clone)]
pub struct AppState {
    started_at: Instant,
    store: PhraseStore,
    oracle: Arc<LLMProvider>,
    selection: SelectionMode,
    grading_timeout: Duration,
}

impl AppState {
    pub fn new(
        store: PhraseStore,
        oracle: LLMProvider,
        selection: SelectionMode,
        grading_timeout: Duration,
    ) -> Self {
        Self {
            started_at: Instant::now(),
            store,
            oracle: Arc::new(oracle),
            selection,
            grading_timeout,
        }
    }

    pub fn uptime_seconds(&self) -> u64 {
        self.started_at.elapsed().as_secs()
    }

    pub fn store(&self) -> &PhraseStore {
        &self.store
    }

    pub fn oracle(&self) -> &LLMProvider {
        &self.oracle
    }

    pub fn selection(&self) -> SelectionMode {
        self.selection
    }

    pub fn grading_timeout(&self) -> Duration {
        self.grading_timeout
    }
}
