pub mod rest;
pub mod sqlite;

use chrono::{DateTime, NaiveDateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use thiserror::Error;

pub use rest::RestPhraseStore;
pub use sqlite::SqlitePhraseStore;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PhraseStatus {
    New,
    Done,
}

impl PhraseStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            PhraseStatus::New => "new",
            PhraseStatus::Done => "done",
        }
    }

    pub fn parse(raw: &str) -> Option<Self> {
        match raw {
            "new" => Some(PhraseStatus::New),
            "done" => Some(PhraseStatus::Done),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Phrase {
    pub id: i64,
    pub phrase_fr: String,
    pub status: PhraseStatus,
    pub attempts: i64,
    #[serde(default, deserialize_with = "deserialize_last_used")]
    pub last_used: Option<DateTime<Utc>>,
}

/// Accepts RFC 3339 and offset-less timestamps. A `timestamp` column
/// without a time zone is read as UTC.
pub fn parse_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    let raw = raw.trim();
    if let Ok(ts) = DateTime::parse_from_rfc3339(raw) {
        return Some(ts.with_timezone(&Utc));
    }
    ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"]
        .iter()
        .find_map(|format| NaiveDateTime::parse_from_str(raw, format).ok())
        .map(|naive| naive.and_utc())
}

fn deserialize_last_used<'de, D>(deserializer: D) -> Result<Option<DateTime<Utc>>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw: Option<String> = Option::deserialize(deserializer)?;
    raw.map(|raw| {
        parse_timestamp(&raw).ok_or_else(|| {
            <D::Error as serde::de::Error>::custom(format!("invalid timestamp {raw:?}"))
        })
    })
    .transpose()
}

/// A `new` phrase as read before claiming it. `attempts` is the value the
/// conditional update expects to still find in the row.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct PhraseCandidate {
    pub id: i64,
    pub phrase_fr: String,
    pub attempts: i64,
}

#[derive(Debug, Error)]
pub enum StoreError {
    #[error(transparent)]
    Sql(#[from] sqlx::Error),
    #[error("store request failed: {0}")]
    Request(#[from] reqwest::Error),
    #[error("store HTTP {status}: {body}")]
    HttpStatus { status: reqwest::StatusCode, body: String },
    #[error("unexpected store data: {0}")]
    Decode(String),
    #[error("store misconfigured: {0}")]
    Config(String),
}

#[derive(Debug, Clone)]
pub struct StoreConfig {
    pub url: String,
    pub key: Option<String>,
    pub table: String,
}

impl StoreConfig {
    pub fn is_remote(&self) -> bool {
        self.url.starts_with("http://") || self.url.starts_with("https://")
    }

    pub fn is_sqlite(&self) -> bool {
        self.url.starts_with("sqlite:")
    }
}

/// Handle to the phrase table. Cloning is cheap; every clone shares the
/// same connection pool or HTTP client.
#[derive(Clone)]
pub enum PhraseStore {
    Rest(RestPhraseStore),
    Sqlite(SqlitePhraseStore),
}

impl PhraseStore {
    pub async fn connect(config: &StoreConfig) -> Result<Self, StoreError> {
        if config.is_sqlite() {
            return Ok(PhraseStore::Sqlite(SqlitePhraseStore::connect(&config.url).await?));
        }
        if config.is_remote() {
            let key = config
                .key
                .as_deref()
                .ok_or_else(|| StoreError::Config("missing access key".to_string()))?;
            return Ok(PhraseStore::Rest(RestPhraseStore::new(&config.url, key, &config.table)?));
        }
        Err(StoreError::Config(format!("unsupported store url {}", config.url)))
    }

    pub fn backend(&self) -> &'static str {
        match self {
            PhraseStore::Rest(_) => "rest",
            PhraseStore::Sqlite(_) => "sqlite",
        }
    }

    /// All `new` phrases, ascending by id.
    pub async fn list_new(&self) -> Result<Vec<PhraseCandidate>, StoreError> {
        match self {
            PhraseStore::Rest(store) => store.list_new().await,
            PhraseStore::Sqlite(store) => store.list_new().await,
        }
    }

    /// Bumps `attempts` and stamps `last_used` only if the row is still `new`
    /// and still holds `expected_attempts`. Returns whether this call won.
    pub async fn claim(
        &self,
        id: i64,
        expected_attempts: i64,
        now: DateTime<Utc>,
    ) -> Result<bool, StoreError> {
        match self {
            PhraseStore::Rest(store) => store.claim(id, expected_attempts, now).await,
            PhraseStore::Sqlite(store) => store.claim(id, expected_attempts, now).await,
        }
    }

    pub async fn get(&self, id: i64) -> Result<Option<Phrase>, StoreError> {
        match self {
            PhraseStore::Rest(store) => store.get(id).await,
            PhraseStore::Sqlite(store) => store.get(id).await,
        }
    }

    pub async fn insert(&self, phrase_fr: &str) -> Result<Phrase, StoreError> {
        match self {
            PhraseStore::Rest(store) => store.insert(phrase_fr).await,
            PhraseStore::Sqlite(store) => store.insert(phrase_fr).await,
        }
    }

    /// Returns `false` when no row has this id.
    pub async fn mark_done(&self, id: i64) -> Result<bool, StoreError> {
        match self {
            PhraseStore::Rest(store) => store.mark_done(id).await,
            PhraseStore::Sqlite(store) => store.mark_done(id).await,
        }
    }
}
