use std::str::FromStr;
use std::time::Duration;

use chrono::{DateTime, Utc};
use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions, SqliteRow};
use sqlx::{Row, SqlitePool};

use super::{Phrase, PhraseCandidate, PhraseStatus, StoreError};

const PHRASES_SCHEMA_SQL: &str = include_str!("../../sql/phrases.sql");

/// Local SQLite phrase table. In-memory databases are pinned to a single
/// connection so every query sees the same data.
#[derive(Clone)]
pub struct SqlitePhraseStore {
    pool: SqlitePool,
}

impl SqlitePhraseStore {
    pub async fn connect(url: &str) -> Result<Self, StoreError> {
        let in_memory = url.contains(":memory:") || url.contains("mode=memory");

        let mut options = SqliteConnectOptions::from_str(url)?
            .create_if_missing(true)
            .busy_timeout(Duration::from_secs(30));
        if !in_memory {
            options = options.journal_mode(SqliteJournalMode::Wal);
        }

        let mut pool_options = SqlitePoolOptions::new();
        pool_options = if in_memory {
            pool_options
                .max_connections(1)
                .idle_timeout(None)
                .max_lifetime(None)
        } else {
            pool_options.max_connections(5)
        };
        let pool = pool_options.connect_with(options).await?;

        let store = Self { pool };
        store.apply_schema().await?;
        Ok(store)
    }

    async fn apply_schema(&self) -> Result<(), StoreError> {
        for statement in split_sql_statements(PHRASES_SCHEMA_SQL) {
            sqlx::query(&statement).execute(&self.pool).await?;
        }
        tracing::debug!("sqlite phrase schema applied");
        Ok(())
    }

    pub async fn list_new(&self) -> Result<Vec<PhraseCandidate>, StoreError> {
        let rows = sqlx::query(
            r#"
            SELECT id, phrase_fr, attempts
            FROM phrases
            WHERE status = 'new'
            ORDER BY id ASC
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        rows.iter()
            .map(|row| {
                Ok::<_, StoreError>(PhraseCandidate {
                    id: row.try_get("id")?,
                    phrase_fr: row.try_get("phrase_fr")?,
                    attempts: row.try_get("attempts")?,
                })
            })
            .collect()
    }

    pub async fn claim(
        &self,
        id: i64,
        expected_attempts: i64,
        now: DateTime<Utc>,
    ) -> Result<bool, StoreError> {
        let result = sqlx::query(
            r#"
            UPDATE phrases
            SET attempts = attempts + 1, last_used = ?1
            WHERE id = ?2 AND status = 'new' AND attempts = ?3
            "#,
        )
        .bind(now)
        .bind(id)
        .bind(expected_attempts)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected() == 1)
    }

    pub async fn get(&self, id: i64) -> Result<Option<Phrase>, StoreError> {
        let row = sqlx::query(
            r#"
            SELECT id, phrase_fr, status, attempts, last_used
            FROM phrases
            WHERE id = ?1
            LIMIT 1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        row.as_ref().map(map_phrase_row).transpose()
    }

    pub async fn insert(&self, phrase_fr: &str) -> Result<Phrase, StoreError> {
        let row = sqlx::query(
            r#"
            INSERT INTO phrases (phrase_fr, status, attempts)
            VALUES (?1, 'new', 0)
            RETURNING id, phrase_fr, status, attempts, last_used
            "#,
        )
        .bind(phrase_fr)
        .fetch_one(&self.pool)
        .await?;

        map_phrase_row(&row)
    }

    pub async fn mark_done(&self, id: i64) -> Result<bool, StoreError> {
        let result = sqlx::query(r#"UPDATE phrases SET status = 'done' WHERE id = ?1"#)
            .bind(id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }
}

fn map_phrase_row(row: &SqliteRow) -> Result<Phrase, StoreError> {
    let status: String = row.try_get("status")?;
    let status = PhraseStatus::parse(&status)
        .ok_or_else(|| StoreError::Decode(format!("unknown phrase status {status:?}")))?;

    Ok(Phrase {
        id: row.try_get("id")?,
        phrase_fr: row.try_get("phrase_fr")?,
        status,
        attempts: row.try_get("attempts")?,
        last_used: row.try_get("last_used")?,
    })
}

fn split_sql_statements(sql: &str) -> Vec<String> {
    let mut statements = Vec::new();
    let mut current = String::new();
    let mut in_single_quote = false;

    for ch in sql.chars() {
        match ch {
            '\'' => in_single_quote = !in_single_quote,
            ';' if !in_single_quote => {
                let stmt = current.trim();
                if !stmt.is_empty() {
                    statements.push(stmt.to_string());
                }
                current.clear();
                continue;
            }
            _ => {}
        }
        current.push(ch);
    }

    let tail = current.trim();
    if !tail.is_empty() {
        statements.push(tail.to_string());
    }

    statements
}
