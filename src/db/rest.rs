use chrono::{DateTime, Utc};
use reqwest::{header, Method, RequestBuilder};
use serde::de::DeserializeOwned;
use serde::Serialize;

use super::{Phrase, PhraseCandidate, PhraseStatus, StoreError};

const REST_PREFIX: &str = "/rest/v1";
const PHRASE_COLUMNS: &str = "id,phrase_fr,status,attempts,last_used";

/// PostgREST-style table API (Supabase). Filters travel as query parameters
/// (`column=eq.value`) and writes ask for the affected rows back.
#[derive(Clone)]
pub struct RestPhraseStore {
    client: reqwest::Client,
    endpoint: String,
    key: String,
}

#[derive(Serialize)]
struct ClaimPatch {
    attempts: i64,
    last_used: DateTime<Utc>,
}

#[derive(Serialize)]
struct StatusPatch {
    status: PhraseStatus,
}

#[derive(Serialize)]
struct NewPhraseRow<'a> {
    phrase_fr: &'a str,
    status: PhraseStatus,
    attempts: i64,
}

impl RestPhraseStore {
    pub fn new(base_url: &str, key: &str, table: &str) -> Result<Self, StoreError> {
        let client = reqwest::Client::builder().build()?;
        Ok(Self {
            client,
            endpoint: table_endpoint(base_url, table),
            key: key.to_string(),
        })
    }

    fn request(&self, method: Method) -> RequestBuilder {
        self.client
            .request(method, &self.endpoint)
            .header("apikey", &self.key)
            .bearer_auth(&self.key)
    }

    fn returning(&self, method: Method) -> RequestBuilder {
        self.request(method).header("Prefer", "return=representation")
    }

    pub async fn list_new(&self) -> Result<Vec<PhraseCandidate>, StoreError> {
        let req = self.request(Method::GET).query(&[
            ("select", "id,phrase_fr,attempts"),
            ("status", "eq.new"),
            ("order", "id.asc"),
        ]);
        send_json(req).await
    }

    pub async fn claim(
        &self,
        id: i64,
        expected_attempts: i64,
        now: DateTime<Utc>,
    ) -> Result<bool, StoreError> {
        let req = self
            .returning(Method::PATCH)
            .query(&[
                ("id", format!("eq.{id}")),
                ("status", "eq.new".to_string()),
                ("attempts", format!("eq.{expected_attempts}")),
            ])
            .json(&ClaimPatch {
                attempts: expected_attempts + 1,
                last_used: now,
            });
        let rows: Vec<serde_json::Value> = send_json(req).await?;
        Ok(!rows.is_empty())
    }

    pub async fn get(&self, id: i64) -> Result<Option<Phrase>, StoreError> {
        let req = self.request(Method::GET).query(&[
            ("select", PHRASE_COLUMNS.to_string()),
            ("id", format!("eq.{id}")),
            ("limit", "1".to_string()),
        ]);
        let rows: Vec<Phrase> = send_json(req).await?;
        Ok(rows.into_iter().next())
    }

    pub async fn insert(&self, phrase_fr: &str) -> Result<Phrase, StoreError> {
        let req = self
            .returning(Method::POST)
            .query(&[("select", PHRASE_COLUMNS)])
            .json(&NewPhraseRow {
                phrase_fr,
                status: PhraseStatus::New,
                attempts: 0,
            });
        let rows: Vec<Phrase> = send_json(req).await?;
        rows.into_iter()
            .next()
            .ok_or_else(|| StoreError::Decode("insert returned no row".to_string()))
    }

    pub async fn mark_done(&self, id: i64) -> Result<bool, StoreError> {
        let req = self
            .returning(Method::PATCH)
            .query(&[("id", format!("eq.{id}"))])
            .json(&StatusPatch {
                status: PhraseStatus::Done,
            });
        let rows: Vec<serde_json::Value> = send_json(req).await?;
        Ok(!rows.is_empty())
    }
}

async fn send_json<T: DeserializeOwned>(req: RequestBuilder) -> Result<T, StoreError> {
    let resp = req.header(header::ACCEPT, "application/json").send().await?;
    let status = resp.status();
    if !status.is_success() {
        let body = resp.text().await.unwrap_or_default();
        tracing::error!(%status, body = %body, "phrase store request rejected");
        return Err(StoreError::HttpStatus { status, body });
    }
    let bytes = resp.bytes().await?;
    serde_json::from_slice(&bytes).map_err(|e| StoreError::Decode(e.to_string()))
}

fn table_endpoint(base_url: &str, table: &str) -> String {
    let base = base_url.trim().trim_end_matches('/');
    let table = table.trim().trim_matches('/');
    if base.ends_with(REST_PREFIX) {
        format!("{base}/{table}")
    } else {
        format!("{base}{REST_PREFIX}/{table}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_table_endpoint() {
        assert_eq!(
            table_endpoint("https://demo.supabase.co", "phrases"),
            "https://demo.supabase.co/rest/v1/phrases"
        );
        assert_eq!(
            table_endpoint("https://demo.supabase.co/rest/v1/", "phrases"),
            "https://demo.supabase.co/rest/v1/phrases"
        );
        assert_eq!(
            table_endpoint("http://127.0.0.1:54321/", "/drills/"),
            "http://127.0.0.1:54321/rest/v1/drills"
        );
    }

    #[test]
    fn test_write_bodies() {
        let claim = serde_json::to_value(ClaimPatch {
            attempts: 3,
            last_used: DateTime::parse_from_rfc3339("2026-10-15T08:00:00Z")
                .unwrap()
                .with_timezone(&Utc),
        })
        .unwrap();
        assert_eq!(claim["attempts"], 3);
        assert_eq!(claim["last_used"], "2026-10-15T08:00:00Z");

        let insert = serde_json::to_value(NewPhraseRow {
            phrase_fr: "Il faut que",
            status: PhraseStatus::New,
            attempts: 0,
        })
        .unwrap();
        assert_eq!(insert["status"], "new");
        assert_eq!(insert["attempts"], 0);
    }

    #[test]
    fn test_decode_supabase_row() {
        let rows: Vec<Phrase> = serde_json::from_str(
            r#"[{"id":7,"phrase_fr":"Je viens de","status":"new","attempts":2,
                "last_used":"2026-10-15T08:00:00.123456+00:00"}]"#,
        )
        .unwrap();
        assert_eq!(rows[0].id, 7);
        assert_eq!(rows[0].attempts, 2);
        assert!(rows[0].last_used.is_some());
    }
}
