#![allow(dead_code)]

use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use axum::body::Body;
use axum::extract::State;
use axum::http::{Method, Request, StatusCode};
use axum::response::IntoResponse;
use axum::routing::post;
use axum::{Json, Router};
use http_body_util::BodyExt;
use serde_json::{json, Value};
use tower::ServiceExt;

use french_trainer_backend::db::{PhraseStore, SqlitePhraseStore};
use french_trainer_backend::services::llm_provider::{LLMConfig, LLMProvider};
use french_trainer_backend::services::phrase_selector::SelectionMode;
use french_trainer_backend::state::AppState;

#[derive(Clone, Default)]
struct OracleState {
    hits: Arc<AtomicUsize>,
    replies: Arc<Mutex<VecDeque<(StatusCode, Value)>>>,
    default_content: Arc<Mutex<String>>,
    requests: Arc<Mutex<Vec<Value>>>,
    delay: Arc<Mutex<Option<Duration>>>,
}

/// OpenAI-compatible chat endpoint on an ephemeral local port. Scripted
/// replies are served first, then the default content.
#[derive(Clone)]
pub struct FakeOracle {
    pub endpoint: String,
    state: OracleState,
}

impl FakeOracle {
    pub async fn spawn(default_content: &str) -> Self {
        let state = OracleState::default();
        *state.default_content.lock().unwrap() = default_content.to_string();

        let app = Router::new()
            .route("/v1/chat/completions", post(chat_completions))
            .with_state(state.clone());
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        Self {
            endpoint: format!("http://{addr}/v1"),
            state,
        }
    }

    pub fn push_reply(&self, status: StatusCode, body: Value) {
        self.state.replies.lock().unwrap().push_back((status, body));
    }

    pub fn set_delay(&self, delay: Duration) {
        *self.state.delay.lock().unwrap() = Some(delay);
    }

    pub fn hits(&self) -> usize {
        self.state.hits.load(Ordering::SeqCst)
    }

    pub fn last_request(&self) -> Option<Value> {
        self.state.requests.lock().unwrap().last().cloned()
    }

    pub fn config(&self, max_retries: u32) -> LLMConfig {
        LLMConfig {
            api_key: "sk-test".to_string(),
            model: "gpt-4.1-mini".to_string(),
            temperature: 0.2,
            api_endpoint: self.endpoint.clone(),
            timeout: Duration::from_secs(5),
            max_retries,
        }
    }

    pub fn provider(&self, max_retries: u32) -> LLMProvider {
        LLMProvider::new(self.config(max_retries)).unwrap()
    }
}

pub fn completion(content: &str) -> Value {
    json!({
        "model": "gpt-4.1-mini",
        "choices": [{ "message": { "role": "assistant", "content": content } }],
        "usage": { "prompt_tokens": 120, "completion_tokens": 80, "total_tokens": 200 }
    })
}

async fn chat_completions(
    State(state): State<OracleState>,
    Json(body): Json<Value>,
) -> impl IntoResponse {
    state.hits.fetch_add(1, Ordering::SeqCst);
    state.requests.lock().unwrap().push(body);

    let delay = *state.delay.lock().unwrap();
    if let Some(delay) = delay {
        tokio::time::sleep(delay).await;
    }

    let scripted = state.replies.lock().unwrap().pop_front();
    match scripted {
        Some((status, body)) => (status, Json(body)),
        None => {
            let content = state.default_content.lock().unwrap().clone();
            (StatusCode::OK, Json(completion(&content)))
        }
    }
}

pub async fn memory_store() -> PhraseStore {
    PhraseStore::Sqlite(SqlitePhraseStore::connect("sqlite::memory:").await.unwrap())
}

pub async fn seeded_store(phrases: &[&str]) -> PhraseStore {
    let store = memory_store().await;
    for phrase in phrases {
        store.insert(phrase).await.unwrap();
    }
    store
}

pub fn create_test_app(store: PhraseStore, oracle: &FakeOracle) -> Router {
    create_test_app_with(store, oracle.provider(0), Duration::from_secs(5))
}

pub fn create_test_app_with(store: PhraseStore, provider: LLMProvider, timeout: Duration) -> Router {
    let state = AppState::new(store, provider, SelectionMode::Ordered, timeout);
    french_trainer_backend::create_app(state)
}

pub async fn send(app: &Router, method: Method, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
    let mut builder = Request::builder().method(method).uri(uri);
    let body = match body {
        Some(value) => {
            builder = builder.header("content-type", "application/json");
            Body::from(value.to_string())
        }
        None => Body::empty(),
    };

    let response = app.clone().oneshot(builder.body(body).unwrap()).await.unwrap();
    let status = response.status();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let value = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap_or_else(|_| Value::String(String::from_utf8_lossy(&bytes).into_owned()))
    };
    (status, value)
}

pub async fn get(app: &Router, uri: &str) -> (StatusCode, Value) {
    send(app, Method::GET, uri, None).await
}

pub async fn post_json(app: &Router, uri: &str, body: Value) -> (StatusCode, Value) {
    send(app, Method::POST, uri, Some(body)).await
}
