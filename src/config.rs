use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::time::Duration;

use thiserror::Error;

use crate::db::StoreConfig;
use crate::services::llm_provider::{normalize_endpoint, LLMConfig};
use crate::services::phrase_selector::SelectionMode;

const DEFAULT_PORT: u16 = 3000;
const DEFAULT_TABLE: &str = "phrases";
const DEFAULT_API_ENDPOINT: &str = "https://api.openai.com/v1";
const DEFAULT_LLM_TIMEOUT_MS: u64 = 60_000;
const DEFAULT_LLM_MAX_RETRIES: u32 = 2;
const DEFAULT_GRADING_TIMEOUT_MS: u64 = 90_000;
const MAX_TEMPERATURE: f32 = 2.0;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("missing required environment variable {key}")]
    Missing { key: &'static str },
    #[error("invalid value for {key}: {value:?}")]
    Invalid { key: &'static str, value: String },
}

#[derive(Debug, Clone)]
pub struct Config {
    pub host: IpAddr,
    pub port: u16,
    pub store: StoreConfig,
    pub llm: LLMConfig,
    pub selection: SelectionMode,
    pub grading_timeout: Duration,
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds the configuration from an arbitrary key lookup. Blank values
    /// count as absent.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());
        let either = |key: &'static str, fallback: &'static str| get(key).or_else(|| get(fallback));

        let port = match get("PORT") {
            Some(raw) => parse(&raw, "PORT")?,
            None => DEFAULT_PORT,
        };
        let host = match get("HOST") {
            Some(raw) => parse(&raw, "HOST")?,
            None => IpAddr::V4(Ipv4Addr::new(0, 0, 0, 0)),
        };

        let store_url = either("PHRASE_STORE_URL", "SUPABASE_URL")
            .ok_or(ConfigError::Missing { key: "PHRASE_STORE_URL" })?;
        let store_key = either("PHRASE_STORE_KEY", "SUPABASE_KEY");
        let store = StoreConfig {
            table: get("PHRASE_TABLE").unwrap_or_else(|| DEFAULT_TABLE.to_string()),
            url: store_url.trim().to_string(),
            key: store_key,
        };
        if store.is_remote() && store.key.is_none() {
            return Err(ConfigError::Missing { key: "PHRASE_STORE_KEY" });
        }
        if !store.is_remote() && !store.is_sqlite() {
            return Err(ConfigError::Invalid {
                key: "PHRASE_STORE_URL",
                value: store.url,
            });
        }

        let api_key = either("LLM_API_KEY", "OPENAI_API_KEY")
            .ok_or(ConfigError::Missing { key: "LLM_API_KEY" })?;
        let model = either("LLM_MODEL", "OPENAI_MODEL")
            .ok_or(ConfigError::Missing { key: "LLM_MODEL" })?;
        let raw_temperature = either("LLM_TEMPERATURE", "OPENAI_TEMPERATURE")
            .ok_or(ConfigError::Missing { key: "LLM_TEMPERATURE" })?;
        let temperature: f32 = parse(&raw_temperature, "LLM_TEMPERATURE")?;
        if !(0.0..=MAX_TEMPERATURE).contains(&temperature) {
            return Err(ConfigError::Invalid {
                key: "LLM_TEMPERATURE",
                value: raw_temperature,
            });
        }

        let api_endpoint = normalize_endpoint(
            &either("LLM_API_ENDPOINT", "LLM_BASE_URL")
                .unwrap_or_else(|| DEFAULT_API_ENDPOINT.to_string()),
        );
        let timeout_ms = match get("LLM_TIMEOUT") {
            Some(raw) => parse(&raw, "LLM_TIMEOUT")?,
            None => DEFAULT_LLM_TIMEOUT_MS,
        };
        let max_retries = match get("LLM_MAX_RETRIES") {
            Some(raw) => parse(&raw, "LLM_MAX_RETRIES")?,
            None => DEFAULT_LLM_MAX_RETRIES,
        };

        let selection = match get("PHRASE_SELECTION") {
            Some(raw) => SelectionMode::parse(&raw).ok_or(ConfigError::Invalid {
                key: "PHRASE_SELECTION",
                value: raw,
            })?,
            None => SelectionMode::default(),
        };
        let grading_timeout_ms = match get("GRADING_TIMEOUT") {
            Some(raw) => parse(&raw, "GRADING_TIMEOUT")?,
            None => DEFAULT_GRADING_TIMEOUT_MS,
        };

        Ok(Self {
            host,
            port,
            store,
            llm: LLMConfig {
                api_key: api_key.trim().to_string(),
                model: model.trim().to_string(),
                temperature,
                api_endpoint,
                timeout: Duration::from_millis(timeout_ms),
                max_retries,
            },
            selection,
            grading_timeout: Duration::from_millis(grading_timeout_ms),
        })
    }

    pub fn bind_addr(&self) -> SocketAddr {
        SocketAddr::new(self.host, self.port)
    }
}

fn parse<T: std::str::FromStr>(raw: &str, key: &'static str) -> Result<T, ConfigError> {
    raw.trim().parse::<T>().map_err(|_| ConfigError::Invalid {
        key,
        value: raw.to_string(),
    })
}
