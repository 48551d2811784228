use std::env;
use std::time::Duration;

use dotenvy::dotenv;

use crate::error::{ChatboxError, Result};
use crate::prompt::PromptLimits;

pub const DATABASE_URL_ENV: &str = "DATABASE_URL";
pub const OLLAMA_URL_ENV: &str = "OLLAMA_URL";
pub const OLLAMA_MODEL_ENV: &str = "OLLAMA_MODEL";
pub const OLLAMA_TIMEOUT_SECS_ENV: &str = "OLLAMA_TIMEOUT_SECS";
pub const QUERY_PROMPT_LIMIT_ENV: &str = "CHATBOX_QUERY_PROMPT_LIMIT";
pub const EXPLAIN_PROMPT_LIMIT_ENV: &str = "CHATBOX_EXPLAIN_PROMPT_LIMIT";

pub const DEFAULT_OLLAMA_URL: &str = "http://localhost:11434/api/generate";
pub const DEFAULT_OLLAMA_MODEL: &str = "mistral";
pub const DEFAULT_TIMEOUT_SECS: u64 = 400;

/// Runtime settings for the chatbox pipeline.
#[derive(Debug, Clone)]
pub struct ChatboxConfig {
    /// Only needed by `generate_sql`; the explain operations never touch the catalog.
    pub database_url: Option<String>,
    pub endpoint: String,
    pub model: String,
    pub request_timeout: Duration,
    pub limits: PromptLimits,
}

impl Default for ChatboxConfig {
    fn default() -> Self {
        Self {
            database_url: None,
            endpoint: DEFAULT_OLLAMA_URL.to_string(),
            model: DEFAULT_OLLAMA_MODEL.to_string(),
            request_timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            limits: PromptLimits::default(),
        }
    }
}

impl ChatboxConfig {
    /// Load `.env` if present, then read settings from the process environment.
    pub fn from_env() -> Result<Self> {
        dotenv().ok();
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build a config from an arbitrary key lookup. Missing keys fall back to defaults.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let read = |key: &str| {
            lookup(key)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };
        let defaults = Self::default();

        let request_timeout = match read(OLLAMA_TIMEOUT_SECS_ENV) {
            Some(v) => {
                let secs = parse_number(OLLAMA_TIMEOUT_SECS_ENV, &v)?;
                if secs == 0 {
                    return Err(ChatboxError::Config(format!(
                        "{} must be greater than zero",
                        OLLAMA_TIMEOUT_SECS_ENV
                    )));
                }
                Duration::from_secs(secs)
            }
            None => defaults.request_timeout,
        };

        let mut limits = defaults.limits;
        if let Some(v) = read(QUERY_PROMPT_LIMIT_ENV) {
            limits.generate_sql = parse_number(QUERY_PROMPT_LIMIT_ENV, &v)? as usize;
        }
        if let Some(v) = read(EXPLAIN_PROMPT_LIMIT_ENV) {
            limits.explain = parse_number(EXPLAIN_PROMPT_LIMIT_ENV, &v)? as usize;
        }

        Ok(Self {
            database_url: read(DATABASE_URL_ENV),
            endpoint: read(OLLAMA_URL_ENV).unwrap_or(defaults.endpoint),
            model: read(OLLAMA_MODEL_ENV).unwrap_or(defaults.model),
            request_timeout,
            limits,
        })
    }
}

fn parse_number(key: &str, value: &str) -> Result<u64> {
    value
        .parse::<u64>()
        .map_err(|e| ChatboxError::Config(format!("{}={:?}: {}", key, value, e)))
}
