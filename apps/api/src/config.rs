use std::path::PathBuf;
use std::time::Duration;

use anyhow::{Context, Result};

use crate::generation::sessions::{DEFAULT_MAX_SESSIONS, DEFAULT_SESSION_TTL};
use crate::llm_client::{DEFAULT_BASE_URL, DEFAULT_MODEL};

const DEFAULT_TIMEOUT_SECS: u64 = 60;

/// Application configuration loaded from environment variables.
/// Fails at startup if required variables are missing.
#[derive(Debug, Clone)]
pub struct Config {
    pub groq_api_key: String,
    pub llm_base_url: String,
    pub llm_model: String,
    pub llm_timeout: Duration,
    /// Flat skill list; the built-in vocabulary is used when unset.
    pub skills_file: Option<PathBuf>,
    /// Cover letter sessions expire this long after creation.
    pub session_ttl: Duration,
    pub max_sessions: usize,
    pub port: u16,
    pub rust_log: String,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let require = |key: &str| {
            lookup(key)
                .filter(|v| !v.trim().is_empty())
                .with_context(|| format!("Environment variable '{key}' is not set"))
        };

        let positive = |key: &str, default: u64| -> Result<u64> {
            match lookup(key) {
                Some(raw) => raw
                    .parse::<u64>()
                    .ok()
                    .filter(|value| *value > 0)
                    .with_context(|| format!("{key} must be a positive integer, got '{raw}'")),
                None => Ok(default),
            }
        };

        let timeout_secs = positive("LLM_TIMEOUT_SECS", DEFAULT_TIMEOUT_SECS)?;
        let ttl_secs = positive("SESSION_TTL_SECS", DEFAULT_SESSION_TTL.as_secs())?;
        let max_sessions = positive("MAX_SESSIONS", DEFAULT_MAX_SESSIONS as u64)?;

        Ok(Config {
            groq_api_key: require("GROQ_API_KEY")?,
            llm_base_url: lookup("LLM_BASE_URL")
                .unwrap_or_else(|| DEFAULT_BASE_URL.to_string()),
            llm_model: lookup("LLM_MODEL")
                .unwrap_or_else(|| DEFAULT_MODEL.to_string()),
            llm_timeout: Duration::from_secs(timeout_secs),
            skills_file: lookup("SKILLS_FILE")
                .filter(|v| !v.trim().is_empty())
                .map(PathBuf::from),
            session_ttl: Duration::from_secs(ttl_secs),
            max_sessions: usize::try_from(max_sessions).unwrap_or(usize::MAX),
            port: lookup("PORT")
                .unwrap_or_else(|| "8080".to_string())
                .parse::<u16>()
                .context("PORT must be a valid port number")?,
            rust_log: lookup("RUST_LOG").unwrap_or_else(|| "info".to_string()),
        })
    }
}
