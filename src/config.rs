use anyhow::{Context, Result};
use std::env;
use std::path::PathBuf;
use std::str::FromStr;

use crate::daily::DEFAULT_SECRET;
use crate::db;
use crate::provider::RetryConfig;

/// Where crossword content comes from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CrosswordSourceConfig {
    Http { url: String },
    File { path: PathBuf },
}

/// Process configuration, read from the environment (and `.env`).
#[derive(Debug, Clone)]
pub struct Settings {
    pub database_url: String,
    pub wordle_secret: String,
    pub words_path: PathBuf,
    pub crossword_source: CrosswordSourceConfig,
    pub retry: RetryConfig,
}

impl Settings {
    pub fn from_env() -> Result<Self> {
        // A missing .env file is fine
        let _ = dotenvy::dotenv();
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build settings from an arbitrary key lookup.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let database_url = match lookup("DATABASE_URL") {
            Some(url) => url,
            None => format!("sqlite:{}", db::get_db_path()?.display()),
        };

        let wordle_secret = lookup("WORDLE_SECRET").unwrap_or_else(|| DEFAULT_SECRET.to_string());
        if wordle_secret == DEFAULT_SECRET {
            tracing::warn!("WORDLE_SECRET is not set; daily words are guessable from the source");
        }

        let words_path = lookup("WORDLE_WORDS_PATH")
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from("data/words.json"));

        let crossword_source = match lookup("CROSSWORD_SOURCE_URL") {
            Some(url) => CrosswordSourceConfig::Http { url },
            None => CrosswordSourceConfig::File {
                path: lookup("CROSSWORD_SOURCE_FILE")
                    .map(PathBuf::from)
                    .unwrap_or_else(|| PathBuf::from("data/crossword.json")),
            },
        };

        let defaults = RetryConfig::default();
        let retry = RetryConfig {
            max_attempts: parse_or(&lookup, "CROSSWORD_MAX_RETRIES", defaults.max_attempts)?,
            base_delay_ms: parse_or(&lookup, "CROSSWORD_RETRY_BASE_MS", defaults.base_delay_ms)?,
            max_delay_ms: parse_or(&lookup, "CROSSWORD_RETRY_MAX_MS", defaults.max_delay_ms)?,
            ..defaults
        };

        Ok(Self {
            database_url,
            wordle_secret,
            words_path,
            crossword_source,
            retry,
        })
    }
}

fn parse_or<T>(lookup: &impl Fn(&str) -> Option<String>, key: &str, default: T) -> Result<T>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match lookup(key) {
        Some(raw) => raw
            .trim()
            .parse()
            .with_context(|| format!("{key} must be a number, got {raw:?}")),
        None => Ok(default),
    }
}
