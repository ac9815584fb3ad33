//! Service configuration loaded from environment variables.

use std::fmt;
use std::net::SocketAddr;
use std::path::PathBuf;
use std::time::Duration;

use anyhow::{Context, Result};
use spend_forecast::ModelStore;

/// Default OpenAI-compatible chat completions endpoint
pub const DEFAULT_SUGGESTION_URL: &str = "https://api.openai.com/v1/chat/completions";

/// Default chat model for suggestions
pub const DEFAULT_SUGGESTION_MODEL: &str = "gpt-3.5-turbo";

const DEFAULT_BIND_ADDR: &str = "0.0.0.0:5000";
const DEFAULT_SUGGESTION_TIMEOUT_SECS: u64 = 10;

/// Settings for the external suggestion generator.
#[derive(Clone)]
pub struct SuggestionSettings {
    pub endpoint: String,
    pub api_key: String,
    pub model: String,
    pub timeout: Duration,
}

impl fmt::Debug for SuggestionSettings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SuggestionSettings")
            .field("endpoint", &self.endpoint)
            .field("api_key", &"<redacted>")
            .field("model", &self.model)
            .field("timeout", &self.timeout)
            .finish()
    }
}

/// Application configuration.
#[derive(Clone)]
pub struct Config {
    /// SQLite connection URL holding `wallet_transactions`
    pub database_url: Option<String>,

    /// Path of the trained model artifact
    pub model_path: PathBuf,

    /// Address the HTTP API listens on
    pub bind_addr: SocketAddr,

    /// Language-model suggestions; `None` uses the built-in templates
    pub suggestions: Option<SuggestionSettings>,
}

impl fmt::Debug for Config {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Config")
            .field("database_url", &self.database_url.as_ref().map(|_| "<redacted>"))
            .field("model_path", &self.model_path)
            .field("bind_addr", &self.bind_addr)
            .field("suggestions", &self.suggestions)
            .finish()
    }
}

impl Config {
    /// Loads configuration from environment variables.
    ///
    /// Optional environment variables:
    /// - `DATABASE_URL`: SQLite connection string (required by commands that read the database)
    /// - `MODEL_PATH`: model artifact path (default: `spending_model.json`)
    /// - `BIND_ADDR`: HTTP listen address (default: `0.0.0.0:5000`)
    /// - `OPENAI_API_KEY`: enables language-model suggestions
    /// - `SUGGESTION_API_URL`, `SUGGESTION_MODEL`, `SUGGESTION_TIMEOUT_SECS`
    ///
    /// # Errors
    ///
    /// Returns an error if a variable is present but malformed.
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds the configuration from an arbitrary variable lookup.
    ///
    /// # Errors
    ///
    /// Returns an error if a variable is present but malformed.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let non_empty = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let model_path = non_empty("MODEL_PATH")
            .map_or_else(|| PathBuf::from(ModelStore::DEFAULT_PATH), PathBuf::from);

        let bind_addr = non_empty("BIND_ADDR")
            .unwrap_or_else(|| DEFAULT_BIND_ADDR.to_string())
            .parse()
            .context("BIND_ADDR is not a valid socket address")?;

        let suggestions = match non_empty("OPENAI_API_KEY") {
            Some(api_key) => {
                let timeout_secs = match non_empty("SUGGESTION_TIMEOUT_SECS") {
                    Some(raw) => raw
                        .trim()
                        .parse::<u64>()
                        .context("SUGGESTION_TIMEOUT_SECS must be a whole number of seconds")?,
                    None => DEFAULT_SUGGESTION_TIMEOUT_SECS,
                };
                Some(SuggestionSettings {
                    endpoint: non_empty("SUGGESTION_API_URL")
                        .unwrap_or_else(|| DEFAULT_SUGGESTION_URL.to_string()),
                    api_key,
                    model: non_empty("SUGGESTION_MODEL")
                        .unwrap_or_else(|| DEFAULT_SUGGESTION_MODEL.to_string()),
                    timeout: Duration::from_secs(timeout_secs),
                })
            }
            None => None,
        };

        Ok(Self {
            database_url: non_empty("DATABASE_URL"),
            model_path,
            bind_addr,
            suggestions,
        })
    }

    /// The database URL, for commands that need it.
    ///
    /// # Errors
    ///
    /// Returns an error if `DATABASE_URL` was not set.
    pub fn database_url(&self) -> Result<&str> {
        self.database_url
            .as_deref()
            .context("DATABASE_URL environment variable not set")
    }

    /// The model artifact store.
    #[must_use]
    pub fn model_store(&self) -> ModelStore {
        ModelStore::new(&self.model_path)
    }
}
