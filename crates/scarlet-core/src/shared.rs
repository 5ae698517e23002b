//! Shared types used across the Scarlet crates.

use serde::{Deserialize, Serialize};

const DEFAULT_CONFIG_PATH: &str = "config/scarlet";

/// One external search result.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchHit {
    pub title: String,
    pub link: String,
}

/// Result of a fallback web search. Failures are data, never errors, because they end up
/// as text in the chat reply.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SearchOutcome {
    /// At least one hit, already truncated to the configured cap.
    Results(Vec<SearchHit>),
    NoResults,
    /// Transport error, timeout or unexpected status; carries the description shown to the user.
    Failed(String),
}

impl SearchOutcome {
    /// Wraps a hit list, mapping an empty list to [`SearchOutcome::NoResults`].
    pub fn from_hits(hits: Vec<SearchHit>) -> Self {
        if hits.is_empty() {
            SearchOutcome::NoResults
        } else {
            SearchOutcome::Results(hits)
        }
    }
}

/// Settings for the fallback web search client.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchConfig {
    /// HTML search endpoint; the query is sent as the `q` parameter.
    pub endpoint: String,
    /// Browser-like identification header.
    pub user_agent: String,
    pub timeout_secs: u64,
    /// Maximum number of results kept from one search.
    pub max_results: usize,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            endpoint: "https://html.duckduckgo.com/html/".to_string(),
            user_agent: "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/91.0.4472.124 Safari/537.36".to_string(),
            timeout_secs: 5,
            max_results: 3,
        }
    }
}

/// Global application configuration. Load from TOML or env.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CoreConfig {
    /// Application identity reported by the status endpoint.
    pub app_name: String,
    /// HTTP port for the gateway.
    pub port: u16,
    /// Base directory for the sled record store.
    pub storage_path: String,
    /// Minimum similarity (exclusive) for trusting an internal match.
    pub confidence_threshold: f64,
    #[serde(default)]
    pub search: SearchConfig,
}

impl Default for CoreConfig {
    fn default() -> Self {
        Self {
            app_name: "Scarlet Assistant".to_string(),
            port: 5000,
            storage_path: "./data".to_string(),
            confidence_threshold: 0.2,
            search: SearchConfig::default(),
        }
    }
}

impl CoreConfig {
    /// Load config from file and environment. Precedence: `SCARLET_*` env vars > file at
    /// `SCARLET_CONFIG` (default `config/scarlet.toml`) > defaults.
    pub fn load() -> Result<Self, config::ConfigError> {
        let config_path =
            std::env::var("SCARLET_CONFIG").unwrap_or_else(|_| DEFAULT_CONFIG_PATH.to_string());
        let defaults = CoreConfig::default();
        let builder = config::Config::builder()
            .set_default("app_name", defaults.app_name)?
            .set_default("port", i64::from(defaults.port))?
            .set_default("storage_path", defaults.storage_path)?
            .set_default("confidence_threshold", defaults.confidence_threshold)?
            .set_default("search.endpoint", defaults.search.endpoint)?
            .set_default("search.user_agent", defaults.search.user_agent)?
            .set_default("search.timeout_secs", defaults.search.timeout_secs as i64)?
            .set_default("search.max_results", defaults.search.max_results as i64)?;

        let built = builder
            .add_source(config::File::with_name(&config_path).required(false))
            .add_source(config::Environment::with_prefix("SCARLET").separator("__"))
            .build()?;

        built.try_deserialize()
    }

    /// Path of the sled record store under `storage_path`.
    pub fn knowledge_path(&self) -> std::path::PathBuf {
        std::path::Path::new(&self.storage_path).join("scarlet_knowledge")
    }
}
