//! Planner configuration.

use std::env;
use std::path::PathBuf;
use std::time::Duration;

pub const ENGINE_URL_ENV: &str = "STARFORCE_ENGINE_URL";
pub const ENGINE_TIMEOUT_ENV: &str = "STARFORCE_ENGINE_TIMEOUT_SECS";

/// Where and how to reach the cost engine.
#[derive(Debug, Clone, PartialEq)]
pub struct EngineConfig {
    /// Scheme, host and port, without a trailing slash
    pub base_url: String,

    /// Path of the bulk calculation endpoint
    pub endpoint: String,

    /// Whole-request timeout
    pub timeout_secs: u64,

    pub user_agent: String,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:8000".to_string(),
            endpoint: "/starforce/bulk".to_string(),
            timeout_secs: 30,
            user_agent: format!("starforce-planner/{}", env!("CARGO_PKG_VERSION")),
        }
    }
}

impl EngineConfig {
    /// Defaults, overridden by `STARFORCE_ENGINE_URL` and
    /// `STARFORCE_ENGINE_TIMEOUT_SECS` when set.
    pub fn from_env() -> Self {
        let mut config = Self::default();
        if let Ok(url) = env::var(ENGINE_URL_ENV) {
            if !url.trim().is_empty() {
                config.base_url = url.trim().to_string();
            }
        }
        if let Ok(secs) = env::var(ENGINE_TIMEOUT_ENV) {
            config.timeout_secs = secs.trim().parse().unwrap_or(config.timeout_secs);
        }
        config
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    pub fn url(&self) -> String {
        format!(
            "{}/{}",
            self.base_url.trim_end_matches('/'),
            self.endpoint.trim_start_matches('/')
        )
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

/// Top-level settings for the planner and its saved roster.
#[derive(Debug, Clone)]
pub struct PlannerConfig {
    /// Directory holding the roster file
    pub data_dir: PathBuf,

    pub roster_file: String,

    pub engine: EngineConfig,
}

impl Default for PlannerConfig {
    fn default() -> Self {
        let data_dir = dirs::home_dir()
            .map(|home| home.join(".starforce"))
            .unwrap_or_else(|| PathBuf::from(".starforce"));
        Self {
            data_dir,
            roster_file: "roster.json".to_string(),
            engine: EngineConfig::default(),
        }
    }
}

impl PlannerConfig {
    pub fn from_env() -> Self {
        Self {
            engine: EngineConfig::from_env(),
            ..Default::default()
        }
    }

    pub fn roster_path(&self) -> PathBuf {
        self.data_dir.join(&self.roster_file)
    }
}
