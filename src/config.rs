use std::time::Duration;

use serde::Deserialize;

/// Application configuration loaded from environment variables
#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    /// Server host address
    #[serde(default = "default_host")]
    pub host: String,

    /// Server port
    #[serde(default = "default_port")]
    pub port: u16,

    /// Events store base URL (recent user interactions)
    #[serde(default = "default_events_store_url")]
    pub events_store_url: String,

    /// Features store base URL (item similarity lookups)
    #[serde(default = "default_features_store_url")]
    pub features_store_url: String,

    /// CSV with columns `user_id,track_id,score`, grouped by user, best first.
    /// Unset leaves the personal table unloaded.
    pub personal_recs_path: Option<String>,

    /// CSV with columns `track_id,rank`. Unset leaves the default table unloaded.
    pub default_recs_path: Option<String>,

    /// How many recent events feed the online branch
    #[serde(default = "default_recent_events_limit")]
    pub recent_events_limit: usize,

    /// Timeout for a single events/features call, in milliseconds
    #[serde(default = "default_upstream_timeout_ms")]
    pub upstream_timeout_ms: u64,

    /// Bound on the whole online resolution of a blended request, in milliseconds
    #[serde(default = "default_online_timeout_ms")]
    pub online_timeout_ms: u64,

    /// Number of recommendations returned when the request omits `k`
    #[serde(default = "default_k")]
    pub default_k: usize,
}

fn default_host() -> String {
    "127.0.0.1".to_string()
}

fn default_port() -> u16 {
    8000
}

fn default_events_store_url() -> String {
    "http://127.0.0.1:8020".to_string()
}

fn default_features_store_url() -> String {
    "http://127.0.0.1:8010".to_string()
}

fn default_recent_events_limit() -> usize {
    3
}

fn default_upstream_timeout_ms() -> u64 {
    500
}

fn default_online_timeout_ms() -> u64 {
    1500
}

fn default_k() -> usize {
    100
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();
        envy::from_env::<Config>().map_err(|e| anyhow::anyhow!("Failed to load config: {}", e))
    }

    pub fn upstream_timeout(&self) -> Duration {
        Duration::from_millis(self.upstream_timeout_ms)
    }

    pub fn online_timeout(&self) -> Duration {
        Duration::from_millis(self.online_timeout_ms)
    }
}
