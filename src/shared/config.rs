use serde::{Deserialize, Serialize};
use std::time::Duration;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    pub database: DatabaseConfig,
    pub remote: RemoteConfig,
    pub sync: SyncConfig,
    pub connectivity: ConnectivityConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    pub url: String,
    pub max_connections: u32,
    pub connection_timeout: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RemoteConfig {
    pub base_url: String,
    #[serde(default)]
    pub api_key: Option<String>,
    pub request_timeout: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SyncConfig {
    /// In-flight remote calls per entity kind; 1 keeps strict fetch order.
    pub max_concurrency: usize,
    pub auto_requeue_transient: bool,
    pub retry: RetryConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RetryConfig {
    pub max_attempts: u32,
    pub base_backoff_ms: u64,
    pub max_backoff_ms: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConnectivityConfig {
    pub debounce_ms: u64,
    #[serde(default)]
    pub probe_url: Option<String>,
    pub probe_interval: u64,
    pub start_online: bool,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            database: DatabaseConfig {
                url: "sqlite:data/trackit.db?mode=rwc".to_string(),
                max_connections: 5,
                connection_timeout: 30,
            },
            remote: RemoteConfig {
                base_url: "http://localhost:54321".to_string(),
                api_key: None,
                request_timeout: 15,
            },
            sync: SyncConfig {
                max_concurrency: 1,
                auto_requeue_transient: false,
                retry: RetryConfig::default(),
            },
            connectivity: ConnectivityConfig {
                debounce_ms: 1_500,
                probe_url: None,
                probe_interval: 10,
                start_online: false,
            },
        }
    }
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_attempts: 5,
            base_backoff_ms: 5_000,
            max_backoff_ms: 15 * 60 * 1_000, // 15 minutes
        }
    }
}

impl RetryConfig {
    /// Exponential backoff after `attempts` failed pushes, capped at `max_backoff_ms`.
    pub fn backoff_for(&self, attempts: u32) -> Duration {
        let exponent = attempts.saturating_sub(1).min(32);
        let millis = self
            .base_backoff_ms
            .saturating_mul(1u64 << exponent)
            .min(self.max_backoff_ms);
        Duration::from_millis(millis)
    }
}

impl ConnectivityConfig {
    pub fn debounce(&self) -> Duration {
        Duration::from_millis(self.debounce_ms)
    }
}

impl AppConfig {
    pub fn from_env() -> Self {
        let mut cfg = Self::default();

        if let Ok(v) = std::env::var("TRACKIT_DATABASE_URL") {
            if !v.trim().is_empty() {
                cfg.database.url = v.trim().to_string();
            }
        }
        if let Some(value) = env_u64("TRACKIT_DATABASE_MAX_CONNECTIONS") {
            cfg.database.max_connections = value.clamp(1, u32::MAX as u64) as u32;
        }

        if let Ok(v) = std::env::var("TRACKIT_REMOTE_URL") {
            if !v.trim().is_empty() {
                cfg.remote.base_url = v.trim().trim_end_matches('/').to_string();
            }
        }
        if let Ok(v) = std::env::var("TRACKIT_REMOTE_API_KEY") {
            cfg.remote.api_key = Some(v).filter(|key| !key.trim().is_empty());
        }
        if let Some(value) = env_u64("TRACKIT_REMOTE_TIMEOUT_SECS") {
            cfg.remote.request_timeout = value.max(1);
        }

        if let Some(value) = env_u64("TRACKIT_SYNC_MAX_CONCURRENCY") {
            cfg.sync.max_concurrency = (value as usize).max(1);
        }
        if let Ok(v) = std::env::var("TRACKIT_SYNC_AUTO_REQUEUE") {
            cfg.sync.auto_requeue_transient = parse_bool(&v, cfg.sync.auto_requeue_transient);
        }
        if let Some(value) = env_u64("TRACKIT_SYNC_MAX_ATTEMPTS") {
            cfg.sync.retry.max_attempts = value.min(u32::MAX as u64) as u32;
        }
        if let Some(value) = env_u64("TRACKIT_SYNC_BACKOFF_BASE_MS") {
            cfg.sync.retry.base_backoff_ms = value;
        }
        if let Some(value) = env_u64("TRACKIT_SYNC_BACKOFF_MAX_MS") {
            cfg.sync.retry.max_backoff_ms = value;
        }

        if let Some(value) = env_u64("TRACKIT_CONNECTIVITY_DEBOUNCE_MS") {
            cfg.connectivity.debounce_ms = value;
        }
        if let Ok(v) = std::env::var("TRACKIT_CONNECTIVITY_PROBE_URL") {
            cfg.connectivity.probe_url = Some(v.trim().to_string()).filter(|url| !url.is_empty());
        }
        if let Some(value) = env_u64("TRACKIT_CONNECTIVITY_PROBE_INTERVAL_SECS") {
            cfg.connectivity.probe_interval = value.max(1);
        }
        if let Ok(v) = std::env::var("TRACKIT_CONNECTIVITY_START_ONLINE") {
            cfg.connectivity.start_online = parse_bool(&v, cfg.connectivity.start_online);
        }

        cfg
    }

    pub fn validate(&self) -> Result<(), String> {
        if self.database.max_connections == 0 {
            return Err("Database max_connections must be greater than 0".to_string());
        }
        if self.remote.base_url.trim().is_empty() {
            return Err("Remote base_url must not be empty".to_string());
        }
        if self.remote.request_timeout == 0 {
            return Err("Remote request_timeout must be greater than 0".to_string());
        }
        if self.sync.max_concurrency == 0 {
            return Err("Sync max_concurrency must be greater than 0".to_string());
        }
        if self.sync.retry.base_backoff_ms > self.sync.retry.max_backoff_ms {
            return Err("Sync base_backoff_ms must not exceed max_backoff_ms".to_string());
        }
        if self.connectivity.probe_url.is_some() && self.connectivity.probe_interval == 0 {
            return Err("Connectivity probe_interval must be greater than 0".to_string());
        }
        Ok(())
    }
}

fn env_u64(name: &str) -> Option<u64> {
    std::env::var(name).ok().and_then(|v| parse_u64(&v))
}

fn parse_bool(s: &str, default: bool) -> bool {
    match s.to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => true,
        "0" | "false" | "no" | "off" => false,
        _ => default,
    }
}

fn parse_u64(value: &str) -> Option<u64> {
    value.trim().parse::<u64>().ok()
}
