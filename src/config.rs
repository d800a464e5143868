//! Layered configuration: optional `config.toml` under environment
//! variables prefixed with `TAIXIU__`, plus the legacy `PORT` /
//! `HISTORY_API_URL` variables earlier deployments used.

use crate::error::Result;
use serde::Deserialize;
use std::collections::HashMap;

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub upstream: UpstreamConfig,
    #[serde(default)]
    pub engine: EngineConfig,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 3000,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct UpstreamConfig {
    /// History feed endpoint, newest round first
    pub history_url: String,
    /// Request timeout in seconds
    pub timeout_secs: u64,
}

impl Default for UpstreamConfig {
    fn default() -> Self {
        Self {
            history_url: "https://jjj-c53c.onrender.com/api/lxk".to_string(),
            timeout_secs: 7,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Lower bound of the cosmetic confidence display (percent)
    pub confidence_min: f64,
    /// Upper bound of the cosmetic confidence display (percent)
    pub confidence_max: f64,
    /// Symbols kept in the maximal pattern snapshot
    pub snapshot_window: usize,
    /// Symbols shown in the response pattern string
    pub pattern_display_len: usize,
    /// Run the lookup-table rule ahead of the pattern rules
    /// (ordering used by one engine revision)
    pub lookup_table_first: bool,
    /// Exact 13-symbol snapshot → outcome label ("Tài"/"Xỉu" or "T"/"X")
    pub lookup_table: HashMap<String, String>,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            confidence_min: 50.0,
            confidence_max: 90.0,
            snapshot_window: 15,
            pattern_display_len: 10,
            lookup_table_first: false,
            lookup_table: HashMap::new(),
        }
    }
}

impl Config {
    /// Load configuration from an optional TOML file and the environment.
    pub fn load(path: &str) -> Result<Self> {
        dotenvy::dotenv().ok();

        let mut cfg: Config = config::Config::builder()
            .add_source(config::File::with_name(path).required(false))
            .add_source(
                config::Environment::with_prefix("TAIXIU")
                    .prefix_separator("__")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?
            .try_deserialize()?;

        // Legacy environment variables kept for drop-in deployment compatibility
        if let Ok(url) = std::env::var("HISTORY_API_URL") {
            cfg.upstream.history_url = url;
        }
        if let Some(port) = std::env::var("PORT").ok().and_then(|p| p.parse().ok()) {
            cfg.server.port = port;
        }

        Ok(cfg)
    }
}
