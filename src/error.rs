//! Error types for the prediction bot

use thiserror::Error;

/// Errors that can occur in the bot
#[derive(Error, Debug)]
pub enum BotError {
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Configuration error: {0}")]
    Config(#[from] config::ConfigError),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid upstream payload: {0}")]
    UpstreamPayload(String),

    #[error("Invalid lookup table entry: {0}")]
    LookupTable(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

/// Result alias using BotError
pub type Result<T> = std::result::Result<T, BotError>;
