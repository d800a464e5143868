//! Upstream history client
//!
//! Polls the round-history feed the predictions are derived from. The
//! feed is loosely specified: usually a newest-first JSON array,
//! occasionally a single object, with field names varying by revision.

use crate::config::UpstreamConfig;
use crate::error::{BotError, Result};
use crate::types::RoundRecord;
use async_trait::async_trait;
use reqwest::Client;
use serde_json::Value;
use tracing::warn;

/// Source of round history, newest first. Abstracted so the server can
/// run against a fake feed in tests.
#[async_trait]
pub trait HistorySource: Send + Sync {
    async fn fetch(&self) -> Result<Vec<RoundRecord>>;
}

/// HTTP implementation against the configured feed URL
#[derive(Clone)]
pub struct HistoryClient {
    http: Client,
    url: String,
}

impl HistoryClient {
    pub fn new(cfg: &UpstreamConfig) -> Result<Self> {
        let http = Client::builder()
            .timeout(std::time::Duration::from_secs(cfg.timeout_secs))
            .build()?;
        Ok(Self {
            http,
            url: cfg.history_url.clone(),
        })
    }
}

#[async_trait]
impl HistorySource for HistoryClient {
    async fn fetch(&self) -> Result<Vec<RoundRecord>> {
        let payload: Value = self
            .http
            .get(&self.url)
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;
        parse_history(payload)
    }
}

/// Parse the feed payload. A single object is wrapped into a
/// one-element history; records that fail to deserialize are skipped
/// with a warning rather than failing the whole poll.
pub fn parse_history(payload: Value) -> Result<Vec<RoundRecord>> {
    let items = match payload {
        Value::Array(items) => items,
        obj @ Value::Object(_) => vec![obj],
        other => {
            return Err(BotError::UpstreamPayload(format!(
                "expected array or object, got {}",
                other
            )))
        }
    };

    Ok(items
        .into_iter()
        .filter_map(|item| match serde_json::from_value::<RoundRecord>(item) {
            Ok(record) => Some(record),
            Err(e) => {
                warn!("skipping malformed round record: {}", e);
                None
            }
        })
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::CanonicalOutcome;
    use serde_json::json;

    #[test]
    fn parses_a_newest_first_array() {
        let payload = json!([
            { "Phien": 102, "Ket_qua": "Xỉu" },
            { "Phien": 101, "Ket_qua": "Tài" },
        ]);
        let history = parse_history(payload).unwrap();
        assert_eq!(history.len(), 2);
        assert_eq!(history[0].session_id, 102);
        assert_eq!(history[0].outcome(), Some(CanonicalOutcome::Xiu));
    }

    #[test]
    fn wraps_a_single_object() {
        let payload = json!({ "Phien": "205", "Tong": 12 });
        let history = parse_history(payload).unwrap();
        assert_eq!(history.len(), 1);
        assert_eq!(history[0].session_id, 205);
        assert_eq!(history[0].outcome(), Some(CanonicalOutcome::Tai));
    }

    #[test]
    fn skips_malformed_records() {
        let payload = json!([
            { "Phien": 102, "Ket_qua": "Tài" },
            { "Ket_qua": "Tài" },
            { "Phien": "not-a-number" },
        ]);
        let history = parse_history(payload).unwrap();
        assert_eq!(history.len(), 1);
        assert_eq!(history[0].session_id, 102);
    }

    #[test]
    fn rejects_non_json_shapes() {
        assert!(parse_history(json!("whoops")).is_err());
        assert!(parse_history(json!(42)).is_err());
    }

    #[test]
    fn empty_array_is_valid() {
        assert!(parse_history(json!([])).unwrap().is_empty());
    }
}
