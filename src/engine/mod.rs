//! Prediction engine
//!
//! Owns the single-slot prediction cache and the daily accuracy
//! ledger. One cycle per upstream poll: reconcile the newest resolved
//! round against the cached prediction, then serve the cached
//! prediction for the next session or compute a fresh one.
//!
//! All mutable state sits behind one mutex; the critical section is
//! pure in-memory work and never awaits.

#[cfg(test)]
mod tests;

use crate::analysis::{extract_snapshot, pattern_string};
use crate::config::EngineConfig;
use crate::error::Result;
use crate::strategy::StrategyChain;
use crate::types::{CanonicalOutcome, RoundRecord};
use chrono::{DateTime, Days, FixedOffset, NaiveDate, TimeZone, Utc};
use parking_lot::Mutex;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::Serialize;
use std::sync::Arc;

/// Sentinel prediction label used before any round has resolved
pub const PENDING: &str = "pending";

/// The feed's reference timezone (Vietnam, UTC+7, no DST)
fn vn_offset() -> FixedOffset {
    FixedOffset::east_opt(7 * 3600).expect("UTC+7 is a valid offset")
}

/// Current calendar day in the reference timezone
pub fn vn_date(now: DateTime<Utc>) -> NaiveDate {
    now.with_timezone(&vn_offset()).date_naive()
}

/// Display timestamp in the reference timezone
pub fn vn_timestamp(now: DateTime<Utc>) -> String {
    now.with_timezone(&vn_offset())
        .format("%d/%m/%Y %H:%M:%S")
        .to_string()
}

/// The one pending prediction, keyed by the session it is for
#[derive(Debug, Clone, Serialize)]
pub struct CachedPrediction {
    /// Session this prediction is for (latest resolved + 1)
    pub target_session: u64,
    pub outcome: CanonicalOutcome,
    /// Cosmetic confidence display, fixed per target session
    pub confidence: String,
    /// Pattern string the prediction was derived from
    pub pattern: String,
    /// Rule that fired
    pub rule: String,
    /// Real outcome of the target session, once observed
    pub resolved_outcome: Option<CanonicalOutcome>,
    /// Whether this prediction has been counted into the ledger
    pub accounted: bool,
}

/// Per-day accuracy counters, reset at VN midnight
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DailyLedger {
    pub date: NaiveDate,
    pub total: u64,
    pub correct: u64,
    pub incorrect: u64,
}

impl DailyLedger {
    fn new(date: NaiveDate) -> Self {
        Self {
            date,
            total: 0,
            correct: 0,
            incorrect: 0,
        }
    }
}

/// One lookup-and-predict cycle's payload
#[derive(Debug, Clone, Serialize)]
pub struct PredictionResponse {
    pub time: String,
    pub latest_session: Option<u64>,
    pub latest_outcome: Option<String>,
    pub predicted_session: Option<u64>,
    /// Predicted outcome label, or the "pending" sentinel
    pub prediction: String,
    pub confidence: String,
    pub pattern: String,
    pub rule: Option<String>,
    /// Real outcome of the predicted session once known
    pub resolved_outcome: Option<String>,
    /// True when this response was served from the cache slot
    pub cached: bool,
    pub stats: DailyLedger,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// Read-only statistics payload
#[derive(Debug, Clone, Serialize)]
pub struct StatsResponse {
    pub time: String,
    pub stats: DailyLedger,
    pub cache: Option<CachedPrediction>,
}

struct EngineState {
    cache: Option<CachedPrediction>,
    ledger: DailyLedger,
    rng: StdRng,
}

impl EngineState {
    fn reset_if_new_day(&mut self, today: NaiveDate) {
        if self.ledger.date != today {
            tracing::info!(%today, "daily reset: clearing ledger and prediction cache");
            self.ledger = DailyLedger::new(today);
            self.cache = None;
        }
    }
}

/// Prediction engine with single-slot cache and daily ledger
pub struct PredictionEngine {
    cfg: EngineConfig,
    chain: StrategyChain,
    state: Mutex<EngineState>,
}

impl PredictionEngine {
    pub fn new(cfg: EngineConfig) -> Result<Self> {
        Self::with_rng(cfg, StdRng::from_os_rng())
    }

    /// Construct with an explicit rng so tests can pin the coin flips
    /// and confidence draws.
    pub fn with_rng(cfg: EngineConfig, rng: StdRng) -> Result<Self> {
        let chain = StrategyChain::from_config(&cfg)?;
        let ledger = DailyLedger::new(vn_date(Utc::now()));
        Ok(Self {
            cfg,
            chain,
            state: Mutex::new(EngineState {
                cache: None,
                ledger,
                rng,
            }),
        })
    }

    /// Run one lookup-and-predict cycle against a freshly fetched
    /// newest-first history.
    pub fn run_cycle(&self, history: &[RoundRecord]) -> PredictionResponse {
        self.run_cycle_at(history, Utc::now())
    }

    /// Cycle with an explicit clock, for day-boundary tests.
    pub fn run_cycle_at(&self, history: &[RoundRecord], now: DateTime<Utc>) -> PredictionResponse {
        let mut state = self.state.lock();
        state.reset_if_new_day(vn_date(now));

        let Some(newest) = history.first() else {
            return pending_response(state.ledger.clone(), now);
        };

        reconcile(&mut state, newest);

        let target = newest.session_id + 1;
        let hit = matches!(&state.cache, Some(c) if c.target_session == target);

        if !hit {
            let snapshot = extract_snapshot(history, self.cfg.snapshot_window);
            let display_len = snapshot.len().min(self.cfg.pattern_display_len);
            let predicted = self.chain.predict(&snapshot, &mut state.rng);
            let confidence = format!(
                "{:.1}%",
                state
                    .rng
                    .random_range(self.cfg.confidence_min..=self.cfg.confidence_max)
            );

            tracing::info!(
                session = target,
                prediction = predicted.outcome.label(),
                rule = predicted.rule,
                confidence = %confidence,
                "new prediction"
            );

            state.cache = Some(CachedPrediction {
                target_session: target,
                outcome: predicted.outcome,
                confidence,
                pattern: pattern_string(&snapshot[..display_len]),
                rule: predicted.rule.to_string(),
                resolved_outcome: None,
                accounted: false,
            });
            state.ledger.total += 1;
        }

        match &state.cache {
            Some(cache) => PredictionResponse {
                time: vn_timestamp(now),
                latest_session: Some(newest.session_id),
                latest_outcome: newest.outcome().map(|o| o.label().to_string()),
                predicted_session: Some(cache.target_session),
                prediction: cache.outcome.label().to_string(),
                confidence: cache.confidence.clone(),
                pattern: cache.pattern.clone(),
                rule: Some(cache.rule.clone()),
                resolved_outcome: cache.resolved_outcome.map(|o| o.label().to_string()),
                cached: hit,
                stats: state.ledger.clone(),
                error: None,
            },
            // the slot was just filled; this arm keeps the fn total
            None => pending_response(state.ledger.clone(), now),
        }
    }

    /// Best-effort payload when the upstream fetch failed: a uniformly
    /// random outcome, a confidence from the bottom of the configured
    /// range, and the ledger untouched.
    pub fn degraded_response(&self, reason: impl Into<String>) -> PredictionResponse {
        self.degraded_response_at(reason, Utc::now())
    }

    pub fn degraded_response_at(
        &self,
        reason: impl Into<String>,
        now: DateTime<Utc>,
    ) -> PredictionResponse {
        let mut state = self.state.lock();
        state.reset_if_new_day(vn_date(now));

        let outcome = if state.rng.random_bool(0.5) {
            CanonicalOutcome::Tai
        } else {
            CanonicalOutcome::Xiu
        };
        let low_span = (self.cfg.confidence_max - self.cfg.confidence_min) * 0.1;
        let confidence = format!(
            "{:.1}%",
            state
                .rng
                .random_range(self.cfg.confidence_min..=self.cfg.confidence_min + low_span)
        );

        PredictionResponse {
            time: vn_timestamp(now),
            latest_session: None,
            latest_outcome: None,
            predicted_session: None,
            prediction: outcome.label().to_string(),
            confidence,
            pattern: String::new(),
            rule: None,
            resolved_outcome: None,
            cached: false,
            stats: state.ledger.clone(),
            error: Some(reason.into()),
        }
    }

    /// Read-only snapshot of the ledger and the cache slot.
    pub fn stats(&self) -> StatsResponse {
        self.stats_at(Utc::now())
    }

    pub fn stats_at(&self, now: DateTime<Utc>) -> StatsResponse {
        let mut state = self.state.lock();
        state.reset_if_new_day(vn_date(now));
        StatsResponse {
            time: vn_timestamp(now),
            stats: state.ledger.clone(),
            cache: state.cache.clone(),
        }
    }

    /// Background task that resets ledger and cache at each VN
    /// midnight. The lazy per-request check covers missed wakeups, so
    /// the two paths share the same state transition.
    pub fn spawn_daily_reset(self: Arc<Self>) -> tokio::task::JoinHandle<()> {
        tokio::spawn(async move {
            loop {
                tokio::time::sleep(until_next_vn_midnight(Utc::now())).await;
                // guard dropped before the next sleep
                {
                    let mut state = self.state.lock();
                    state.reset_if_new_day(vn_date(Utc::now()));
                }
            }
        })
    }
}

/// Record the newest resolved round against the cached prediction.
///
/// At most one ledger mutation per target session: repeated polls that
/// observe the same resolution are no-ops, as are unclassifiable
/// outcomes and session-id mismatches.
fn reconcile(state: &mut EngineState, newest: &RoundRecord) {
    let Some(cache) = state.cache.as_mut() else {
        return;
    };
    if cache.target_session != newest.session_id {
        return;
    }
    let Some(actual) = newest.outcome() else {
        return;
    };

    if !cache.accounted {
        if actual == cache.outcome {
            state.ledger.correct += 1;
            tracing::info!(
                session = newest.session_id,
                outcome = actual.label(),
                "prediction correct"
            );
        } else {
            state.ledger.incorrect += 1;
            tracing::info!(
                session = newest.session_id,
                predicted = cache.outcome.label(),
                outcome = actual.label(),
                "prediction wrong"
            );
        }
        cache.accounted = true;
    }
    cache.resolved_outcome = Some(actual);
}

fn pending_response(stats: DailyLedger, now: DateTime<Utc>) -> PredictionResponse {
    PredictionResponse {
        time: vn_timestamp(now),
        latest_session: None,
        latest_outcome: None,
        predicted_session: None,
        prediction: PENDING.to_string(),
        confidence: "0.0%".to_string(),
        pattern: String::new(),
        rule: None,
        resolved_outcome: None,
        cached: false,
        stats,
        error: None,
    }
}

/// Wall-clock duration until the next VN midnight
fn until_next_vn_midnight(now: DateTime<Utc>) -> std::time::Duration {
    let tz = vn_offset();
    let now_vn = now.with_timezone(&tz);
    let next = (now_vn.date_naive() + Days::new(1))
        .and_hms_opt(0, 0, 0)
        .and_then(|m| tz.from_local_datetime(&m).single());
    match next {
        Some(midnight) => (midnight - now_vn)
            .to_std()
            .unwrap_or(std::time::Duration::from_secs(1)),
        // can't happen with a fixed offset; retry in an hour
        None => std::time::Duration::from_secs(3600),
    }
}
