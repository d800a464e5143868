//! Prediction strategy chain
//!
//! An ordered list of pattern-detection rules sharing one interface.
//! Each rule inspects the newest-first outcome snapshot and either
//! fires with a prediction or declines; the first rule to fire wins.
//! A terminal uniform coin flip keeps the chain total, so every
//! history (even an empty one) reaches a decision.

pub mod rules;


pub use rules::{
    AlternationReversal, DoubleStreakReversal, LookupTable, MajorityTrend, StreakContinuation,
    SymmetricRuns,
};

use crate::config::EngineConfig;
use crate::error::{BotError, Result};
use crate::types::CanonicalOutcome;
use rand::{Rng, RngCore};
use std::collections::HashMap;

/// Label reported when no rule fired and the coin flip decided.
pub const COIN_FLIP: &str = "coin-flip";

/// One pattern-detection rule in the chain.
pub trait PredictionRule: Send + Sync {
    /// Short label for logging and the response payload
    fn name(&self) -> &'static str;

    /// Inspect the newest-first snapshot. `None` means the rule's
    /// precondition is unmet and the next rule should be tried.
    fn try_predict(&self, snapshot: &[CanonicalOutcome]) -> Option<CanonicalOutcome>;
}

/// Outcome of one chain evaluation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RulePrediction {
    pub outcome: CanonicalOutcome,
    pub rule: &'static str,
}

/// Fixed-order rule chain with a random terminal fallback
pub struct StrategyChain {
    rules: Vec<Box<dyn PredictionRule>>,
}

impl StrategyChain {
    pub fn new(rules: Vec<Box<dyn PredictionRule>>) -> Self {
        Self { rules }
    }

    /// Build the canonical chain: streak, alternation, symmetric runs,
    /// double-streak reversal, lookup table, majority trend. One engine
    /// revision ran the lookup table ahead of the pattern rules; the
    /// `lookup_table_first` knob reproduces that ordering.
    pub fn from_config(cfg: &EngineConfig) -> Result<Self> {
        let lookup = LookupTable::new(parse_lookup_table(&cfg.lookup_table)?);
        // an empty table can never match; leave the rule out entirely
        let lookup: Option<Box<dyn PredictionRule>> = if lookup.is_empty() {
            None
        } else {
            Some(Box::new(lookup))
        };

        let mut rules: Vec<Box<dyn PredictionRule>> = Vec::new();
        if cfg.lookup_table_first {
            rules.extend(lookup);
            rules.push(Box::new(StreakContinuation));
            rules.push(Box::new(AlternationReversal));
            rules.push(Box::new(SymmetricRuns));
            rules.push(Box::new(DoubleStreakReversal));
        } else {
            rules.push(Box::new(StreakContinuation));
            rules.push(Box::new(AlternationReversal));
            rules.push(Box::new(SymmetricRuns));
            rules.push(Box::new(DoubleStreakReversal));
            rules.extend(lookup);
        }
        rules.push(Box::new(MajorityTrend::new(cfg.snapshot_window)));

        Ok(Self::new(rules))
    }

    /// Evaluate the chain. Always produces an outcome: when every rule
    /// declines (tie, empty history) the injected rng decides uniformly.
    pub fn predict(
        &self,
        snapshot: &[CanonicalOutcome],
        rng: &mut dyn RngCore,
    ) -> RulePrediction {
        for rule in &self.rules {
            if let Some(outcome) = rule.try_predict(snapshot) {
                return RulePrediction {
                    outcome,
                    rule: rule.name(),
                };
            }
        }
        let outcome = if rng.random_bool(0.5) {
            CanonicalOutcome::Tai
        } else {
            CanonicalOutcome::Xiu
        };
        RulePrediction {
            outcome,
            rule: COIN_FLIP,
        }
    }
}

/// Parse configured snapshot→label entries into rule form. Keys are
/// symbol strings ("TXTXXTTXXTXTX"), values outcome labels.
fn parse_lookup_table(
    raw: &HashMap<String, String>,
) -> Result<HashMap<String, CanonicalOutcome>> {
    let mut table = HashMap::with_capacity(raw.len());
    for (key, value) in raw {
        let key = key.trim().to_ascii_uppercase();
        if key.len() != rules::LOOKUP_WINDOW || !key.chars().all(|c| c == 'T' || c == 'X') {
            return Err(BotError::LookupTable(format!(
                "key {:?} is not a {}-symbol T/X string",
                key,
                rules::LOOKUP_WINDOW
            )));
        }
        let outcome = CanonicalOutcome::from_text(value)
            .ok_or_else(|| BotError::LookupTable(format!("unknown outcome label {:?}", value)))?;
        table.insert(key, outcome);
    }
    Ok(table)
}
