//! Pattern snapshot extraction over the normalized round history.
//!
//! Every strategy window (streak, alternation, symmetric runs, trend)
//! is a prefix slice of one maximal newest-first snapshot, so the
//! engine extracts it once per cycle.

use crate::types::{CanonicalOutcome, RoundRecord};

/// Extract the newest-first snapshot of classifiable outcomes.
///
/// Records the normalizer cannot classify are skipped, so a snapshot
/// may span more than `n` raw records. Fewer than `n` classifiable
/// records yields a shorter snapshot; every rule declares its own
/// minimum length and declines when unmet.
pub fn extract_snapshot(history: &[RoundRecord], n: usize) -> Vec<CanonicalOutcome> {
    history.iter().filter_map(|r| r.outcome()).take(n).collect()
}

/// Render a snapshot as a compact symbol string, e.g. "TXXTT".
pub fn pattern_string(snapshot: &[CanonicalOutcome]) -> String {
    snapshot.iter().map(|o| o.symbol()).collect()
}

/// Group consecutive identical outcomes into `(outcome, length)` runs,
/// newest-first.
pub fn run_lengths(snapshot: &[CanonicalOutcome]) -> Vec<(CanonicalOutcome, usize)> {
    let mut runs: Vec<(CanonicalOutcome, usize)> = Vec::new();
    for &o in snapshot {
        match runs.last_mut() {
            Some((sym, len)) if *sym == o => *len += 1,
            _ => runs.push((o, 1)),
        }
    }
    runs
}
