//! The individual pattern-detection rules.
//!
//! All snapshots are newest-first: index 0 is the most recent round.
//! Each rule checks its own minimum window and declines rather than
//! errors when the history is too short.

use super::PredictionRule;
use crate::analysis::{pattern_string, run_lengths};
use crate::types::CanonicalOutcome;
use std::collections::HashMap;

pub const STREAK_WINDOW: usize = 3;
pub const ALTERNATION_WINDOW: usize = 4;
pub const SYMMETRIC_WINDOW: usize = 6;
pub const DOUBLE_STREAK_WINDOW: usize = 8;
pub const LOOKUP_WINDOW: usize = 13;

/// Rule 1: three identical newest outcomes → ride the streak.
pub struct StreakContinuation;

impl PredictionRule for StreakContinuation {
    fn name(&self) -> &'static str {
        "streak-continuation"
    }

    fn try_predict(&self, snapshot: &[CanonicalOutcome]) -> Option<CanonicalOutcome> {
        let w = snapshot.get(..STREAK_WINDOW)?;
        if w.iter().all(|&o| o == w[0]) {
            Some(w[0])
        } else {
            None
        }
    }
}

/// Rule 2: four strictly alternating outcomes → predict the pattern's
/// implied next symbol, the opposite of the newest one.
pub struct AlternationReversal;

impl PredictionRule for AlternationReversal {
    fn name(&self) -> &'static str {
        "alternation-reversal"
    }

    fn try_predict(&self, snapshot: &[CanonicalOutcome]) -> Option<CanonicalOutcome> {
        let w = snapshot.get(..ALTERNATION_WINDOW)?;
        if w.windows(2).all(|p| p[0] != p[1]) {
            Some(w[0].opposite())
        } else {
            None
        }
    }
}

/// Rule 3: symmetric run shapes over six outcomes.
///
/// Shape 2-1-2 (e.g. TTXTTX) and shape 3-2-3 (e.g. TTTXXT), both read
/// newest-first; either predicts the symbol of the leading run.
pub struct SymmetricRuns;

impl PredictionRule for SymmetricRuns {
    fn name(&self) -> &'static str {
        "symmetric-runs"
    }

    fn try_predict(&self, snapshot: &[CanonicalOutcome]) -> Option<CanonicalOutcome> {
        let w = snapshot.get(..SYMMETRIC_WINDOW)?;

        let shape_2_1_2 =
            w[0] == w[1] && w[1] != w[2] && w[3] == w[4] && w[3] == w[0] && w[5] == w[2];
        let shape_3_2_3 = w[0] == w[1]
            && w[1] == w[2]
            && w[3] == w[4]
            && w[2] != w[3]
            && w[4] != w[5]
            && w[5] == w[2];

        if shape_2_1_2 || shape_3_2_3 {
            Some(w[0])
        } else {
            None
        }
    }
}

/// Rule 4: two back-to-back streaks of length ≥ 2 inside an
/// eight-outcome window with at least four runs → predict a swing back
/// to the previous streak's symbol.
pub struct DoubleStreakReversal;

impl PredictionRule for DoubleStreakReversal {
    fn name(&self) -> &'static str {
        "double-streak-reversal"
    }

    fn try_predict(&self, snapshot: &[CanonicalOutcome]) -> Option<CanonicalOutcome> {
        let w = snapshot.get(..DOUBLE_STREAK_WINDOW)?;
        let runs = run_lengths(w);
        if runs.len() >= 4 && runs[0].1 >= 2 && runs[1].1 >= 2 {
            Some(runs[1].0)
        } else {
            None
        }
    }
}

/// Rule 5: exact match of the 13-symbol snapshot against a precomputed
/// table of historical snapshot → outcome mappings.
pub struct LookupTable {
    table: HashMap<String, CanonicalOutcome>,
}

impl LookupTable {
    pub fn new(table: HashMap<String, CanonicalOutcome>) -> Self {
        Self { table }
    }

    pub fn is_empty(&self) -> bool {
        self.table.is_empty()
    }
}

impl PredictionRule for LookupTable {
    fn name(&self) -> &'static str {
        "lookup-table"
    }

    fn try_predict(&self, snapshot: &[CanonicalOutcome]) -> Option<CanonicalOutcome> {
        let w = snapshot.get(..LOOKUP_WINDOW)?;
        self.table.get(&pattern_string(w)).copied()
    }
}

/// Rule 6: strict majority over the full trend window. Declines on an
/// exact tie or an empty window, leaving the decision to the chain's
/// uniform coin flip (the tie behavior the source engine had).
pub struct MajorityTrend {
    window: usize,
}

impl MajorityTrend {
    pub fn new(window: usize) -> Self {
        Self { window }
    }
}

impl PredictionRule for MajorityTrend {
    fn name(&self) -> &'static str {
        "majority-trend"
    }

    fn try_predict(&self, snapshot: &[CanonicalOutcome]) -> Option<CanonicalOutcome> {
        let w = &snapshot[..snapshot.len().min(self.window)];
        let tai = w.iter().filter(|&&o| o == CanonicalOutcome::Tai).count();
        let xiu = w.len() - tai;
        match tai.cmp(&xiu) {
            std::cmp::Ordering::Greater => Some(CanonicalOutcome::Tai),
            std::cmp::Ordering::Less => Some(CanonicalOutcome::Xiu),
            std::cmp::Ordering::Equal => None,
        }
    }
}
