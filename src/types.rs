//! Core types: round records from the upstream feed and the canonical
//! two-valued outcome, plus the normalization rules between them.

use serde::{Deserialize, Deserializer, Serialize};

/// Dice sums at or above this threshold resolve as Tài.
pub const TAI_THRESHOLD: u32 = 11;

/// Canonical resolution of a round: Tài (high sum) or Xỉu (low sum).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CanonicalOutcome {
    #[serde(rename = "Tài")]
    Tai,
    #[serde(rename = "Xỉu")]
    Xiu,
}

impl CanonicalOutcome {
    /// External display label
    pub fn label(&self) -> &'static str {
        match self {
            CanonicalOutcome::Tai => "Tài",
            CanonicalOutcome::Xiu => "Xỉu",
        }
    }

    /// Single-letter symbol used in pattern strings
    pub fn symbol(&self) -> char {
        match self {
            CanonicalOutcome::Tai => 'T',
            CanonicalOutcome::Xiu => 'X',
        }
    }

    pub fn opposite(&self) -> Self {
        match self {
            CanonicalOutcome::Tai => CanonicalOutcome::Xiu,
            CanonicalOutcome::Xiu => CanonicalOutcome::Tai,
        }
    }

    pub fn from_symbol(c: char) -> Option<Self> {
        match c.to_ascii_uppercase() {
            'T' => Some(CanonicalOutcome::Tai),
            'X' => Some(CanonicalOutcome::Xiu),
            _ => None,
        }
    }

    /// Parse a textual outcome label. Case-insensitive and tolerant of
    /// missing diacritics ("tai", "TÀI", "t" all resolve to Tài).
    pub fn from_text(raw: &str) -> Option<Self> {
        let s = raw.trim().to_lowercase();
        if s.is_empty() {
            return None;
        }
        if s == "tài" || s == "tai" || s.starts_with('t') {
            return Some(CanonicalOutcome::Tai);
        }
        if s == "xỉu" || s == "xiu" || s.starts_with('x') {
            return Some(CanonicalOutcome::Xiu);
        }
        None
    }

    /// Classify a dice sum by the fixed high/low threshold.
    pub fn from_sum(sum: u32) -> Self {
        if sum >= TAI_THRESHOLD {
            CanonicalOutcome::Tai
        } else {
            CanonicalOutcome::Xiu
        }
    }
}

/// Raw outcome field as reported by the feed. Some feed revisions send
/// the label, others send only the dice sum.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum RawResult {
    Sum(u32),
    Label(String),
}

/// One resolved round as fetched from the upstream history feed.
///
/// Field names differ across feed revisions (`Phien` vs `phien`, label
/// vs dice sum), so everything but the session id is optional and the
/// normalizer decides what is usable.
#[derive(Debug, Clone, Deserialize)]
pub struct RoundRecord {
    #[serde(
        alias = "Phien",
        alias = "phien",
        alias = "session",
        deserialize_with = "de_session_id"
    )]
    pub session_id: u64,

    #[serde(default, alias = "Ket_qua", alias = "ket_qua")]
    pub result: Option<RawResult>,

    #[serde(default, alias = "Tong", alias = "tong")]
    pub total: Option<u32>,

    #[serde(default, alias = "Xuc_xac_1", alias = "xuc_xac_1")]
    pub dice_1: Option<u32>,
    #[serde(default, alias = "Xuc_xac_2", alias = "xuc_xac_2")]
    pub dice_2: Option<u32>,
    #[serde(default, alias = "Xuc_xac_3", alias = "xuc_xac_3")]
    pub dice_3: Option<u32>,
}

impl RoundRecord {
    /// Normalize this record to a canonical outcome.
    ///
    /// Rules in order: textual label match, numeric label classified by
    /// the sum threshold, precomputed total, sum of the three dice.
    /// Returns `None` when nothing usable is present; absence is a
    /// value here, never a fault.
    pub fn outcome(&self) -> Option<CanonicalOutcome> {
        match &self.result {
            Some(RawResult::Label(s)) => {
                if let Some(o) = CanonicalOutcome::from_text(s) {
                    return Some(o);
                }
                if let Ok(n) = s.trim().parse::<u32>() {
                    return Some(CanonicalOutcome::from_sum(n));
                }
            }
            Some(RawResult::Sum(n)) => return Some(CanonicalOutcome::from_sum(*n)),
            None => {}
        }
        if let Some(t) = self.total {
            return Some(CanonicalOutcome::from_sum(t));
        }
        if let (Some(a), Some(b), Some(c)) = (self.dice_1, self.dice_2, self.dice_3) {
            // garbage dice values must stay unknown, not wrap or panic
            return a
                .checked_add(b)
                .and_then(|s| s.checked_add(c))
                .map(CanonicalOutcome::from_sum);
        }
        None
    }
}

/// The feed reports session ids either as JSON numbers or as numeric
/// strings depending on revision.
fn de_session_id<'de, D>(deserializer: D) -> Result<u64, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum IdRepr {
        Num(u64),
        Text(String),
    }

    match IdRepr::deserialize(deserializer)? {
        IdRepr::Num(n) => Ok(n),
        IdRepr::Text(s) => s
            .trim()
            .parse::<u64>()
            .map_err(|e| serde::de::Error::custom(format!("bad session id {:?}: {}", s, e))),
    }
}
