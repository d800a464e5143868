//! Unit tests for the prediction engine

use super::*;
use crate::config::EngineConfig;
use crate::types::RawResult;
use chrono::TimeZone;

fn rec(session_id: u64, label: Option<&str>) -> RoundRecord {
    RoundRecord {
        session_id,
        result: label.map(|l| RawResult::Label(l.to_string())),
        total: None,
        dice_1: None,
        dice_2: None,
        dice_3: None,
    }
}

fn engine() -> PredictionEngine {
    PredictionEngine::with_rng(EngineConfig::default(), StdRng::seed_from_u64(99)).unwrap()
}

fn at(day: u32, hour: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2026, 3, day, hour, 0, 0).unwrap()
}

/// Newest-first history ending in a Tài streak, so the streak rule
/// deterministically predicts Tài for the next session.
fn streak_history(newest_session: u64) -> Vec<RoundRecord> {
    vec![
        rec(newest_session, Some("Tài")),
        rec(newest_session - 1, Some("Tài")),
        rec(newest_session - 2, Some("Tài")),
        rec(newest_session - 3, Some("Xỉu")),
        rec(newest_session - 4, Some("Xỉu")),
    ]
}

#[test]
fn empty_history_yields_pending_without_mutation() {
    let engine = engine();
    let r = engine.run_cycle_at(&[], at(10, 9));

    assert_eq!(r.prediction, PENDING);
    assert_eq!(r.predicted_session, None);
    assert_eq!(r.stats.total, 0);
    assert!(engine.stats_at(at(10, 9)).cache.is_none());
}

#[test]
fn repeated_polls_return_the_identical_prediction() {
    let engine = engine();
    let history = streak_history(100);

    let first = engine.run_cycle_at(&history, at(10, 9));
    let second = engine.run_cycle_at(&history, at(10, 10));

    assert_eq!(first.predicted_session, Some(101));
    assert_eq!(first.prediction, "Tài");
    assert_eq!(first.rule.as_deref(), Some("streak-continuation"));
    assert!(!first.cached);

    assert_eq!(second.prediction, first.prediction);
    assert_eq!(second.confidence, first.confidence);
    assert_eq!(second.predicted_session, first.predicted_session);
    assert!(second.cached);

    // one prediction, one ledger entry, however many polls
    assert_eq!(second.stats.total, 1);
}

#[test]
fn confidence_is_a_percentage_in_the_configured_range() {
    let engine = engine();
    let r = engine.run_cycle_at(&streak_history(100), at(10, 9));

    let pct: f64 = r
        .confidence
        .strip_suffix('%')
        .expect("percent suffix")
        .parse()
        .expect("numeric confidence");
    assert!((50.0..=90.0).contains(&pct), "confidence {}", pct);
}

#[test]
fn correct_resolution_is_accounted_exactly_once() {
    let engine = engine();
    let now = at(10, 9);

    // predicts Tài for session 101
    engine.run_cycle_at(&streak_history(100), now);

    // session 101 resolves as Tài; observed across three polls
    let mut resolved = vec![rec(101, Some("Tài"))];
    resolved.extend(streak_history(100));
    let mut last = None;
    for _ in 0..3 {
        last = Some(engine.run_cycle_at(&resolved, now));
    }

    let r = last.unwrap();
    assert_eq!(r.stats.correct, 1);
    assert_eq!(r.stats.incorrect, 0);
    // one prediction for 101, one for 102
    assert_eq!(r.stats.total, 2);
    assert_eq!(r.predicted_session, Some(102));
}

#[test]
fn wrong_resolution_increments_incorrect() {
    let engine = engine();
    let now = at(10, 9);

    engine.run_cycle_at(&streak_history(100), now);

    let mut resolved = vec![rec(101, Some("Xỉu"))];
    resolved.extend(streak_history(100));
    let r = engine.run_cycle_at(&resolved, now);

    assert_eq!(r.stats.correct, 0);
    assert_eq!(r.stats.incorrect, 1);
}

#[test]
fn unclassifiable_resolution_never_touches_the_ledger() {
    let engine = engine();
    let now = at(10, 9);

    engine.run_cycle_at(&streak_history(100), now);

    // session 101 appears but carries no usable outcome
    let mut resolved = vec![rec(101, None)];
    resolved.extend(streak_history(100));
    let r = engine.run_cycle_at(&resolved, now);

    assert_eq!(r.stats.correct + r.stats.incorrect, 0);
    // a new prediction for 102 was still made
    assert_eq!(r.stats.total, 2);
}

#[test]
fn stale_session_ids_do_not_reconcile() {
    let engine = engine();
    let now = at(10, 9);

    engine.run_cycle_at(&streak_history(100), now);
    // same newest session again: cache hit, no accounting
    let r = engine.run_cycle_at(&streak_history(100), now);

    assert_eq!(r.stats.correct + r.stats.incorrect, 0);
    assert!(r.cached);
}

#[test]
fn day_boundary_resets_ledger_and_cache() {
    let engine = engine();
    let history = streak_history(100);

    let day1 = engine.run_cycle_at(&history, at(10, 9));
    assert_eq!(day1.stats.total, 1);

    // next VN calendar day: counters zeroed, slot recomputed fresh
    let day2 = engine.run_cycle_at(&history, at(11, 9));
    assert_eq!(day2.stats.date, vn_date(at(11, 9)));
    assert_eq!(day2.stats.total, 1);
    assert_eq!(day2.stats.correct, 0);
    assert_eq!(day2.stats.incorrect, 0);
    assert!(!day2.cached);
}

#[test]
fn day_boundary_is_the_vn_date_not_utc() {
    let engine = engine();
    let history = streak_history(100);

    // 16:30 UTC = 23:30 VN
    engine.run_cycle_at(&history, at(10, 16) + chrono::Duration::minutes(30));
    // 17:30 UTC = 00:30 VN the next day -> reset despite same UTC date
    let r = engine.run_cycle_at(&history, at(10, 17) + chrono::Duration::minutes(30));

    assert_eq!(r.stats.date, vn_date(at(11, 9)));
    assert!(!r.cached);
}

#[test]
fn stats_query_is_read_only() {
    let engine = engine();
    let now = at(10, 9);

    engine.run_cycle_at(&streak_history(100), now);
    let s1 = engine.stats_at(now);
    let s2 = engine.stats_at(now);

    assert_eq!(s1.stats, s2.stats);
    assert_eq!(s1.stats.total, 1);
    let cache = s1.cache.expect("slot filled");
    assert_eq!(cache.target_session, 101);
    assert!(!cache.accounted);
}

#[test]
fn degraded_response_leaves_state_untouched() {
    let engine = engine();
    let now = at(10, 9);

    engine.run_cycle_at(&streak_history(100), now);
    let degraded = engine.degraded_response_at("upstream timed out", now);

    assert!(degraded.error.is_some());
    assert!(degraded.prediction == "Tài" || degraded.prediction == "Xỉu");
    assert_eq!(degraded.stats.total, 1);

    // confidence drawn from the bottom of the range
    let pct: f64 = degraded
        .confidence
        .strip_suffix('%')
        .unwrap()
        .parse()
        .unwrap();
    assert!((50.0..=54.0).contains(&pct), "confidence {}", pct);

    // the cached prediction survived the failed poll
    let r = engine.run_cycle_at(&streak_history(100), now);
    assert!(r.cached);
    assert_eq!(r.stats.total, 1);
}
