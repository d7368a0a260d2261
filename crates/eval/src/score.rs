//! Scoring and verdict derivation.
//!
//! `score = 1 - (blocking * W_B + advisory * W_A) / max_penalty`, clamped
//! to [0, 1], with the blocking weight far above the advisory weight so
//! advisory correctness can never buy back a blocking mistake. The
//! verdict never depends on the score: `pass` requires zero blocking
//! discrepancies, full stop.

use crate::types::{FieldDiscrepancy, MatchResult, Severity, Verdict};
use kubedrill_exercise::MatchRule;
use std::collections::BTreeSet;

pub const BLOCKING_WEIGHT: f64 = 4.0;
pub const ADVISORY_WEIGHT: f64 = 1.0;

/// Fold a discrepancy list into a [`MatchResult`] for one criterion.
/// `leaf_count` is the number of fields the expected answer pins down.
pub fn assess(
    criterion_id: &str,
    leaf_count: usize,
    discrepancies: Vec<FieldDiscrepancy>,
    match_rules: &[MatchRule],
) -> MatchResult {
    let blocking = discrepancies
        .iter()
        .filter(|d| d.severity == Severity::Blocking)
        .count();
    let advisory = discrepancies.len() - blocking;

    let max_penalty = BLOCKING_WEIGHT * leaf_count.max(1) as f64;
    let penalty = BLOCKING_WEIGHT * blocking as f64 + ADVISORY_WEIGHT * advisory as f64;
    let score = (1.0 - penalty / max_penalty).clamp(0.0, 1.0);

    let verdict = if blocking == 0 {
        Verdict::Pass
    } else if partial_credit(&discrepancies, match_rules) {
        Verdict::Partial
    } else {
        Verdict::Fail
    };

    MatchResult {
        verdict,
        score,
        discrepancies,
        criterion_id: criterion_id.to_string(),
    }
}

/// Partial credit requires at least one declared rule group with no
/// blocking discrepancy, and every blocking discrepancy confined to some
/// group -- a blocking mistake outside all groups fails outright.
fn partial_credit(discrepancies: &[FieldDiscrepancy], match_rules: &[MatchRule]) -> bool {
    let declared: BTreeSet<&str> = match_rules
        .iter()
        .filter_map(|rule| rule.group.as_deref())
        .collect();
    if declared.is_empty() {
        return false;
    }

    let blocking: Vec<&FieldDiscrepancy> = discrepancies
        .iter()
        .filter(|d| d.severity == Severity::Blocking)
        .collect();
    if blocking.iter().any(|d| d.group.is_none()) {
        return false;
    }

    declared
        .iter()
        .any(|group| !blocking.iter().any(|d| d.group.as_deref() == Some(group)))
}
