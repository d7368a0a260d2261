//! Verdicts, discrepancies, and the match result.
//!
//! These types are DISTINCT from the exercise definition types: the
//! matcher consumes pre-validated criteria and produces a [`MatchResult`],
//! the only thing the feedback composer and the runner ever see.

use kubedrill_core::FieldPath;
use serde::Serialize;
use std::fmt;

/// The grading outcome for one submission against one exercise step.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Verdict {
    Pass,
    Fail,
    Partial,
}

impl Verdict {
    pub fn as_str(&self) -> &'static str {
        match self {
            Verdict::Pass => "pass",
            Verdict::Fail => "fail",
            Verdict::Partial => "partial",
        }
    }

    /// Ranking used when picking the best candidate criterion.
    pub(crate) fn rank(&self) -> u8 {
        match self {
            Verdict::Pass => 2,
            Verdict::Partial => 1,
            Verdict::Fail => 0,
        }
    }
}

impl fmt::Display for Verdict {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// How much a discrepancy weighs on the verdict.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    /// Alone forces a `fail` verdict, regardless of score.
    Blocking,
    /// Lowers score but cannot fail the submission by itself.
    Advisory,
}

/// What went wrong at one path.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum DiscrepancyKind {
    /// An expected field is absent from the submission.
    Missing,
    /// The submission has a field the expected answer does not.
    Unexpected,
    /// Same YAML type, different value.
    ValueMismatch,
    /// The value's YAML type contradicts the expected type.
    TypeMismatch,
    /// A field the exercise explicitly forbids is present.
    Forbidden,
}

impl DiscrepancyKind {
    /// The hint-template category name for this kind. Kept in sync with
    /// `kubedrill_exercise::HINT_CATEGORIES`.
    pub fn category(&self) -> &'static str {
        match self {
            DiscrepancyKind::Missing => "missing",
            DiscrepancyKind::Unexpected => "unexpected",
            DiscrepancyKind::ValueMismatch => "value-mismatch",
            DiscrepancyKind::TypeMismatch => "type-mismatch",
            DiscrepancyKind::Forbidden => "forbidden",
        }
    }
}

/// One field-level difference between submission and expected answer.
#[derive(Debug, Clone, Serialize)]
pub struct FieldDiscrepancy {
    pub path: FieldPath,
    pub kind: DiscrepancyKind,
    pub severity: Severity,
    /// Expected type or shape ("string", "mapping"). Safe to show.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub expected_shape: Option<String>,
    /// Expected value rendering. Only surfaced on reveal-on-fail exercises.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub expected_value: Option<String>,
    /// Submitted value rendering, when one exists at the path.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub actual: Option<String>,
    /// Partial-credit group of the governing match rule, if any.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub group: Option<String>,
}

/// Output of the matcher: verdict, score in [0, 1], and the ordered
/// discrepancy list (blocking first, then by path).
#[derive(Debug, Clone, Serialize)]
pub struct MatchResult {
    pub verdict: Verdict,
    pub score: f64,
    pub discrepancies: Vec<FieldDiscrepancy>,
    /// Which acceptance criterion the submission was graded against.
    pub criterion_id: String,
}

impl MatchResult {
    pub fn blocking_count(&self) -> usize {
        self.discrepancies
            .iter()
            .filter(|d| d.severity == Severity::Blocking)
            .count()
    }

    pub fn advisory_count(&self) -> usize {
        self.discrepancies
            .iter()
            .filter(|d| d.severity == Severity::Advisory)
            .count()
    }
}
