//! Compiled exercise definition types.
//!
//! These are the validated, load-time-normalized forms the evaluator works
//! against. The raw authored documents live in [`crate::deserialize`]; the
//! compilation step between the two is where every invariant is enforced,
//! so nothing here needs re-checking at grading time.

use kubedrill_core::{CommandIntent, NormalizedSpec, PathPattern};

/// Discrepancy categories a hint template may target. Kept in sync with
/// the matcher's discrepancy kinds.
pub const HINT_CATEGORIES: &[&str] = &[
    "missing",
    "unexpected",
    "value-mismatch",
    "type-mismatch",
    "forbidden",
];

/// The authored exercise format.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExerciseKind {
    Manifest,
    Command,
    MultiStep,
}

impl ExerciseKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ExerciseKind::Manifest => "manifest",
            ExerciseKind::Command => "command",
            ExerciseKind::MultiStep => "multi-step",
        }
    }
}

/// What one step of an exercise grades.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StepMode {
    Manifest,
    Command,
}

/// How strictly a path is held against the expected answer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Requirement {
    /// Discrepancies here are blocking.
    Required,
    /// Discrepancies here are advisory.
    Optional,
    /// The path must not appear at all; presence is blocking.
    Forbidden,
}

/// One authored match rule: a path pattern, how strictly it is held, and
/// an optional partial-credit group label.
#[derive(Debug, Clone)]
pub struct MatchRule {
    pub pattern: PathPattern,
    pub requirement: Requirement,
    pub group: Option<String>,
}

/// The expected answer of one criterion, pre-normalized at load time.
#[derive(Debug, Clone)]
pub enum Expected {
    Manifest(NormalizedSpec),
    Command(CommandIntent),
}

/// One authored "correct answer" (or family of equivalent answers) plus
/// its match rules.
#[derive(Debug, Clone)]
pub struct AcceptanceCriterion {
    pub id: String,
    pub expected: Expected,
    pub rules: Vec<MatchRule>,
}

/// What a hint template is keyed by.
#[derive(Debug, Clone)]
pub enum HintKey {
    /// Matches discrepancies whose path the pattern covers.
    Path(PathPattern),
    /// Matches discrepancies of one category (see [`HINT_CATEGORIES`]).
    Category(String),
}

/// An authored hint fragment. `{path}` in the text is replaced with the
/// discrepancy's field path when the hint is composed.
#[derive(Debug, Clone)]
pub struct HintTemplate {
    pub key: HintKey,
    pub text: String,
}

/// One gradable step. Single-submission exercises compile to exactly one.
#[derive(Debug, Clone)]
pub struct ExerciseStep {
    pub id: String,
    pub mode: StepMode,
    pub criteria: Vec<AcceptanceCriterion>,
}

/// A validated, immutable exercise definition.
#[derive(Debug, Clone)]
pub struct ExerciseDefinition {
    pub id: String,
    pub kind: ExerciseKind,
    pub steps: Vec<ExerciseStep>,
    pub hints: Vec<HintTemplate>,
    pub difficulty: Option<String>,
    /// When set, feedback may include expected values, trading rigor for
    /// guidance on warmup exercises.
    pub reveal_on_fail: bool,
    /// Cap on feedback items per attempt; the runner's default applies
    /// when unset.
    pub max_feedback: Option<usize>,
}

impl ExerciseDefinition {
    /// The step to grade for a submission: the named one, or the first.
    pub fn step(&self, step_id: Option<&str>) -> Option<&ExerciseStep> {
        match step_id {
            Some(id) => self.steps.iter().find(|step| step.id == id),
            None => self.steps.first(),
        }
    }
}
