//! Per-submission grading orchestration.
//!
//! One [`Grader`] wraps one immutable [`ExerciseSet`] snapshot. Each
//! `grade` call walks the request state machine
//! `Received -> Parsed -> Matched -> Composed -> Returned`, short-circuiting
//! to `ParseFailed -> Returned` when the learner's input doesn't parse --
//! that path is still a successful grading call, with the parse problem
//! surfaced as a syntax hint. Only operational problems (unknown exercise,
//! blown budget after the retry) return a [`GradeError`].

use crate::error::GradeError;
use crate::response::GradeResponse;
use kubedrill_core::{normalize_within, parse_command_within, Budget, DeadlineExceeded, Interrupt};
use kubedrill_eval::{compose, evaluate, Submitted, Verdict};
use kubedrill_exercise::{ExerciseDefinition, ExerciseSet, ExerciseStep, StepMode};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use time::OffsetDateTime;
use tracing::{debug, error, warn};

/// One learner attempt, as delivered by the exercise widget.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Submission {
    pub exercise_id: String,
    /// Step to grade within a multi-step exercise; the first step when
    /// unset.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub step_id: Option<String>,
    /// Raw UTF-8 submission text: a YAML document or a command line.
    pub raw: String,
    #[serde(with = "time::serde::rfc3339")]
    pub submitted_at: OffsetDateTime,
}

impl Submission {
    pub fn new(exercise_id: impl Into<String>, raw: impl Into<String>) -> Self {
        Submission {
            exercise_id: exercise_id.into(),
            step_id: None,
            raw: raw.into(),
            submitted_at: OffsetDateTime::now_utc(),
        }
    }
}

/// Request phases, logged at debug for per-submission tracing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Phase {
    Received,
    Parsed,
    ParseFailed,
    Matched,
    Composed,
    Returned,
}

impl Phase {
    fn as_str(&self) -> &'static str {
        match self {
            Phase::Received => "received",
            Phase::Parsed => "parsed",
            Phase::ParseFailed => "parse_failed",
            Phase::Matched => "matched",
            Phase::Composed => "composed",
            Phase::Returned => "returned",
        }
    }
}

/// Tunables for one grader instance.
#[derive(Debug, Clone, Copy)]
pub struct GradeOptions {
    /// Wall-clock ceiling per grading attempt. All components are pure
    /// and synchronous, so this only trips on pathological inputs.
    pub budget: Duration,
    /// Retry once on a blown budget before surfacing a timeout.
    pub retry_on_timeout: bool,
}

impl Default for GradeOptions {
    fn default() -> Self {
        GradeOptions {
            budget: Duration::from_millis(200),
            retry_on_timeout: true,
        }
    }
}

/// Stateless grading engine over an immutable definition snapshot.
/// Shareable across threads; every call is independent.
#[derive(Debug, Clone)]
pub struct Grader {
    exercises: ExerciseSet,
    options: GradeOptions,
}

impl Grader {
    pub fn new(exercises: ExerciseSet) -> Self {
        Grader {
            exercises,
            options: GradeOptions::default(),
        }
    }

    pub fn with_options(exercises: ExerciseSet, options: GradeOptions) -> Self {
        Grader { exercises, options }
    }

    /// Load a grader straight from a `---`-separated YAML definitions
    /// stream.
    pub fn from_yaml(src: &str) -> Result<Self, GradeError> {
        let exercises = ExerciseSet::from_yaml(src).map_err(|e| {
            error!(error = %e, "rejecting invalid definitions snapshot");
            e
        })?;
        Ok(Grader::new(exercises))
    }

    /// Load a grader from a JSON definitions document.
    pub fn from_json(src: &str) -> Result<Self, GradeError> {
        let exercises = ExerciseSet::from_json(src).map_err(|e| {
            error!(error = %e, "rejecting invalid definitions snapshot");
            e
        })?;
        Ok(Grader::new(exercises))
    }

    pub fn exercises(&self) -> &ExerciseSet {
        &self.exercises
    }

    /// Grade a raw submission against an exercise's first (or only) step.
    pub fn grade(&self, exercise_id: &str, raw: &str) -> Result<GradeResponse, GradeError> {
        self.grade_step(exercise_id, None, raw)
    }

    /// Grade one named step of an exercise. Grading is single-submission
    /// scoped: no state is carried between steps.
    pub fn grade_step(
        &self,
        exercise_id: &str,
        step_id: Option<&str>,
        raw: &str,
    ) -> Result<GradeResponse, GradeError> {
        let exercise = self.exercises.get(exercise_id).ok_or_else(|| {
            warn!(exercise = %exercise_id, "grading request for unknown exercise");
            GradeError::UnknownExercise {
                id: exercise_id.to_string(),
            }
        })?;
        let step = exercise.step(step_id).ok_or_else(|| GradeError::UnknownStep {
            exercise: exercise_id.to_string(),
            step: step_id.unwrap_or_default().to_string(),
        })?;

        match self.attempt(exercise, step, raw) {
            Ok(response) => Ok(response),
            Err(DeadlineExceeded) if self.options.retry_on_timeout => {
                warn!(exercise = %exercise_id, "grading attempt blew its budget, retrying once");
                match self.attempt(exercise, step, raw) {
                    Ok(response) => Ok(response),
                    Err(DeadlineExceeded) => Err(GradeError::Timeout { attempts: 2 }),
                }
            }
            Err(DeadlineExceeded) => Err(GradeError::Timeout { attempts: 1 }),
        }
    }

    /// Grade a [`Submission`] envelope.
    pub fn grade_submission(&self, submission: &Submission) -> Result<GradeResponse, GradeError> {
        self.grade_step(
            &submission.exercise_id,
            submission.step_id.as_deref(),
            &submission.raw,
        )
    }

    /// One budgeted pass through the state machine.
    fn attempt(
        &self,
        exercise: &ExerciseDefinition,
        step: &ExerciseStep,
        raw: &str,
    ) -> Result<GradeResponse, DeadlineExceeded> {
        let budget = Budget::with_limit(self.options.budget);
        self.trace(exercise, Phase::Received);

        let submitted = match step.mode {
            StepMode::Manifest => normalize_within(&budget, raw).map(Submitted::Manifest),
            StepMode::Command => parse_command_within(&budget, raw).map(Submitted::Command),
        };
        let submitted = match submitted {
            Ok(parsed) => {
                self.trace(exercise, Phase::Parsed);
                parsed
            }
            Err(Interrupt::Parse(parse_error)) => {
                self.trace(exercise, Phase::ParseFailed);
                self.trace(exercise, Phase::Returned);
                return Ok(GradeResponse {
                    verdict: Verdict::Fail,
                    score: 0.0,
                    feedback: vec![parse_error.to_hint()],
                });
            }
            Err(Interrupt::Deadline(deadline)) => return Err(deadline),
        };

        let result = evaluate(&budget, &submitted, &step.criteria)?;
        self.trace(exercise, Phase::Matched);

        let feedback = compose(&result, exercise);
        self.trace(exercise, Phase::Composed);

        let response = GradeResponse {
            verdict: result.verdict,
            score: result.score,
            feedback,
        };
        self.trace(exercise, Phase::Returned);
        Ok(response)
    }

    fn trace(&self, exercise: &ExerciseDefinition, phase: Phase) {
        debug!(exercise = %exercise.id, phase = phase.as_str(), "grading phase");
    }
}
