//! kubedrill-exercise: authored exercise definitions.
//!
//! An [`ExerciseDefinition`] is immutable course content: one or more
//! acceptance criteria (pre-normalized at load time), match rules
//! classifying paths, and hint templates for the feedback composer. The
//! engine only ever consumes a validated definition -- everything invalid
//! is rejected at load with a [`DefinitionError`], which is an operational
//! failure, never learner feedback.
//!
//! Definitions are deployed as an immutable [`ExerciseSet`] snapshot,
//! loaded once and shared read-only across concurrent grading calls.

pub mod deserialize;
pub mod error;
pub mod store;
pub mod types;

pub use deserialize::{parse_json_definitions, parse_yaml_definitions};
pub use error::DefinitionError;
pub use store::ExerciseSet;
pub use types::{
    AcceptanceCriterion, ExerciseDefinition, ExerciseKind, ExerciseStep, Expected, HintKey,
    HintTemplate, MatchRule, Requirement, StepMode,
};
