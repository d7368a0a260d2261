//! Raw authored documents and their compilation into validated types.
//!
//! Content tooling authors exercises as YAML (one document per exercise,
//! `---`-separated) or JSON (an array). The raw structs here mirror that
//! authored shape exactly; [`compile`] turns one raw exercise into a
//! validated [`ExerciseDefinition`], normalizing every expected answer
//! through the same pipeline learner submissions go through.

use crate::error::DefinitionError;
use crate::types::{
    AcceptanceCriterion, ExerciseDefinition, ExerciseKind, ExerciseStep, Expected, HintKey,
    HintTemplate, MatchRule, Requirement, StepMode, HINT_CATEGORIES,
};
use kubedrill_core::{normalize, parse_command, PathPattern};
use serde::Deserialize;

// ── Raw authored shapes ──────────────────────────────────────────────

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RawExercise {
    pub id: String,
    pub kind: String,
    #[serde(default)]
    pub difficulty: Option<String>,
    #[serde(default)]
    pub reveal_on_fail: bool,
    #[serde(default)]
    pub max_feedback: Option<usize>,
    #[serde(default)]
    pub criteria: Vec<RawCriterion>,
    #[serde(default)]
    pub steps: Vec<RawStep>,
    #[serde(default)]
    pub hints: Vec<RawHint>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RawStep {
    pub id: String,
    pub kind: String,
    #[serde(default)]
    pub criteria: Vec<RawCriterion>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RawCriterion {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub manifest: Option<String>,
    #[serde(default)]
    pub command: Option<String>,
    #[serde(default)]
    pub rules: Vec<RawRule>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RawRule {
    pub path: String,
    #[serde(default = "default_require")]
    pub require: String,
    #[serde(default)]
    pub group: Option<String>,
}

fn default_require() -> String {
    "required".to_string()
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RawHint {
    #[serde(default)]
    pub path: Option<String>,
    #[serde(default)]
    pub category: Option<String>,
    pub text: String,
}

// ── Parsing entry points ─────────────────────────────────────────────

/// Parse a `---`-separated YAML stream of exercise documents.
pub fn parse_yaml_definitions(src: &str) -> Result<Vec<ExerciseDefinition>, DefinitionError> {
    let mut out = Vec::new();
    for document in serde_yaml::Deserializer::from_str(src) {
        let raw = RawExercise::deserialize(document).map_err(|e| DefinitionError::Document {
            message: e.to_string(),
        })?;
        out.push(compile(raw)?);
    }
    Ok(out)
}

/// Parse a JSON array of exercise documents (or a single object).
pub fn parse_json_definitions(src: &str) -> Result<Vec<ExerciseDefinition>, DefinitionError> {
    let raws: Vec<RawExercise> = match serde_json::from_str::<Vec<RawExercise>>(src) {
        Ok(list) => list,
        Err(_) => {
            let single: RawExercise =
                serde_json::from_str(src).map_err(|e| DefinitionError::Document {
                    message: e.to_string(),
                })?;
            vec![single]
        }
    };
    raws.into_iter().map(compile).collect()
}

// ── Compilation ──────────────────────────────────────────────────────

/// Validate one raw exercise and normalize its expected answers.
pub fn compile(raw: RawExercise) -> Result<ExerciseDefinition, DefinitionError> {
    let exercise_id = raw.id.clone();
    let kind = match raw.kind.as_str() {
        "manifest" => ExerciseKind::Manifest,
        "command" => ExerciseKind::Command,
        "multi-step" => ExerciseKind::MultiStep,
        other => {
            return Err(DefinitionError::BadStructure {
                exercise: exercise_id,
                message: format!("unknown exercise kind '{}'", other),
            })
        }
    };

    let steps = match kind {
        ExerciseKind::Manifest | ExerciseKind::Command => {
            if !raw.steps.is_empty() {
                return Err(DefinitionError::BadStructure {
                    exercise: exercise_id,
                    message: format!("a {} exercise must not declare steps", kind.as_str()),
                });
            }
            let mode = match kind {
                ExerciseKind::Manifest => StepMode::Manifest,
                _ => StepMode::Command,
            };
            vec![compile_step(&exercise_id, "main", mode, raw.criteria)?]
        }
        ExerciseKind::MultiStep => {
            if !raw.criteria.is_empty() {
                return Err(DefinitionError::BadStructure {
                    exercise: exercise_id,
                    message: "a multi-step exercise declares criteria per step".to_string(),
                });
            }
            if raw.steps.is_empty() {
                return Err(DefinitionError::BadStructure {
                    exercise: exercise_id,
                    message: "a multi-step exercise needs at least one step".to_string(),
                });
            }
            let mut steps = Vec::new();
            for step in raw.steps {
                if steps.iter().any(|s: &ExerciseStep| s.id == step.id) {
                    return Err(DefinitionError::BadStructure {
                        exercise: exercise_id,
                        message: format!("duplicate step id '{}'", step.id),
                    });
                }
                let mode = match step.kind.as_str() {
                    "manifest" => StepMode::Manifest,
                    "command" => StepMode::Command,
                    other => {
                        return Err(DefinitionError::BadStructure {
                            exercise: exercise_id,
                            message: format!("unknown step kind '{}'", other),
                        })
                    }
                };
                steps.push(compile_step(&exercise_id, &step.id, mode, step.criteria)?);
            }
            steps
        }
    };

    let mut hints = Vec::new();
    for hint in raw.hints {
        hints.push(compile_hint(&exercise_id, hint)?);
    }

    Ok(ExerciseDefinition {
        id: raw.id,
        kind,
        steps,
        hints,
        difficulty: raw.difficulty,
        reveal_on_fail: raw.reveal_on_fail,
        max_feedback: raw.max_feedback,
    })
}

fn compile_step(
    exercise: &str,
    step_id: &str,
    mode: StepMode,
    raw_criteria: Vec<RawCriterion>,
) -> Result<ExerciseStep, DefinitionError> {
    if raw_criteria.is_empty() {
        return Err(DefinitionError::EmptyCriteria {
            exercise: exercise.to_string(),
        });
    }
    let mut criteria: Vec<AcceptanceCriterion> = Vec::new();
    for (index, raw) in raw_criteria.into_iter().enumerate() {
        let criterion = compile_criterion(exercise, mode, index, raw)?;
        if criteria.iter().any(|c| c.id == criterion.id) {
            return Err(DefinitionError::DuplicateCriterion {
                exercise: exercise.to_string(),
                criterion: criterion.id,
            });
        }
        criteria.push(criterion);
    }
    Ok(ExerciseStep {
        id: step_id.to_string(),
        mode,
        criteria,
    })
}

fn compile_criterion(
    exercise: &str,
    mode: StepMode,
    index: usize,
    raw: RawCriterion,
) -> Result<AcceptanceCriterion, DefinitionError> {
    let id = raw.id.unwrap_or_else(|| format!("option-{}", index + 1));

    let expected = match (mode, raw.manifest, raw.command) {
        (StepMode::Manifest, Some(manifest), None) => {
            let spec = normalize(&manifest).map_err(|e| DefinitionError::InvalidExpected {
                exercise: exercise.to_string(),
                criterion: id.clone(),
                message: e.to_string(),
            })?;
            if !spec.violations.is_empty() {
                return Err(DefinitionError::InvalidExpected {
                    exercise: exercise.to_string(),
                    criterion: id,
                    message: format!(
                        "authored answer has schema type violations at {}",
                        spec.violations
                            .iter()
                            .map(|v| v.path.to_string())
                            .collect::<Vec<_>>()
                            .join(", ")
                    ),
                });
            }
            Expected::Manifest(spec)
        }
        (StepMode::Command, Some(_), _) | (StepMode::Command, None, None) => {
            return Err(DefinitionError::WrongExpectedKind {
                exercise: exercise.to_string(),
                criterion: id,
                expected: "command",
            })
        }
        (StepMode::Manifest, _, Some(_)) | (StepMode::Manifest, None, None) => {
            return Err(DefinitionError::WrongExpectedKind {
                exercise: exercise.to_string(),
                criterion: id,
                expected: "manifest",
            })
        }
        (StepMode::Command, None, Some(command)) => {
            let intent = parse_command(&command).map_err(|e| DefinitionError::InvalidExpected {
                exercise: exercise.to_string(),
                criterion: id.clone(),
                message: e.to_string(),
            })?;
            Expected::Command(intent)
        }
    };

    let mut rules = Vec::new();
    for raw_rule in raw.rules {
        let pattern =
            PathPattern::parse(&raw_rule.path).map_err(|e| DefinitionError::InvalidPattern {
                exercise: exercise.to_string(),
                message: e.to_string(),
            })?;
        let requirement = match raw_rule.require.as_str() {
            "required" => Requirement::Required,
            "optional" => Requirement::Optional,
            "forbidden" => Requirement::Forbidden,
            other => {
                return Err(DefinitionError::BadStructure {
                    exercise: exercise.to_string(),
                    message: format!("unknown requirement '{}'", other),
                })
            }
        };
        rules.push(MatchRule {
            pattern,
            requirement,
            group: raw_rule.group,
        });
    }

    Ok(AcceptanceCriterion {
        id,
        expected,
        rules,
    })
}

fn compile_hint(exercise: &str, raw: RawHint) -> Result<HintTemplate, DefinitionError> {
    let key = match (raw.path, raw.category) {
        (Some(path), None) => {
            let pattern = PathPattern::parse(&path).map_err(|e| DefinitionError::InvalidPattern {
                exercise: exercise.to_string(),
                message: e.to_string(),
            })?;
            HintKey::Path(pattern)
        }
        (None, Some(category)) => {
            if !HINT_CATEGORIES.contains(&category.as_str()) {
                return Err(DefinitionError::UnknownHintCategory {
                    exercise: exercise.to_string(),
                    category,
                });
            }
            HintKey::Category(category)
        }
        _ => {
            return Err(DefinitionError::BadStructure {
                exercise: exercise.to_string(),
                message: "a hint needs exactly one of 'path' or 'category'".to_string(),
            })
        }
    };
    Ok(HintTemplate {
        key,
        text: raw.text,
    })
}
