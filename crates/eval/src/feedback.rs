//! Feedback composition: discrepancies to pedagogically useful hints.
//!
//! The composer never echoes expected values -- only the path and the
//! expected type or shape -- unless the exercise is explicitly marked
//! reveal-on-fail. Authored hint templates win over the generic
//! fallbacks, most specific path pattern first.

use crate::types::{DiscrepancyKind, FieldDiscrepancy, MatchResult};
use kubedrill_exercise::{ExerciseDefinition, HintKey, HintTemplate};

/// Feedback items surfaced per attempt when the exercise does not set
/// its own cap.
pub const DEFAULT_MAX_FEEDBACK: usize = 3;

/// Compose ordered feedback for one match result. Discrepancies arrive
/// blocking-first from the matcher; the cap keeps a struggling learner
/// from drowning in findings.
pub fn compose(result: &MatchResult, exercise: &ExerciseDefinition) -> Vec<String> {
    let limit = exercise.max_feedback.unwrap_or(DEFAULT_MAX_FEEDBACK);
    result
        .discrepancies
        .iter()
        .take(limit)
        .map(|discrepancy| render(discrepancy, exercise))
        .collect()
}

fn render(discrepancy: &FieldDiscrepancy, exercise: &ExerciseDefinition) -> String {
    let mut text = match best_hint(discrepancy, &exercise.hints) {
        Some(template) => template.text.replace("{path}", &discrepancy.path.to_string()),
        None => generic_hint(discrepancy),
    };
    if exercise.reveal_on_fail {
        if let Some(expected) = &discrepancy.expected_value {
            text.push_str(&format!(" (expected {})", expected));
        }
    }
    text
}

/// The most specific matching template: path hints ranked by pattern
/// specificity, then category hints, then nothing.
fn best_hint<'a>(
    discrepancy: &FieldDiscrepancy,
    hints: &'a [HintTemplate],
) -> Option<&'a HintTemplate> {
    let by_path = hints
        .iter()
        .filter_map(|hint| match &hint.key {
            HintKey::Path(pattern) if pattern.matches(&discrepancy.path) => {
                Some((pattern.specificity(), hint))
            }
            _ => None,
        })
        .max_by_key(|(specificity, _)| *specificity)
        .map(|(_, hint)| hint);
    if by_path.is_some() {
        return by_path;
    }
    hints.iter().find(|hint| {
        matches!(&hint.key, HintKey::Category(category) if category == discrepancy.kind.category())
    })
}

fn generic_hint(discrepancy: &FieldDiscrepancy) -> String {
    let path = &discrepancy.path;
    match discrepancy.kind {
        DiscrepancyKind::Missing => match &discrepancy.expected_shape {
            Some(shape) => format!("check the {} field: a {} value is expected there", path, shape),
            None => format!("check the {} field: something is missing there", path),
        },
        DiscrepancyKind::Unexpected => {
            format!("the {} field isn't part of this exercise's expected answer", path)
        }
        DiscrepancyKind::ValueMismatch => {
            format!("check the {} field: its value doesn't match what the exercise expects", path)
        }
        DiscrepancyKind::TypeMismatch => match (&discrepancy.expected_shape, &discrepancy.actual) {
            (Some(expected), Some(actual)) => format!(
                "check the {} field: it should be a {} but {} is not -- remember YAML quoting",
                path, expected, actual
            ),
            (Some(expected), None) => {
                format!("check the {} field: a {} is expected there", path, expected)
            }
            _ => format!("check the {} field: its YAML type is wrong", path),
        },
        DiscrepancyKind::Forbidden => {
            format!("remove {}: it changes the behavior this exercise checks", path)
        }
    }
}
