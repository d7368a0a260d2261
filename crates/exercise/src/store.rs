//! The immutable exercise snapshot shared across grading calls.

use crate::error::DefinitionError;
use crate::types::ExerciseDefinition;
use std::collections::BTreeMap;

/// A validated set of exercise definitions, loaded once and treated as
/// immutable for the lifetime of the process. Definition updates ship as
/// a whole new snapshot; concurrent graders never observe a partial one.
#[derive(Debug, Clone, Default)]
pub struct ExerciseSet {
    exercises: BTreeMap<String, ExerciseDefinition>,
}

impl ExerciseSet {
    /// Build a snapshot, rejecting duplicate exercise ids.
    pub fn new(definitions: Vec<ExerciseDefinition>) -> Result<Self, DefinitionError> {
        let mut exercises = BTreeMap::new();
        for definition in definitions {
            let id = definition.id.clone();
            if exercises.insert(id.clone(), definition).is_some() {
                return Err(DefinitionError::DuplicateExercise { id });
            }
        }
        Ok(ExerciseSet { exercises })
    }

    /// Load a snapshot from a `---`-separated YAML stream.
    pub fn from_yaml(src: &str) -> Result<Self, DefinitionError> {
        Self::new(crate::deserialize::parse_yaml_definitions(src)?)
    }

    /// Load a snapshot from a JSON array (or single object).
    pub fn from_json(src: &str) -> Result<Self, DefinitionError> {
        Self::new(crate::deserialize::parse_json_definitions(src)?)
    }

    pub fn get(&self, id: &str) -> Option<&ExerciseDefinition> {
        self.exercises.get(id)
    }

    pub fn len(&self) -> usize {
        self.exercises.len()
    }

    pub fn is_empty(&self) -> bool {
        self.exercises.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &ExerciseDefinition> {
        self.exercises.values()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const TWO_EXERCISES: &str = "\
id: get-pods
kind: command
criteria:
  - command: kubectl get pods
---
id: get-services
kind: command
criteria:
  - command: kubectl get services
";

    #[test]
    fn loads_a_yaml_stream() {
        let set = ExerciseSet::from_yaml(TWO_EXERCISES).unwrap();
        assert_eq!(set.len(), 2);
        assert!(set.get("get-pods").is_some());
        assert!(set.get("missing").is_none());
    }

    #[test]
    fn duplicate_ids_are_rejected() {
        let src = "\
id: same
kind: command
criteria:
  - command: kubectl get pods
---
id: same
kind: command
criteria:
  - command: kubectl get pods
";
        let err = ExerciseSet::from_yaml(src).unwrap_err();
        assert!(matches!(err, DefinitionError::DuplicateExercise { .. }));
    }
}
