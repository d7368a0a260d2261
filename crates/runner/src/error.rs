use kubedrill_exercise::DefinitionError;

/// Operational grading failures. These are never learner feedback: the
/// platform logs them and shows a generic "something went wrong" message.
/// Learner mistakes (bad YAML, wrong fields) never surface here -- they
/// come back inside a successful [`GradeResponse`](crate::GradeResponse).
#[derive(Debug, thiserror::Error)]
pub enum GradeError {
    /// No exercise with this id exists in the loaded snapshot.
    #[error("unknown exercise '{id}'")]
    UnknownExercise { id: String },

    /// The exercise exists but has no step with the requested id.
    #[error("exercise '{exercise}' has no step '{step}'")]
    UnknownStep { exercise: String, step: String },

    /// The definitions document failed to load or validate.
    #[error(transparent)]
    Definition(#[from] DefinitionError),

    /// Grading exceeded its wall-clock budget, including the retry.
    #[error("grading timed out after {attempts} attempt(s)")]
    Timeout { attempts: u32 },
}
