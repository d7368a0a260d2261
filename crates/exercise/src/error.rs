/// All the ways an authored definition document can be invalid. These are
/// content-pipeline failures: logged and alerted on, never shown to a
/// learner as anything but a generic error.
#[derive(Debug, thiserror::Error)]
pub enum DefinitionError {
    /// The definitions document itself failed to deserialize.
    #[error("malformed definitions document: {message}")]
    Document { message: String },

    /// Two exercises share an id within one set.
    #[error("duplicate exercise id '{id}'")]
    DuplicateExercise { id: String },

    /// Two criteria share an id within one exercise step.
    #[error("exercise '{exercise}': duplicate criterion id '{criterion}'")]
    DuplicateCriterion { exercise: String, criterion: String },

    /// An exercise or step declares no acceptance criteria.
    #[error("exercise '{exercise}': no acceptance criteria declared")]
    EmptyCriteria { exercise: String },

    /// A `manifest`/`command` exercise also declares steps, or a
    /// `multi-step` exercise declares none.
    #[error("exercise '{exercise}': {message}")]
    BadStructure { exercise: String, message: String },

    /// A criterion's expected answer does not match the exercise kind
    /// (e.g. a command criterion inside a manifest exercise).
    #[error("exercise '{exercise}', criterion '{criterion}': expected a {expected} answer")]
    WrongExpectedKind {
        exercise: String,
        criterion: String,
        expected: &'static str,
    },

    /// The authored expected answer itself failed to normalize or parse.
    #[error("exercise '{exercise}', criterion '{criterion}': invalid expected answer: {message}")]
    InvalidExpected {
        exercise: String,
        criterion: String,
        message: String,
    },

    /// A match rule or hint uses an unparseable path pattern.
    #[error("exercise '{exercise}': {message}")]
    InvalidPattern { exercise: String, message: String },

    /// A hint names a discrepancy category the matcher never produces.
    #[error("exercise '{exercise}': unknown hint category '{category}'")]
    UnknownHintCategory { exercise: String, category: String },
}
