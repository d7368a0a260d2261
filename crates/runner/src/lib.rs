//! kubedrill-runner: per-submission grading orchestration.
//!
//! The runner is the only component with an outward-facing surface: it
//! owns the immutable exercise snapshot, walks each submission through
//! parse -> match -> compose, enforces the wall-clock budget, and splits
//! outcomes along the error taxonomy -- learner mistakes come back as
//! feedback inside a [`GradeResponse`], operational failures come back as
//! a [`GradeError`] for the platform to log and alert on.

pub mod error;
pub mod grade;
pub mod response;

pub use error::GradeError;
pub use grade::{GradeOptions, Grader, Submission};
pub use response::GradeResponse;
