//! Wall-clock budget for a single grading call.
//!
//! Every component of the engine is a pure synchronous computation, so the
//! budget is a safety ceiling against pathological inputs (deeply nested
//! YAML, enormous lists), not an expected code path. The runner creates one
//! [`Budget`] per attempt and threads it through normalization and matching;
//! recursive walks call [`Budget::check`] once per node.

use std::fmt;
use std::time::{Duration, Instant};

/// Deadline for one grading attempt. `unlimited()` never expires and is the
/// right choice for tests and offline tooling.
#[derive(Debug, Clone, Copy)]
pub struct Budget {
    deadline: Option<Instant>,
}

impl Budget {
    /// A budget that never expires.
    pub fn unlimited() -> Self {
        Budget { deadline: None }
    }

    /// A budget expiring `limit` from now.
    pub fn with_limit(limit: Duration) -> Self {
        Budget {
            deadline: Some(Instant::now() + limit),
        }
    }

    /// Err once the deadline is reached.
    pub fn check(&self) -> Result<(), DeadlineExceeded> {
        match self.deadline {
            Some(deadline) if Instant::now() >= deadline => Err(DeadlineExceeded),
            _ => Ok(()),
        }
    }
}

impl Default for Budget {
    fn default() -> Self {
        Budget::unlimited()
    }
}

/// The grading attempt ran past its wall-clock deadline.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DeadlineExceeded;

impl fmt::Display for DeadlineExceeded {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "grading exceeded its wall-clock budget")
    }
}

impl std::error::Error for DeadlineExceeded {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unlimited_never_expires() {
        let budget = Budget::unlimited();
        assert!(budget.check().is_ok());
    }

    #[test]
    fn zero_limit_expires_immediately() {
        let budget = Budget::with_limit(Duration::ZERO);
        assert_eq!(budget.check(), Err(DeadlineExceeded));
    }
}
