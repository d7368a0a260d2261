//! kubedrill-core: normalization core for the exercise verification engine.
//!
//! Turns raw learner input -- a Kubernetes manifest or a `kubectl` command
//! line -- into a canonical intermediate representation that the matcher
//! can compare structurally:
//!
//! - [`normalize()`] -- YAML manifest to [`NormalizedSpec`] (defaults
//!   resolved, server fields stripped, set-lists sorted)
//! - [`parse_command()`] -- command line to [`CommandIntent`] (aliases
//!   resolved, flags canonicalized)
//!
//! Both are pure functions over their input plus the static tables in
//! [`schema`] and [`command::alias`]. The only nondeterminism is the
//! optional wall-clock [`Budget`] threaded in by the runner as a ceiling
//! against pathological inputs.

pub mod budget;
pub mod command;
pub mod error;
pub mod normalize;
pub mod path;
pub mod schema;
pub mod value;

// ── Convenience re-exports: key types ────────────────────────────────

pub use budget::{Budget, DeadlineExceeded};
pub use command::{parse_command, parse_command_within, CommandIntent, FlagValue};
pub use error::{Interrupt, ParseError};
pub use normalize::{normalize, normalize_within, NormalizedSpec, TypeViolation};
pub use path::{FieldPath, PathPattern, PathSegment};
pub use schema::{FieldType, SchemaTable};
pub use value::Value;

/// Version tag of the built-in Kubernetes schema tables.
pub const SCHEMA_TABLE_VERSION: &str = "v1";
