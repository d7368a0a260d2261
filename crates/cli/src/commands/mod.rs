//! Subcommand implementations. Each `run` returns the process exit code:
//! 0 for success (and a passing grade), 1 for a failing grade or invalid
//! input, 2 for operational errors.

pub mod check;
pub mod grade;
pub mod normalize;
pub mod parse;

use kubedrill_exercise::ExerciseSet;
use std::io::Read;
use std::path::Path;

/// Load a definitions document, dispatching on the file extension.
pub(crate) fn load_definitions(path: &Path) -> Result<ExerciseSet, String> {
    let src = std::fs::read_to_string(path)
        .map_err(|e| format!("cannot read {}: {}", path.display(), e))?;
    let set = if path.extension().is_some_and(|ext| ext == "json") {
        ExerciseSet::from_json(&src)
    } else {
        ExerciseSet::from_yaml(&src)
    };
    set.map_err(|e| format!("invalid definitions in {}: {}", path.display(), e))
}

/// Read an input file, with `-` meaning stdin.
pub(crate) fn read_input(path: &Path) -> Result<String, String> {
    if path.as_os_str() == "-" {
        let mut buffer = String::new();
        std::io::stdin()
            .read_to_string(&mut buffer)
            .map_err(|e| format!("cannot read stdin: {}", e))?;
        Ok(buffer)
    } else {
        std::fs::read_to_string(path).map_err(|e| format!("cannot read {}: {}", path.display(), e))
    }
}
