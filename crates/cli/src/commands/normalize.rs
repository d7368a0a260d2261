use crate::commands::read_input;
use crate::OutputFormat;
use kubedrill_core::normalize;
use std::path::Path;

pub fn run(file: &Path, output: OutputFormat) -> i32 {
    let raw = match read_input(file) {
        Ok(raw) => raw,
        Err(message) => {
            eprintln!("error: {}", message);
            return 2;
        }
    };

    let spec = match normalize(&raw) {
        Ok(spec) => spec,
        Err(e) => {
            eprintln!("error: {}", e);
            return 1;
        }
    };

    match output {
        OutputFormat::Json => {
            let rendered = serde_json::json!({
                "apiVersion": spec.api_version,
                "ir": spec.root,
                "kind": spec.kind,
                "violations": spec.violations,
            });
            match serde_json::to_string_pretty(&rendered) {
                Ok(text) => println!("{}", text),
                Err(e) => {
                    eprintln!("error: cannot render IR: {}", e);
                    return 2;
                }
            }
        }
        OutputFormat::Text => {
            print!("{}", spec.to_yaml());
            for violation in &spec.violations {
                eprintln!(
                    "type violation at {}: expected {}, got {} ({})",
                    violation.path, violation.expected, violation.actual, violation.value
                );
            }
        }
    }

    if spec.violations.is_empty() {
        0
    } else {
        1
    }
}
