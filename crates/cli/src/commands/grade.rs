use crate::commands::{load_definitions, read_input};
use crate::OutputFormat;
use kubedrill_runner::Grader;
use std::path::Path;

pub fn run(
    definitions: &Path,
    exercise: &str,
    step: Option<&str>,
    submission: &Path,
    output: OutputFormat,
    quiet: bool,
) -> i32 {
    let set = match load_definitions(definitions) {
        Ok(set) => set,
        Err(message) => {
            eprintln!("error: {}", message);
            return 2;
        }
    };
    let raw = match read_input(submission) {
        Ok(raw) => raw,
        Err(message) => {
            eprintln!("error: {}", message);
            return 2;
        }
    };

    let grader = Grader::new(set);
    let response = match grader.grade_step(exercise, step, &raw) {
        Ok(response) => response,
        Err(err) => {
            eprintln!("error: {}", err);
            return 2;
        }
    };

    match output {
        OutputFormat::Json => match serde_json::to_string_pretty(&response.to_json()) {
            Ok(rendered) => println!("{}", rendered),
            Err(e) => {
                eprintln!("error: cannot render response: {}", e);
                return 2;
            }
        },
        OutputFormat::Text => {
            println!("verdict: {}", response.verdict.as_str());
            println!("score:   {:.2}", response.score);
            if !quiet {
                for hint in &response.feedback {
                    println!("  - {}", hint);
                }
            }
        }
    }

    if response.verdict.as_str() == "pass" {
        0
    } else {
        1
    }
}
