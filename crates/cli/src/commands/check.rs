use crate::commands::load_definitions;
use crate::OutputFormat;
use std::path::Path;

pub fn run(definitions: &Path, output: OutputFormat, quiet: bool) -> i32 {
    let set = match load_definitions(definitions) {
        Ok(set) => set,
        Err(message) => {
            eprintln!("error: {}", message);
            return 1;
        }
    };

    match output {
        OutputFormat::Json => {
            let exercises: Vec<serde_json::Value> = set
                .iter()
                .map(|exercise| {
                    serde_json::json!({
                        "criteria": exercise
                            .steps
                            .iter()
                            .map(|step| step.criteria.len())
                            .sum::<usize>(),
                        "id": exercise.id,
                        "kind": exercise.kind.as_str(),
                        "steps": exercise.steps.len(),
                    })
                })
                .collect();
            let rendered = serde_json::json!({
                "count": set.len(),
                "exercises": exercises,
            });
            match serde_json::to_string_pretty(&rendered) {
                Ok(text) => println!("{}", text),
                Err(e) => {
                    eprintln!("error: cannot render report: {}", e);
                    return 2;
                }
            }
        }
        OutputFormat::Text => {
            if !quiet {
                for exercise in set.iter() {
                    let criteria: usize =
                        exercise.steps.iter().map(|step| step.criteria.len()).sum();
                    println!(
                        "ok  {} ({}, {} step(s), {} criteria)",
                        exercise.id,
                        exercise.kind.as_str(),
                        exercise.steps.len(),
                        criteria
                    );
                }
            }
            println!("{} exercise(s) valid", set.len());
        }
    }
    0
}
