use crate::OutputFormat;
use kubedrill_core::parse_command;

pub fn run(command: &str, output: OutputFormat) -> i32 {
    let intent = match parse_command(command) {
        Ok(intent) => intent,
        Err(e) => {
            eprintln!("error: {}", e);
            return 1;
        }
    };

    match output {
        OutputFormat::Json => match serde_json::to_string_pretty(&intent) {
            Ok(rendered) => println!("{}", rendered),
            Err(e) => {
                eprintln!("error: cannot render intent: {}", e);
                return 2;
            }
        },
        OutputFormat::Text => {
            println!("verb:     {}", intent.verb);
            if let Some(kind) = &intent.resource_kind {
                println!("resource: {}", kind);
            }
            if let Some(name) = &intent.name {
                println!("name:     {}", name);
            }
            for (key, value) in &intent.flags {
                println!("flag:     {}={}", key, value.render());
            }
            for arg in &intent.positional_args {
                println!("arg:      {}", arg);
            }
        }
    }
    0
}
