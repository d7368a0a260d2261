//! kubedrill: content-authoring workbench for the exercise verification
//! engine. Grades submission files against authored definitions, shows
//! canonical forms, and lints definition documents -- the engine itself
//! stays CLI-free.

mod commands;

use std::path::PathBuf;
use std::process;

use clap::{Parser, Subcommand, ValueEnum};
use tracing_subscriber::EnvFilter;

/// Output format for CLI responses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub(crate) enum OutputFormat {
    Text,
    Json,
}

/// kubedrill exercise grading toolchain.
#[derive(Parser)]
#[command(name = "kubedrill", version, about = "kubedrill exercise grading toolchain")]
struct Cli {
    /// Output format (text or json)
    #[arg(long, global = true, default_value = "text", value_enum)]
    output: OutputFormat,

    /// Suppress non-essential output
    #[arg(long, global = true)]
    quiet: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Grade a submission file against an exercise definition
    Grade {
        /// Path to the definitions document (YAML stream or JSON array)
        #[arg(long)]
        definitions: PathBuf,
        /// Exercise id to grade against
        #[arg(long)]
        exercise: String,
        /// Step id within a multi-step exercise (defaults to the first)
        #[arg(long)]
        step: Option<String>,
        /// Path to the submission file, or '-' for stdin
        submission: PathBuf,
    },

    /// Normalize a manifest and print its canonical form
    Normalize {
        /// Path to the YAML manifest
        file: PathBuf,
    },

    /// Parse a kubectl command line and print its canonical intent
    ParseCommand {
        /// The command line, quoted as one argument
        command: String,
    },

    /// Validate a definitions document and report each exercise
    Check {
        /// Path to the definitions document (YAML stream or JSON array)
        definitions: PathBuf,
    },
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let code = match cli.command {
        Commands::Grade {
            definitions,
            exercise,
            step,
            submission,
        } => commands::grade::run(
            &definitions,
            &exercise,
            step.as_deref(),
            &submission,
            cli.output,
            cli.quiet,
        ),
        Commands::Normalize { file } => commands::normalize::run(&file, cli.output),
        Commands::ParseCommand { command } => commands::parse::run(&command, cli.output),
        Commands::Check { definitions } => commands::check::run(&definitions, cli.output, cli.quiet),
    };
    process::exit(code);
}
