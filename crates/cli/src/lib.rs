pub mod commands;

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};

#[derive(Debug, Parser)]
#[command(
    name = "compass",
    about = "Compass operator CLI",
    long_about = "Operate the career-assistant backend: migrations, demo fixtures, \
                  leadership-model training, and readiness checks.",
    after_help = "Examples:\n  compass migrate\n  compass seed\n  compass train\n  compass doctor --json"
)]
pub struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    #[command(about = "Apply pending database migrations and return structured status output")]
    Migrate,
    #[command(about = "Load the demo employee directory (no-op when employees already exist)")]
    Seed,
    #[command(about = "Fit the leadership model from the employee directory and write it to disk")]
    Train {
        #[arg(long, help = "Write the fitted model here instead of the configured path")]
        output: Option<PathBuf>,
    },
    #[command(about = "Validate config, database connectivity, and leadership-model readiness")]
    Doctor {
        #[arg(long, help = "Emit machine-readable JSON output")]
        json: bool,
    },
}

pub fn run() -> ExitCode {
    let cli = Cli::parse();

    let result = match cli.command {
        Command::Migrate => commands::migrate::run(),
        Command::Seed => commands::seed::run(),
        Command::Train { output } => commands::train::run(output),
        Command::Doctor { json } => commands::doctor::run(json),
    };

    println!("{}", result.output);
    ExitCode::from(result.exit_code)
}
