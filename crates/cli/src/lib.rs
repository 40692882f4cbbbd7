pub mod commands;

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};

#[derive(Debug, Parser)]
#[command(
    name = "shelfrec",
    about = "Shelfrec operator CLI",
    long_about = "Inspect configuration, verify recommendation artifacts, seed demo data, and run the recommendation pipeline from the terminal.",
    after_help = "Examples:\n  shelfrec seed --dir data\n  shelfrec doctor --json\n  shelfrec recommend --user u1 --item p1000 -n 6\n  shelfrec smoke"
)]
pub struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    #[command(about = "Validate config and check every artifact for presence and loadability")]
    Doctor {
        #[arg(long, help = "Emit machine-readable JSON output")]
        json: bool,
    },
    #[command(about = "Inspect effective configuration values with source attribution")]
    Config,
    #[command(about = "Write a deterministic demo artifact set")]
    Seed {
        #[arg(long, help = "Target directory (defaults to the configured artifacts dir)")]
        dir: Option<PathBuf>,
        #[arg(long, help = "Overwrite existing artifact files")]
        force: bool,
    },
    #[command(about = "Run the recommendation pipeline once and print the result")]
    Recommend {
        #[arg(long, help = "User id (omit for an anonymous request)")]
        user: Option<String>,
        #[arg(long, help = "Current item id used for co-view and category scope")]
        item: Option<String>,
        #[arg(short = 'n', long = "count", help = "Number of recommendations")]
        count: Option<usize>,
        #[arg(long, help = "Emit machine-readable JSON output")]
        json: bool,
    },
    #[command(about = "Run end-to-end readiness checks with per-check timing details")]
    Smoke,
}

pub fn run() -> ExitCode {
    let cli = Cli::parse();

    let result = match cli.command {
        Command::Doctor { json } => commands::doctor::run(json),
        Command::Config => {
            commands::CommandResult { exit_code: 0, output: commands::config::run() }
        }
        Command::Seed { dir, force } => commands::seed::run(dir, force),
        Command::Recommend { user, item, count, json } => {
            commands::recommend::run(user.as_deref(), item.as_deref(), count, json)
        }
        Command::Smoke => commands::smoke::run(),
    };

    println!("{}", result.output);
    ExitCode::from(result.exit_code)
}
