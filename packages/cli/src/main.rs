mod commands;
mod config;

use clap::{Parser, Subcommand};
use colored::Colorize;
use commands::{apply, check_ids, find, init, validate, ApplyArgs, CheckIdsArgs, FindArgs, InitArgs, ValidateArgs};
use config::Config;
use tracing_subscriber::EnvFilter;

/// Lessonkit CLI - semantic editing for lesson documents
#[derive(Parser, Debug)]
#[command(name = "lessonkit")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Log filter, overrides the configured level (RUST_LOG wins over both)
    #[arg(long, global = true)]
    log_level: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Write a default lessonkit.config.json
    Init(InitArgs),

    /// Validate an operation batch and apply it to a lesson
    Apply(ApplyArgs),

    /// Validate an operation batch without applying it
    Validate(ValidateArgs),

    /// Resolve node ids to document positions
    Find(FindArgs),

    /// Report ids carried by more than one node
    CheckIds(CheckIdsArgs),
}

fn init_tracing(level: &str) {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level)))
        .with_writer(std::io::stderr)
        .init();
}

fn run(cli: Cli) -> anyhow::Result<()> {
    let cwd = std::env::current_dir()?.display().to_string();
    let config = Config::load(&cwd)?;

    init_tracing(cli.log_level.as_deref().unwrap_or(&config.log_level));

    match cli.command {
        Command::Init(args) => init(args, &cwd),
        Command::Apply(args) => apply(args, &config),
        Command::Validate(args) => validate(args),
        Command::Find(args) => find(args),
        Command::CheckIds(args) => check_ids(args),
    }
}

fn main() {
    let cli = Cli::parse();

    if let Err(err) = run(cli) {
        eprintln!();
        eprintln!("{} {}", "Error:".red().bold(), err);
        eprintln!();
        std::process::exit(1);
    }
}
