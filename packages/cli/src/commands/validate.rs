use anyhow::{Context, Result};
use clap::Args;
use colored::Colorize;
use lessonkit_editor::parse_operations;
use std::fs;
use std::path::PathBuf;

#[derive(Args, Debug)]
pub struct ValidateArgs {
    /// Operation batch (JSON array)
    pub operations: PathBuf,
}

pub fn validate(args: ValidateArgs) -> Result<()> {
    let source = fs::read_to_string(&args.operations)
        .with_context(|| format!("Cannot read {}", args.operations.display()))?;
    let operations = parse_operations(&source)?;

    println!(
        "{} {} valid operations in {}",
        "✓".green(),
        operations.len(),
        args.operations.display()
    );
    for (index, op) in operations.iter().enumerate() {
        println!("  [{}] {} {}", index, op.kind(), op.target_ids().join(", ").dimmed());
    }

    Ok(())
}
