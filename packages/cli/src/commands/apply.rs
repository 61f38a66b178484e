use crate::config::Config;
use anyhow::{Context, Result};
use clap::Args;
use colored::Colorize;
use lessonkit_editor::{parse_operations, LessonDocument, OperationResult};
use std::fs;
use std::path::PathBuf;
use tracing::info;

#[derive(Args, Debug)]
pub struct ApplyArgs {
    /// Lesson document (JSON)
    pub document: PathBuf,

    /// Operation batch (JSON array)
    pub operations: PathBuf,

    /// Save the edited document back to its file
    #[arg(short, long)]
    pub write: bool,

    /// Print the results array as JSON
    #[arg(long)]
    pub json: bool,
}

pub fn apply(args: ApplyArgs, config: &Config) -> Result<()> {
    let source = fs::read_to_string(&args.operations)
        .with_context(|| format!("Cannot read {}", args.operations.display()))?;
    let operations = parse_operations(&source)?;

    let mut doc = LessonDocument::load(args.document.clone(), config.editor_options())
        .with_context(|| format!("Cannot load {}", args.document.display()))?;
    let results = doc.apply_batch(&operations);

    if args.json {
        println!("{}", serde_json::to_string_pretty(&results)?);
    } else {
        print_results(&results);
    }

    if args.write {
        doc.save()?;
        info!(path = %args.document.display(), "Document saved");
    }

    Ok(())
}

fn print_results(results: &[OperationResult]) {
    for (index, result) in results.iter().enumerate() {
        let targets = result.op.target_ids().join(", ");
        match &result.error {
            None => println!("  {} [{}] {} {}", "✓".green(), index, result.op.kind(), targets),
            Some(error) => println!(
                "  {} [{}] {} {}: {}",
                "✗".red(),
                index,
                result.op.kind(),
                targets,
                error.red()
            ),
        }
    }

    let failed = results.iter().filter(|r| !r.success).count();
    println!();
    if failed == 0 {
        println!("{} {} operations applied", "Done".green().bold(), results.len());
    } else {
        println!(
            "{} {} applied, {} failed",
            "Done".yellow().bold(),
            results.len() - failed,
            failed
        );
    }
}
