use anyhow::{anyhow, Context, Result};
use clap::Args;
use colored::Colorize;
use lessonkit_model::{find_nodes_by_ids, Document, Schema};
use std::collections::HashSet;
use std::fs;
use std::path::PathBuf;

#[derive(Args, Debug)]
pub struct FindArgs {
    /// Lesson document (JSON)
    pub document: PathBuf,

    /// Node ids to resolve
    #[arg(required = true)]
    pub ids: Vec<String>,
}

pub fn find(args: FindArgs) -> Result<()> {
    let bytes = fs::read(&args.document).with_context(|| format!("Cannot read {}", args.document.display()))?;
    let doc = Document::from_slice(Schema::lesson(), &bytes)?;

    let found = find_nodes_by_ids(&doc, &args.ids);
    for f in &found {
        println!(
            "  {:>6}..{:<6} {} {}",
            f.pos,
            f.end(),
            f.node.id().unwrap_or_default().bright_white(),
            f.node.node_type.dimmed()
        );
    }

    let found_ids: HashSet<&str> = found.iter().filter_map(|f| f.node.id()).collect();
    let missing: Vec<&str> = args
        .ids
        .iter()
        .map(String::as_str)
        .filter(|id| !found_ids.contains(id))
        .collect();

    if missing.is_empty() {
        Ok(())
    } else {
        Err(anyhow!("Nodes not found: {}", missing.join(", ")))
    }
}
