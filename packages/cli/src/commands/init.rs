use crate::config::{Config, DEFAULT_CONFIG_NAME};
use anyhow::Result;
use clap::Args;
use colored::Colorize;
use lessonkit_editor::DuplicatePolicy;
use lessonkit_model::{Block, Document, Inline, Schema};
use std::fs;
use std::path::PathBuf;

#[derive(Debug, Args)]
pub struct InitArgs {
    /// Prefix for generated node ids
    #[arg(short, long, default_value = "lk")]
    pub id_prefix: String,

    /// Fail operations that target a duplicated id
    #[arg(long)]
    pub reject_duplicates: bool,

    /// Force overwrite existing config
    #[arg(short, long)]
    pub force: bool,
}

pub fn init(args: InitArgs, cwd: &str) -> Result<()> {
    let config_path = PathBuf::from(cwd).join(DEFAULT_CONFIG_NAME);

    // Check if config already exists
    if config_path.exists() && !args.force {
        println!(
            "{} {} already exists",
            "⚠️".yellow(),
            DEFAULT_CONFIG_NAME.bright_white()
        );
        println!("Use --force to overwrite");
        return Ok(());
    }

    println!("{}", "📝 Initializing lessonkit project...".bright_blue().bold());

    let example_file = PathBuf::from(cwd).join("lesson.json");
    if !example_file.exists() {
        let example = Document::from_blocks(Schema::lesson(), &example_lesson())?;
        fs::write(&example_file, serde_json::to_string_pretty(&example.to_json())?)?;
        println!("  {} Created lesson.json", "✓".green());
    }

    let config = Config {
        id_prefix: args.id_prefix,
        duplicate_ids: if args.reject_duplicates {
            DuplicatePolicy::Reject
        } else {
            DuplicatePolicy::FirstMatch
        },
        ..Config::default()
    };

    fs::write(&config_path, serde_json::to_string_pretty(&config)?)?;

    println!("  {} Created {}", "✓".green(), DEFAULT_CONFIG_NAME);
    println!();
    println!("{}", "✅ Project initialized!".green().bold());
    println!();
    println!("Next steps:");
    println!("  1. Write an operation batch, e.g. ops.json");
    println!("  2. Run: lessonkit apply lesson.json ops.json --write");

    Ok(())
}

fn example_lesson() -> Vec<Block> {
    vec![
        Block::Heading {
            id: Some("title".to_string()),
            level: 1,
            content: vec![Inline::text("Past simple")],
        },
        Block::Exercise {
            id: Some("ex1".to_string()),
            task: vec![Inline::text("Fill in the gap.")],
            content: vec![Block::Paragraph {
                id: Some("ex1-p1".to_string()),
                content: vec![
                    Inline::text("Yesterday I "),
                    Inline::Blank {
                        correct_answer: "went".to_string(),
                        alternative_answers: vec![],
                        hint: Some("go".to_string()),
                    },
                    Inline::text(" home."),
                ],
            }],
        },
    ]
}
