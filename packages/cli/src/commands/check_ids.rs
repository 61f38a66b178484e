use crate::config::DEFAULT_CONFIG_NAME;
use anyhow::{anyhow, Result};
use clap::Args;
use colored::Colorize;
use lessonkit_model::{count_nodes_with_id, find_duplicate_ids, Document, Schema};
use std::fs;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

#[derive(Args, Debug)]
pub struct CheckIdsArgs {
    /// Lesson document or directory of lessons
    pub input: PathBuf,
}

pub fn check_ids(args: CheckIdsArgs) -> Result<()> {
    let files = if args.input.is_file() {
        vec![args.input.clone()]
    } else if args.input.is_dir() {
        find_lesson_files(&args.input)
    } else {
        return Err(anyhow!("Input path does not exist: {}", args.input.display()));
    };

    let mut total_duplicates = 0;
    let mut unreadable = 0;
    for file in &files {
        match check_file(file)? {
            FileCheck::Checked(duplicates) => total_duplicates += duplicates,
            FileCheck::Unreadable => unreadable += 1,
        }
    }

    println!();
    println!("   Files checked: {}", files.len());
    if unreadable > 0 {
        println!("   Unreadable:    {}", unreadable.to_string().red());
    }
    match (total_duplicates, unreadable) {
        (0, 0) => {}
        (0, failed) => return Err(anyhow!("{} files could not be read", failed)),
        (found, 0) => return Err(anyhow!("{} duplicated ids found", found)),
        (found, failed) => {
            return Err(anyhow!(
                "{} duplicated ids found, {} files could not be read",
                found,
                failed
            ))
        }
    }

    println!("   {} No duplicate ids", "✓".green());
    Ok(())
}

enum FileCheck {
    Checked(usize),
    Unreadable,
}

fn check_file(path: &Path) -> Result<FileCheck> {
    let bytes = fs::read(path)?;
    let doc = match Document::from_slice(Schema::lesson(), &bytes) {
        Ok(doc) => doc,
        Err(err) => {
            eprintln!("{} Failed to read {}: {}", "✗".red(), path.display(), err);
            return Ok(FileCheck::Unreadable);
        }
    };

    let duplicates = find_duplicate_ids(&doc);
    if !duplicates.is_empty() {
        println!("{}", path.display());
        for id in &duplicates {
            println!(
                "  {} '{}' is used by {} nodes",
                "duplicate".yellow().bold(),
                id,
                count_nodes_with_id(&doc, id)
            );
        }
    }

    Ok(FileCheck::Checked(duplicates.len()))
}

fn find_lesson_files(dir: &Path) -> Vec<PathBuf> {
    WalkDir::new(dir)
        .follow_links(true)
        .into_iter()
        .filter_map(|e| e.ok())
        .map(|entry| entry.into_path())
        .filter(|path| path.is_file() && path.extension().is_some_and(|e| e == "json"))
        .filter(|path| path.file_name().is_some_and(|name| name != DEFAULT_CONFIG_NAME))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    const CLEAN: &str = r#"{ "type": "doc", "content": [
        { "type": "paragraph", "attrs": { "id": "p1" }, "content": [{ "type": "text", "text": "a" }] }
    ] }"#;

    fn args(input: &Path) -> CheckIdsArgs {
        CheckIdsArgs {
            input: input.to_path_buf(),
        }
    }

    #[test]
    fn test_clean_directory_passes() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("one.json"), CLEAN).unwrap();
        fs::write(dir.path().join(DEFAULT_CONFIG_NAME), "{}").unwrap();

        assert!(check_ids(args(dir.path())).is_ok());
    }

    #[test]
    fn test_unreadable_lesson_fails() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("one.json"), CLEAN).unwrap();
        fs::write(dir.path().join("broken.json"), r#"{ "type": "paragraph" }"#).unwrap();

        let err = check_ids(args(dir.path())).unwrap_err();
        assert_eq!(err.to_string(), "1 files could not be read");
    }

    #[test]
    fn test_duplicates_fail() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("dup.json");
        fs::write(
            &path,
            r#"{ "type": "doc", "content": [
                { "type": "horizontalRule", "attrs": { "id": "x" } },
                { "type": "horizontalRule", "attrs": { "id": "x" } }
            ] }"#,
        )
        .unwrap();

        let err = check_ids(args(&path)).unwrap_err();
        assert_eq!(err.to_string(), "1 duplicated ids found");
    }
}
