//! # Operation Validation
//!
//! Trust boundary between agent output and document mutation. A batch is
//! accepted whole or rejected whole; nothing malformed reaches the
//! executor.

use crate::operations::Operation;
use lessonkit_model::{Block, Inline, ListItem};
use serde_json::Value;
use std::collections::HashSet;
use thiserror::Error;

const OPERATION_TAGS: &[&str] = &[
    "insert_after",
    "insert_before",
    "replace_block",
    "delete_block",
    "set_content",
    "set_attrs",
    "wrap",
    "unwrap",
];

#[derive(Error, Debug, Clone, PartialEq)]
pub enum ValidationError {
    #[error("Invalid JSON: {0}")]
    Json(String),

    #[error("Expected an array of operations")]
    NotAnArray,

    #[error("Operation {index}: {reason}")]
    Invalid { index: usize, reason: String },
}

impl ValidationError {
    fn invalid(index: usize, reason: impl Into<String>) -> Self {
        Self::Invalid {
            index,
            reason: reason.into(),
        }
    }
}

/// Parse and validate a batch that travelled as a JSON string
pub fn parse_operations(json: &str) -> Result<Vec<Operation>, ValidationError> {
    let value: Value = serde_json::from_str(json).map_err(|e| ValidationError::Json(e.to_string()))?;
    validate_operations(&value)
}

/// Validate an untrusted batch against the operation schema
pub fn validate_operations(value: &Value) -> Result<Vec<Operation>, ValidationError> {
    let items = value.as_array().ok_or(ValidationError::NotAnArray)?;

    items
        .iter()
        .enumerate()
        .map(|(index, item)| {
            let tag = item
                .get("op")
                .ok_or_else(|| ValidationError::invalid(index, "missing 'op' field"))?;
            match tag.as_str() {
                Some(tag) if OPERATION_TAGS.contains(&tag) => {}
                Some(tag) => return Err(ValidationError::invalid(index, format!("unknown op '{}'", tag))),
                None => return Err(ValidationError::invalid(index, "'op' must be a string")),
            }

            let operation: Operation =
                serde_json::from_value(item.clone()).map_err(|e| ValidationError::invalid(index, e.to_string()))?;
            validate_operation(&operation).map_err(|reason| ValidationError::invalid(index, reason))?;
            Ok(operation)
        })
        .collect()
}

/// Checks the typed shape cannot express
pub fn validate_operation(operation: &Operation) -> Result<(), String> {
    match operation {
        Operation::InsertAfter { id, block }
        | Operation::InsertBefore { id, block }
        | Operation::ReplaceBlock { id, block } => {
            check_id(id)?;
            check_block(block)
        }

        Operation::DeleteBlock { id } | Operation::Unwrap { id } => check_id(id),

        Operation::SetContent { id, content } => {
            check_id(id)?;
            check_inline(content)
        }

        Operation::SetAttrs { id, attrs } => {
            check_id(id)?;
            match attrs.get("id") {
                Some(Value::String(new_id)) if new_id.trim().is_empty() => Err("attrs.id must not be empty".to_string()),
                Some(Value::String(_)) | None => Ok(()),
                Some(_) => Err("attrs.id must be a string".to_string()),
            }
        }

        Operation::Wrap { ids, .. } => {
            if ids.is_empty() {
                return Err("wrap requires at least one id".to_string());
            }
            let mut seen = HashSet::new();
            for id in ids {
                check_id(id)?;
                if !seen.insert(id.as_str()) {
                    return Err(format!("duplicate id '{}' in wrap", id));
                }
            }
            Ok(())
        }
    }
}

fn check_id(id: &str) -> Result<(), String> {
    if id.trim().is_empty() {
        return Err("id must not be empty".to_string());
    }
    Ok(())
}

fn check_optional_id(id: &Option<String>) -> Result<(), String> {
    match id {
        Some(id) => check_id(id),
        None => Ok(()),
    }
}

fn check_blocks(blocks: &[Block]) -> Result<(), String> {
    blocks.iter().try_for_each(check_block)
}

fn check_items(items: &[ListItem]) -> Result<(), String> {
    items.iter().try_for_each(|item| {
        check_optional_id(&item.id)?;
        check_blocks(&item.content)
    })
}

fn check_block(block: &Block) -> Result<(), String> {
    match block {
        Block::Paragraph { id, content } => {
            check_optional_id(id)?;
            check_inline(content)
        }
        Block::Heading { id, level, content } => {
            check_optional_id(id)?;
            if !(1..=3).contains(level) {
                return Err(format!("heading level must be 1, 2 or 3, got {}", level));
            }
            check_inline(content)
        }
        Block::BulletList { id, items } | Block::OrderedList { id, items, .. } => {
            check_optional_id(id)?;
            check_items(items)
        }
        Block::Blockquote { id, content } | Block::Group { id, content } | Block::NoteBlock { id, content } => {
            check_optional_id(id)?;
            check_blocks(content)
        }
        Block::HorizontalRule { id } => check_optional_id(id),
        Block::Exercise { id, task, content } => {
            check_optional_id(id)?;
            check_inline(task)?;
            check_blocks(content)
        }
        Block::WritingArea { id, lines } => {
            check_optional_id(id)?;
            if *lines == 0 {
                return Err("writingArea lines must be at least 1".to_string());
            }
            Ok(())
        }
        Block::Image { id, src, .. } => {
            check_optional_id(id)?;
            if src.trim().is_empty() {
                return Err("image src must not be empty".to_string());
            }
            Ok(())
        }
    }
}

fn check_inline(content: &[Inline]) -> Result<(), String> {
    for inline in content {
        if let Inline::Blank { correct_answer, .. } = inline {
            if correct_answer.trim().is_empty() {
                return Err("blank correctAnswer must not be empty".to_string());
            }
        }
    }
    Ok(())
}
