//! # Document Operations
//!
//! The closed instruction set an agent may use to edit a lesson.
//!
//! ## Operation Semantics
//!
//! ### insert_after / insert_before
//! - New block becomes the next/previous sibling of the target
//!
//! ### replace_block / delete_block
//! - Act on the target's full extent, descendants included
//!
//! ### set_content
//! - Replaces inline content; only textblocks (paragraph, heading, task definition)
//!
//! ### set_attrs
//! - Shallow merge, unspecified attributes survive
//!
//! ### wrap / unwrap
//! - Wrap covers the document-order span of all ids
//! - Unwrap lifts the target's children into its parent

use lessonkit_model::{node_types, Block, BuildError, DocumentError, Inline};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use thiserror::Error;

/// Container types a `wrap` may introduce
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WrapperKind {
    Exercise,
    Group,
    Blockquote,
}

impl WrapperKind {
    pub fn node_type(&self) -> &'static str {
        match self {
            WrapperKind::Exercise => node_types::EXERCISE,
            WrapperKind::Group => node_types::GROUP,
            WrapperKind::Blockquote => node_types::BLOCKQUOTE,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum Operation {
    InsertAfter { id: String, block: Block },

    InsertBefore { id: String, block: Block },

    ReplaceBlock { id: String, block: Block },

    DeleteBlock { id: String },

    SetContent { id: String, content: Vec<Inline> },

    SetAttrs { id: String, attrs: Map<String, Value> },

    Wrap { ids: Vec<String>, wrapper: WrapperKind },

    Unwrap { id: String },
}

impl Operation {
    /// The `op` tag
    pub fn kind(&self) -> &'static str {
        match self {
            Operation::InsertAfter { .. } => "insert_after",
            Operation::InsertBefore { .. } => "insert_before",
            Operation::ReplaceBlock { .. } => "replace_block",
            Operation::DeleteBlock { .. } => "delete_block",
            Operation::SetContent { .. } => "set_content",
            Operation::SetAttrs { .. } => "set_attrs",
            Operation::Wrap { .. } => "wrap",
            Operation::Unwrap { .. } => "unwrap",
        }
    }

    /// Ids of the existing nodes this operation targets
    pub fn target_ids(&self) -> Vec<&str> {
        match self {
            Operation::InsertAfter { id, .. }
            | Operation::InsertBefore { id, .. }
            | Operation::ReplaceBlock { id, .. }
            | Operation::DeleteBlock { id }
            | Operation::SetContent { id, .. }
            | Operation::SetAttrs { id, .. }
            | Operation::Unwrap { id } => vec![id.as_str()],
            Operation::Wrap { ids, .. } => ids.iter().map(String::as_str).collect(),
        }
    }
}

/// Failure of a single operation; reported in its result, never raised past the batch
#[derive(Error, Debug, Clone, PartialEq)]
pub enum OperationError {
    #[error("Node with id '{0}' not found")]
    NodeNotFound(String),

    #[error("Nodes not found: {}", .0.join(", "))]
    NodesNotFound(Vec<String>),

    #[error("Unknown node type: {0}")]
    UnknownNodeType(String),

    #[error("Unknown mark type: {0}")]
    UnknownMarkType(String),

    #[error("Unknown wrapper type: {0}")]
    UnknownWrapperType(String),

    #[error("Node type '{0}' does not support inline content")]
    InlineContentUnsupported(String),

    #[error("Node '{0}' has no content to unwrap")]
    EmptyContent(String),

    #[error("Node '{id}' of type '{node_type}' holds inline content and cannot be unwrapped")]
    InlineContentUnwrap { id: String, node_type: String },

    #[error("Id '{id}' is used by {count} nodes")]
    DuplicateId { id: String, count: usize },

    #[error(transparent)]
    Document(#[from] DocumentError),
}

impl From<BuildError> for OperationError {
    fn from(e: BuildError) -> Self {
        match e {
            BuildError::UnknownNodeType(name) => OperationError::UnknownNodeType(name),
            BuildError::UnknownMarkType(name) => OperationError::UnknownMarkType(name),
        }
    }
}

/// Outcome of one submitted operation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OperationResult {
    pub success: bool,
    pub op: Operation,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl OperationResult {
    pub fn ok(op: Operation) -> Self {
        Self {
            success: true,
            op,
            error: None,
        }
    }

    pub fn failed(op: Operation, error: &OperationError) -> Self {
        Self {
            success: false,
            op,
            error: Some(error.to_string()),
        }
    }
}
