use thiserror::Error;

pub type DocumentResult<T> = Result<T, DocumentError>;

/// Structural failures raised by a document handle
#[derive(Error, Debug, Clone, PartialEq)]
pub enum DocumentError {
    #[error("Position {pos} is outside the document (size {size})")]
    InvalidPosition { pos: usize, size: usize },

    #[error("Position {pos} does not fall between two nodes")]
    NotABoundary { pos: usize },

    #[error("No node starts at position {pos}")]
    NoNodeAt { pos: usize },

    #[error("Node type '{node_type}' cannot hold child nodes")]
    NotAContainer { node_type: String },

    #[error("Node type '{parent}' cannot contain '{child}'")]
    InvalidContent { parent: String, child: String },

    #[error("Node type '{parent}' must contain exactly: {expected}")]
    InvalidStructure { parent: String, expected: String },

    #[error("Id '{0}' is already used in the document")]
    IdInUse(String),

    #[error("Range {from}..{to} does not share a parent")]
    RangeCrossesParents { from: usize, to: usize },

    #[error("Invalid range {from}..{to}")]
    InvalidRange { from: usize, to: usize },

    #[error("Malformed document: {0}")]
    Malformed(String),
}

impl DocumentError {
    pub fn invalid_position(pos: usize, size: usize) -> Self {
        Self::InvalidPosition { pos, size }
    }

    pub fn not_a_container(node_type: impl Into<String>) -> Self {
        Self::NotAContainer {
            node_type: node_type.into(),
        }
    }
}

/// Failures while turning a declarative block into tree nodes
#[derive(Error, Debug, Clone, PartialEq)]
pub enum BuildError {
    #[error("Unknown node type: {0}")]
    UnknownNodeType(String),

    #[error("Unknown mark type: {0}")]
    UnknownMarkType(String),
}
