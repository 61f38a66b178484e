//! # Lessonkit Model
//!
//! The addressable tree a lesson is stored as, and the pieces that read
//! it: schema registry, concrete nodes, the [`DocumentHandle`] capability
//! an editing surface exposes, the node builder and the id resolver.
//!
//! ```text
//! Block / Inline (agent)  ──build──▶  Node  ──insert──▶  DocumentHandle
//!                                                            │
//!                                  find_node_by_id  ◀────────┘
//! ```

pub mod blocks;
pub mod builder;
pub mod document;
pub mod error;
pub mod handle;
pub mod id_generator;
pub mod node;
pub mod resolver;
pub mod schema;

pub use blocks::{Block, Inline, ListItem, MarkKind};
pub use builder::{build_block, build_blocks, build_inline, build_wrapper, merge_attrs};
pub use document::Document;
pub use error::{BuildError, DocumentError, DocumentResult};
pub use handle::{DocumentHandle, Walk};
pub use id_generator::IdGenerator;
pub use node::{Mark, Node};
pub use resolver::{
    count_nodes_with_id, find_duplicate_ids, find_node_by_id, find_nodes_by_ids, node_exists_by_id, FoundNode,
};
pub use schema::{node_types, ChildRule, ContentKind, NodeGroup, NodeSpec, Schema};
