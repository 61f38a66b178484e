//! # Operation Executor
//!
//! Applies validated operations to a live document in array order. Each
//! operation succeeds or fails on its own: a failure becomes a result
//! entry and the next operation still runs. There is no rollback; the
//! document keeps every effect of the operations that succeeded.

use crate::operations::{Operation, OperationError, OperationResult, WrapperKind};
use lessonkit_model::{
    build_block, build_inline, build_wrapper, count_nodes_with_id, find_node_by_id, find_nodes_by_ids, merge_attrs,
    Block, BuildError, DocumentError, DocumentHandle, Inline, Node,
};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::HashSet;
use tracing::{debug, info, instrument, warn};

/// What to do when a targeted id occurs on more than one node
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum DuplicatePolicy {
    /// Use the first node in document order
    #[default]
    FirstMatch,
    /// Fail the operation
    Reject,
}

#[derive(Debug, Clone)]
pub struct EditorOptions {
    pub duplicate_ids: DuplicatePolicy,

    /// Prefix for ids generated on insertion
    pub id_prefix: String,

    /// Maximum number of undo levels (0 = unlimited)
    pub max_undo_levels: usize,
}

impl Default for EditorOptions {
    fn default() -> Self {
        Self {
            duplicate_ids: DuplicatePolicy::FirstMatch,
            id_prefix: "lk".to_string(),
            max_undo_levels: 100,
        }
    }
}

/// Stateless between calls; all state lives in the document
#[derive(Debug, Clone, Default)]
pub struct Executor {
    options: EditorOptions,
}

impl Executor {
    pub fn new(options: EditorOptions) -> Self {
        Self { options }
    }

    pub fn options(&self) -> &EditorOptions {
        &self.options
    }

    /// Apply a batch, returning one result per operation in the same order
    #[instrument(skip_all, fields(ops = operations.len()))]
    pub fn apply_operations<D: DocumentHandle + ?Sized>(
        &self,
        doc: &mut D,
        operations: &[Operation],
    ) -> Vec<OperationResult> {
        let mut results = Vec::with_capacity(operations.len());

        for (index, operation) in operations.iter().enumerate() {
            debug!(index, op = operation.kind(), "Applying operation");

            match self.execute(doc, operation) {
                Ok(()) => results.push(OperationResult::ok(operation.clone())),
                Err(e) => {
                    warn!(index, op = operation.kind(), error = %e, "Operation failed");
                    results.push(OperationResult::failed(operation.clone(), &e));
                }
            }
        }

        let succeeded = results.iter().filter(|r| r.success).count();
        info!(
            total = results.len(),
            succeeded,
            failed = results.len() - succeeded,
            "Operation batch applied"
        );

        results
    }

    /// Apply a single operation as a batch of one
    pub fn apply_operation<D: DocumentHandle + ?Sized>(&self, doc: &mut D, operation: &Operation) -> OperationResult {
        let mut results = self.apply_operations(doc, std::slice::from_ref(operation));
        // one result per operation
        results.remove(0)
    }

    fn execute<D: DocumentHandle + ?Sized>(&self, doc: &mut D, operation: &Operation) -> Result<(), OperationError> {
        match operation {
            Operation::InsertAfter { id, block } => self.insert_after(doc, id, block),
            Operation::InsertBefore { id, block } => self.insert_before(doc, id, block),
            Operation::ReplaceBlock { id, block } => self.replace_block(doc, id, block),
            Operation::DeleteBlock { id } => self.delete_block(doc, id),
            Operation::SetContent { id, content } => self.set_content(doc, id, content),
            Operation::SetAttrs { id, attrs } => self.set_attrs(doc, id, attrs),
            Operation::Wrap { ids, wrapper } => self.wrap(doc, ids, *wrapper),
            Operation::Unwrap { id } => self.unwrap(doc, id),
        }
    }

    fn check_unique<D: DocumentHandle + ?Sized>(&self, doc: &D, id: &str) -> Result<(), OperationError> {
        if self.options.duplicate_ids == DuplicatePolicy::Reject {
            let count = count_nodes_with_id(doc, id);
            if count > 1 {
                return Err(OperationError::DuplicateId {
                    id: id.to_string(),
                    count,
                });
            }
        }
        Ok(())
    }

    /// Position and a copy of the node carrying `id`
    fn locate<D: DocumentHandle + ?Sized>(&self, doc: &D, id: &str) -> Result<(usize, Node), OperationError> {
        let found = find_node_by_id(doc, id).ok_or_else(|| OperationError::NodeNotFound(id.to_string()))?;
        let located = (found.pos, found.node.clone());
        self.check_unique(doc, id)?;
        Ok(located)
    }

    fn insert_after<D: DocumentHandle + ?Sized>(&self, doc: &mut D, id: &str, block: &Block) -> Result<(), OperationError> {
        let (pos, node) = self.locate(doc, id)?;
        let built = build_block(doc.schema(), block)?;
        doc.insert(pos + node.node_size(), vec![built])?;
        Ok(())
    }

    fn insert_before<D: DocumentHandle + ?Sized>(&self, doc: &mut D, id: &str, block: &Block) -> Result<(), OperationError> {
        let (pos, _) = self.locate(doc, id)?;
        let built = build_block(doc.schema(), block)?;
        doc.insert(pos, vec![built])?;
        Ok(())
    }

    fn replace_block<D: DocumentHandle + ?Sized>(&self, doc: &mut D, id: &str, block: &Block) -> Result<(), OperationError> {
        let (pos, node) = self.locate(doc, id)?;
        let built = build_block(doc.schema(), block)?;
        doc.replace_with(pos, pos + node.node_size(), vec![built])?;
        Ok(())
    }

    fn delete_block<D: DocumentHandle + ?Sized>(&self, doc: &mut D, id: &str) -> Result<(), OperationError> {
        let (pos, node) = self.locate(doc, id)?;
        doc.delete(pos, pos + node.node_size())?;
        Ok(())
    }

    fn set_content<D: DocumentHandle + ?Sized>(
        &self,
        doc: &mut D,
        id: &str,
        content: &[Inline],
    ) -> Result<(), OperationError> {
        let (pos, node) = self.locate(doc, id)?;

        let is_textblock = doc
            .schema()
            .node_type(&node.node_type)
            .is_some_and(|spec| spec.is_textblock());
        if !is_textblock {
            return Err(OperationError::InlineContentUnsupported(node.node_type));
        }

        // a textblock spans at least its opening and closing boundary
        if node.node_size() < 2 {
            return Err(DocumentError::Malformed(format!("textblock '{}' has no content boundaries", id)).into());
        }

        let inline = build_inline(doc.schema(), content)?;
        let end = pos + node.node_size();
        doc.replace_with(pos + 1, end - 1, inline)?;
        Ok(())
    }

    fn set_attrs<D: DocumentHandle + ?Sized>(
        &self,
        doc: &mut D,
        id: &str,
        attrs: &Map<String, Value>,
    ) -> Result<(), OperationError> {
        let (pos, node) = self.locate(doc, id)?;
        doc.set_node_attrs(pos, merge_attrs(&node.attrs, attrs))?;
        Ok(())
    }

    fn wrap<D: DocumentHandle + ?Sized>(
        &self,
        doc: &mut D,
        ids: &[String],
        wrapper: WrapperKind,
    ) -> Result<(), OperationError> {
        let found = find_nodes_by_ids(doc, ids);

        let found_ids: HashSet<&str> = found.iter().filter_map(|f| f.node.id()).collect();
        let missing: Vec<String> = ids
            .iter()
            .filter(|id| !found_ids.contains(id.as_str()))
            .cloned()
            .collect();
        if !missing.is_empty() {
            return Err(OperationError::NodesNotFound(missing));
        }

        // first match per id, still in document order
        let mut seen = HashSet::new();
        let mut span: Option<(usize, usize)> = None;
        for f in &found {
            let Some(id) = f.node.id() else { continue };
            if !seen.insert(id) {
                if self.options.duplicate_ids == DuplicatePolicy::Reject {
                    return Err(OperationError::DuplicateId {
                        id: id.to_string(),
                        count: found.iter().filter(|other| other.node.id() == Some(id)).count(),
                    });
                }
                continue;
            }
            span = Some(match span {
                Some((from, to)) => (from.min(f.pos), to.max(f.end())),
                None => (f.pos, f.end()),
            });
        }

        let Some((from, to)) = span else {
            return Err(OperationError::NodesNotFound(ids.to_vec()));
        };

        let (from, to) = doc.block_range(from, to)?;
        let content = doc.slice(from, to)?;
        let wrapper_node = build_wrapper(doc.schema(), wrapper.node_type(), content).map_err(|e| match e {
            BuildError::UnknownNodeType(name) => OperationError::UnknownWrapperType(name),
            other => other.into(),
        })?;

        doc.replace_with(from, to, vec![wrapper_node])?;
        Ok(())
    }

    fn unwrap<D: DocumentHandle + ?Sized>(&self, doc: &mut D, id: &str) -> Result<(), OperationError> {
        let (pos, node) = self.locate(doc, id)?;

        if node.content.is_empty() {
            return Err(OperationError::EmptyContent(id.to_string()));
        }

        let is_textblock = doc
            .schema()
            .node_type(&node.node_type)
            .is_some_and(|spec| spec.is_textblock());
        if is_textblock || node.content.iter().any(Node::is_text) {
            return Err(OperationError::InlineContentUnwrap {
                id: id.to_string(),
                node_type: node.node_type,
            });
        }

        let end = pos + node.node_size();
        doc.replace_with(pos, end, node.content)?;
        Ok(())
    }
}

/// Apply a batch with default options
pub fn apply_operations<D: DocumentHandle + ?Sized>(doc: &mut D, operations: &[Operation]) -> Vec<OperationResult> {
    Executor::default().apply_operations(doc, operations)
}

/// Apply one operation with default options
pub fn apply_operation<D: DocumentHandle + ?Sized>(doc: &mut D, operation: &Operation) -> OperationResult {
    Executor::default().apply_operation(doc, operation)
}

#[cfg(test)]
mod tests {
    use super::*;
    use lessonkit_model::{DocumentResult, Schema, Walk};
    use serde_json::json;

    /// Flat handle over unchecked nodes, for trees `Document` would refuse
    struct RawTree {
        nodes: Vec<Node>,
        schema: Schema,
    }

    impl DocumentHandle for RawTree {
        fn schema(&self) -> &Schema {
            &self.schema
        }

        fn descendants<'a>(&'a self, f: &mut dyn FnMut(&'a Node, usize) -> Walk) {
            let mut pos = 0;
            for node in &self.nodes {
                if f(node, pos) == Walk::Stop {
                    return;
                }
                pos += node.node_size();
            }
        }

        fn node_at(&self, _pos: usize) -> Option<&Node> {
            None
        }

        fn replace_with(&mut self, from: usize, to: usize, _nodes: Vec<Node>) -> DocumentResult<Vec<Node>> {
            Err(DocumentError::InvalidRange { from, to })
        }

        fn slice(&self, from: usize, to: usize) -> DocumentResult<Vec<Node>> {
            Err(DocumentError::InvalidRange { from, to })
        }

        fn block_range(&self, from: usize, to: usize) -> DocumentResult<(usize, usize)> {
            Err(DocumentError::InvalidRange { from, to })
        }

        fn set_node_attrs(&mut self, pos: usize, _attrs: Map<String, Value>) -> DocumentResult<()> {
            Err(DocumentError::NoNodeAt { pos })
        }
    }

    #[test]
    fn test_set_content_on_sizeless_textblock_fails_cleanly() {
        let paragraph: Node =
            serde_json::from_value(json!({ "type": "paragraph", "attrs": { "id": "p1" }, "text": "" })).unwrap();
        let mut doc = RawTree {
            nodes: vec![paragraph],
            schema: Schema::lesson(),
        };

        let result = apply_operation(
            &mut doc,
            &Operation::SetContent {
                id: "p1".to_string(),
                content: vec![Inline::text("Goodbye")],
            },
        );

        assert!(!result.success);
        assert_eq!(
            result.error.as_deref(),
            Some("Malformed document: textblock 'p1' has no content boundaries")
        );
    }
}
