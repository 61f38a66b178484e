//! # Undo/Redo Stack
//!
//! Tracks applied batches and enables undo/redo.
//!
//! ## Design
//!
//! - A batch is one undo step, however many operations it holds
//! - The tree is snapshotted before and after each batch that changed something
//! - Undo restores the snapshot taken before, redo the one taken after
//! - New batches clear the redo stack

use crate::executor::Executor;
use crate::operations::{Operation, OperationResult};
use lessonkit_model::{Document, DocumentResult, Node};

/// One applied batch
#[derive(Debug, Clone)]
pub struct HistoryEntry {
    /// The operations in application order
    pub operations: Vec<Operation>,

    /// Tree before the batch
    pub before: Node,

    /// Tree after the batch
    pub after: Node,
}

/// Undo/redo stack for document editing
#[derive(Debug)]
pub struct UndoStack {
    /// Applied batches (most recent last)
    undo_stack: Vec<HistoryEntry>,

    /// Undone batches (most recent last)
    redo_stack: Vec<HistoryEntry>,

    /// Maximum number of undo levels (0 = unlimited)
    max_levels: usize,
}

impl UndoStack {
    /// Create a new undo stack with default max levels (100)
    pub fn new() -> Self {
        Self::with_max_levels(100)
    }

    pub fn with_max_levels(max_levels: usize) -> Self {
        Self {
            undo_stack: Vec::new(),
            redo_stack: Vec::new(),
            max_levels,
        }
    }

    /// Apply a batch and record it for undo if any operation succeeded
    pub fn apply(&mut self, executor: &Executor, doc: &mut Document, operations: &[Operation]) -> Vec<OperationResult> {
        let before = doc.root().clone();
        let results = executor.apply_operations(doc, operations);

        if results.iter().any(|r| r.success) {
            self.push(HistoryEntry {
                operations: operations.to_vec(),
                before,
                after: doc.root().clone(),
            });
        }

        results
    }

    fn push(&mut self, entry: HistoryEntry) {
        self.undo_stack.push(entry);
        self.redo_stack.clear();

        if self.max_levels > 0 && self.undo_stack.len() > self.max_levels {
            self.undo_stack.remove(0);
        }
    }

    /// Undo the most recent batch; false if there was nothing to undo
    pub fn undo(&mut self, doc: &mut Document) -> DocumentResult<bool> {
        let Some(entry) = self.undo_stack.pop() else {
            return Ok(false);
        };

        doc.set_root(entry.before.clone())?;
        self.redo_stack.push(entry);
        Ok(true)
    }

    /// Redo the most recently undone batch; false if there was nothing to redo
    pub fn redo(&mut self, doc: &mut Document) -> DocumentResult<bool> {
        let Some(entry) = self.redo_stack.pop() else {
            return Ok(false);
        };

        doc.set_root(entry.after.clone())?;
        self.undo_stack.push(entry);
        Ok(true)
    }

    pub fn can_undo(&self) -> bool {
        !self.undo_stack.is_empty()
    }

    pub fn can_redo(&self) -> bool {
        !self.redo_stack.is_empty()
    }

    pub fn undo_levels(&self) -> usize {
        self.undo_stack.len()
    }

    pub fn redo_levels(&self) -> usize {
        self.redo_stack.len()
    }

    pub fn clear(&mut self) {
        self.undo_stack.clear();
        self.redo_stack.clear();
    }
}

impl Default for UndoStack {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use lessonkit_model::{find_node_by_id, Block, Schema};

    fn doc() -> Document {
        Document::from_blocks(
            Schema::lesson(),
            &[Block::Paragraph {
                id: Some("p1".to_string()),
                content: vec![],
            }],
        )
        .unwrap()
    }

    #[test]
    fn test_failed_batch_is_not_recorded() {
        let mut doc = doc();
        let mut stack = UndoStack::new();

        stack.apply(&Executor::default(), &mut doc, &[Operation::DeleteBlock { id: "nope".to_string() }]);
        assert_eq!(stack.undo_levels(), 0);
        assert!(!stack.undo(&mut doc).unwrap());
    }

    #[test]
    fn test_new_batch_clears_redo() {
        let mut doc = doc();
        let mut stack = UndoStack::new();
        let executor = Executor::default();

        let insert = Operation::InsertAfter {
            id: "p1".to_string(),
            block: Block::HorizontalRule {
                id: Some("hr1".to_string()),
            },
        };
        stack.apply(&executor, &mut doc, &[insert.clone()]);
        stack.undo(&mut doc).unwrap();
        assert!(find_node_by_id(&doc, "hr1").is_none());
        assert_eq!(stack.redo_levels(), 1);

        stack.apply(&executor, &mut doc, &[insert]);
        assert_eq!(stack.redo_levels(), 0);
        assert!(find_node_by_id(&doc, "hr1").is_some());
    }

    #[test]
    fn test_max_levels() {
        let mut doc = doc();
        let mut stack = UndoStack::with_max_levels(2);
        let executor = Executor::default();

        for i in 0..3 {
            let op = Operation::SetAttrs {
                id: "p1".to_string(),
                attrs: serde_json::json!({ "step": i }).as_object().cloned().unwrap_or_default(),
            };
            stack.apply(&executor, &mut doc, &[op]);
        }

        assert_eq!(stack.undo_levels(), 2);
        assert!(stack.can_undo());
        assert!(!stack.can_redo());
    }
}
