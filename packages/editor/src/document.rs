//! # Lesson Document Handle
//!
//! A lesson document plus its editing state.
//!
//! A LessonDocument can be:
//! - **Memory-backed**: built from a byte blob handed over by a document store
//! - **File-backed**: loaded from and saved to a JSON file on disk
//!
//! ## Lifecycle
//!
//! ```text
//! Load → Validate → Apply batch → Save
//!   ↓        ↓            ↓         ↓
//! Bytes  Operations    Results    Bytes
//! ```

use crate::errors::EditorError;
use crate::executor::{EditorOptions, Executor};
use crate::operations::{Operation, OperationResult};
use crate::undo_stack::UndoStack;
use crate::validator::parse_operations;
use lessonkit_model::{Document, IdGenerator, Schema};
use std::path::PathBuf;

/// Backing storage for a lesson document
#[derive(Debug)]
pub enum DocumentStorage {
    /// In-memory only
    Memory { doc: Document },

    /// File-backed
    File { doc: Document, dirty: bool },
}

impl DocumentStorage {
    fn doc_mut(&mut self) -> &mut Document {
        match self {
            DocumentStorage::Memory { doc } | DocumentStorage::File { doc, .. } => doc,
        }
    }

    fn mark_dirty(&mut self) {
        if let DocumentStorage::File { dirty, .. } = self {
            *dirty = true;
        }
    }
}

/// Editable lesson document
#[derive(Debug)]
pub struct LessonDocument {
    /// Path or store key the document came from
    pub path: PathBuf,

    /// Current version number (increments on each applied batch)
    pub version: u64,

    storage: DocumentStorage,
    executor: Executor,
    history: UndoStack,
}

impl LessonDocument {
    /// Create a memory-backed document from a store blob
    pub fn from_bytes(path: PathBuf, bytes: &[u8], options: EditorOptions) -> Result<Self, EditorError> {
        let doc = Self::open(&path, bytes, &options)?;
        Ok(Self::with_storage(path, DocumentStorage::Memory { doc }, options))
    }

    /// Load a file-backed document
    pub fn load(path: PathBuf, options: EditorOptions) -> Result<Self, EditorError> {
        let bytes = std::fs::read(&path)?;
        let doc = Self::open(&path, &bytes, &options)?;
        Ok(Self::with_storage(path, DocumentStorage::File { doc, dirty: false }, options))
    }

    fn open(path: &std::path::Path, bytes: &[u8], options: &EditorOptions) -> Result<Document, EditorError> {
        let ids = IdGenerator::new(&options.id_prefix, &path.to_string_lossy());
        let mut doc = Document::from_slice(Schema::lesson(), bytes)?.with_id_generator(ids);
        doc.assign_missing_ids();
        Ok(doc)
    }

    fn with_storage(path: PathBuf, storage: DocumentStorage, options: EditorOptions) -> Self {
        let history = UndoStack::with_max_levels(options.max_undo_levels);
        Self {
            path,
            version: 0,
            storage,
            executor: Executor::new(options),
            history,
        }
    }

    pub fn document(&self) -> &Document {
        match &self.storage {
            DocumentStorage::Memory { doc } | DocumentStorage::File { doc, .. } => doc,
        }
    }

    /// Apply an already validated batch; a batch where nothing succeeded
    /// leaves version and dirty state alone
    pub fn apply_batch(&mut self, operations: &[Operation]) -> Vec<OperationResult> {
        let results = self.history.apply(&self.executor, self.storage.doc_mut(), operations);
        if results.iter().any(|r| r.success) {
            self.version += 1;
            self.storage.mark_dirty();
        }
        results
    }

    /// Validate a batch in its JSON transit form, then apply it
    pub fn apply_json(&mut self, json: &str) -> Result<Vec<OperationResult>, EditorError> {
        let operations = parse_operations(json)?;
        Ok(self.apply_batch(&operations))
    }

    pub fn undo(&mut self) -> Result<(), EditorError> {
        if !self.history.undo(self.storage.doc_mut())? {
            return Err(EditorError::NothingToUndo);
        }
        self.version += 1;
        self.storage.mark_dirty();
        Ok(())
    }

    pub fn redo(&mut self) -> Result<(), EditorError> {
        if !self.history.redo(self.storage.doc_mut())? {
            return Err(EditorError::NothingToRedo);
        }
        self.version += 1;
        self.storage.mark_dirty();
        Ok(())
    }

    pub fn history(&self) -> &UndoStack {
        &self.history
    }

    /// Check if document has unsaved changes
    pub fn is_dirty(&self) -> bool {
        match &self.storage {
            DocumentStorage::File { dirty, .. } => *dirty,
            _ => false,
        }
    }

    /// Whole-document blob for an external store
    pub fn to_bytes(&self) -> Result<Vec<u8>, EditorError> {
        Ok(self.document().to_bytes()?)
    }

    /// Save document to disk (if file-backed)
    pub fn save(&mut self) -> Result<(), EditorError> {
        match &mut self.storage {
            DocumentStorage::File { doc, dirty } => {
                let bytes = serde_json::to_vec_pretty(doc.root())?;
                std::fs::write(&self.path, bytes)?;
                *dirty = false;
                Ok(())
            }
            _ => Err(EditorError::NotFileBacked),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use lessonkit_model::find_node_by_id;

    const LESSON: &str = r#"{
        "type": "doc",
        "content": [
            { "type": "paragraph", "attrs": { "id": "p1" }, "content": [{ "type": "text", "text": "Hello" }] },
            { "type": "horizontalRule" }
        ]
    }"#;

    fn memory_doc() -> LessonDocument {
        LessonDocument::from_bytes(PathBuf::from("lesson.json"), LESSON.as_bytes(), EditorOptions::default()).unwrap()
    }

    #[test]
    fn test_open_assigns_missing_ids() {
        let doc = memory_doc();
        assert_eq!(doc.version, 0);
        assert!(!doc.is_dirty());

        let hr = &doc.document().root().content[1];
        assert!(hr.id().unwrap().starts_with("lk-"));
    }

    #[test]
    fn test_apply_json_increments_version() {
        let mut doc = memory_doc();
        let results = doc
            .apply_json(r#"[{"op":"set_content","id":"p1","content":[{"type":"text","text":"Goodbye"}]}]"#)
            .unwrap();

        assert!(results[0].success);
        assert_eq!(doc.version, 1);
        let p1 = find_node_by_id(doc.document(), "p1").unwrap();
        assert_eq!(p1.node.text_content(), "Goodbye");
    }

    #[test]
    fn test_invalid_batch_is_not_applied() {
        let mut doc = memory_doc();
        let result = doc.apply_json(r#"[{"op":"delete_block","id":"p1"},{"op":"explode"}]"#);

        assert!(matches!(result, Err(EditorError::Validation(_))));
        assert_eq!(doc.version, 0);
        assert!(find_node_by_id(doc.document(), "p1").is_some());
    }

    #[test]
    fn test_failed_batch_keeps_version() {
        let mut doc = memory_doc();
        let results = doc.apply_batch(&[Operation::DeleteBlock { id: "nope".to_string() }]);

        assert!(!results[0].success);
        assert_eq!(doc.version, 0);
        assert_eq!(doc.history().undo_levels(), 0);
    }

    #[test]
    fn test_undo_redo() {
        let mut doc = memory_doc();
        doc.apply_batch(&[Operation::DeleteBlock { id: "p1".to_string() }]);
        assert!(find_node_by_id(doc.document(), "p1").is_none());

        doc.undo().unwrap();
        assert!(find_node_by_id(doc.document(), "p1").is_some());

        doc.redo().unwrap();
        assert!(find_node_by_id(doc.document(), "p1").is_none());

        assert!(matches!(doc.redo(), Err(EditorError::NothingToRedo)));
    }

    #[test]
    fn test_memory_document_cannot_save() {
        let mut doc = memory_doc();
        assert!(matches!(doc.save(), Err(EditorError::NotFileBacked)));
    }
}
