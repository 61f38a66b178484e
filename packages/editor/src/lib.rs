//! # Lessonkit Editor
//!
//! Semantic operation engine for lesson documents.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────┐
//! │ agent: raw instruction list (untrusted)     │
//! └─────────────────────────────────────────────┘
//!                     ↓
//! ┌─────────────────────────────────────────────┐
//! │ validator: whole batch accepted or rejected │
//! └─────────────────────────────────────────────┘
//!                     ↓
//! ┌─────────────────────────────────────────────┐
//! │ executor: per-operation isolation           │
//! │  - resolve ids (model::resolver)            │
//! │  - build nodes (model::builder)             │
//! │  - mutate through DocumentHandle            │
//! └─────────────────────────────────────────────┘
//!                     ↓
//! ┌─────────────────────────────────────────────┐
//! │ OperationResult per operation, same order   │
//! └─────────────────────────────────────────────┘
//! ```
//!
//! ## Core Principles
//!
//! 1. **Validate before mutate**: malformed batches never reach the document
//! 2. **Partial success**: one failing operation never aborts the batch
//! 3. **No rollback**: the document keeps the effects of what succeeded
//! 4. **Stateless executor**: all state lives in the document
//!
//! ## Usage
//!
//! ```rust,ignore
//! use lessonkit_editor::{parse_operations, Executor};
//! use lessonkit_model::{Document, Schema};
//!
//! let mut doc = Document::from_json(Schema::lesson(), lesson_json)?;
//! let operations = parse_operations(agent_output)?;
//!
//! let results = Executor::default().apply_operations(&mut doc, &operations);
//! for result in results.iter().filter(|r| !r.success) {
//!     eprintln!("{}: {:?}", result.op.kind(), result.error);
//! }
//! ```

mod document;
mod errors;
mod executor;
mod operations;
mod undo_stack;
mod validator;

pub use document::{DocumentStorage, LessonDocument};
pub use errors::EditorError;
pub use executor::{apply_operation, apply_operations, DuplicatePolicy, EditorOptions, Executor};
pub use operations::{Operation, OperationError, OperationResult, WrapperKind};
pub use undo_stack::{HistoryEntry, UndoStack};
pub use validator::{parse_operations, validate_operation, validate_operations, ValidationError};

// Re-export model types for convenience
pub use lessonkit_model::{Block, Document, DocumentHandle, Inline, Schema};
