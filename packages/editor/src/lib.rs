//! # Visedit Editor
//!
//! Core document editing engine.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────┐
//! │ parser: markup text → AST with spans        │
//! └─────────────────────────────────────────────┘
//!                     ↓
//! ┌─────────────────────────────────────────────┐
//! │ editor: Document lifecycle + mutations      │
//! │  - Tag elements with stable identifiers     │
//! │  - Index identifier → element               │
//! │  - Apply text/style updates by identifier   │
//! │  - Re-print with original formatting        │
//! └─────────────────────────────────────────────┘
//!                     ↓
//! ┌─────────────────────────────────────────────┐
//! │ preview: render surface protocol            │
//! └─────────────────────────────────────────────┘
//! ```
//!
//! ## Core Principles
//!
//! 1. **AST is source of truth**: the text is a derived, lossless print
//! 2. **Identifiers live in the source**: `data-uid` survives every round trip
//! 3. **Minimal diffs**: untouched regions of the text stay byte-identical
//!
//! ## Usage
//!
//! ```rust,ignore
//! use visedit_editor::{Document, ElementUpdate};
//!
//! let mut doc = Document::initialize("<div>hi</div>")?;
//! assert_eq!(doc.source(), r#"<div data-uid="el-0">hi</div>"#);
//!
//! doc.update("el-0", &ElementUpdate::text("bye"))?;
//! assert_eq!(doc.source(), r#"<div data-uid="el-0">bye</div>"#);
//! ```

mod coalescer;
mod document;
mod errors;
mod mutations;
mod session;
pub mod tagger;

pub use coalescer::{ApplyFn, EditCoalescer, PendingUpdate, DEFAULT_QUIESCENCE};
pub use document::{check_source, Document, NodePreview, UNTITLED_PATH};
pub use errors::EditorError;
pub use mutations::{inline_style, text_content, ElementUpdate, Mutation, MutationError, MutationResult};
pub use session::EditSession;
pub use tagger::{IdentityTagger, TagReport, UidIndex, UID_ATTRIBUTE, UID_PREFIX};

// Re-export common types for convenience
pub use visedit_common::StyleMap;
pub use visedit_parser::ast::Document as ASTDocument;
