//! # Edit Session
//!
//! One user's editing state around a [`Document`]: the current selection and
//! the last error shown to the user. The host serializes every mutating call
//! through the session.

use crate::{Document, EditorError, ElementUpdate, MutationError, MutationResult, NodePreview};

pub struct EditSession {
    /// Document being edited
    document: Document,

    /// Identifier of the selected element, restored on every re-render
    selected: Option<String>,

    /// Last parse, mutation or render failure
    last_error: Option<String>,
}

impl EditSession {
    pub fn new(document: Document) -> Self {
        Self {
            document,
            selected: None,
            last_error: None,
        }
    }

    pub fn document(&self) -> &Document {
        &self.document
    }

    pub fn source(&self) -> &str {
        self.document.source()
    }

    /// Replace the document text.
    ///
    /// Success clears the selection and the last error; a parse failure is
    /// recorded as the last error and the previous document stays active.
    pub fn set_source(&mut self, source: String) -> Result<(), EditorError> {
        match self.document.replace_source(source.clone()) {
            Ok(()) => {
                self.selected = None;
                self.last_error = None;
                Ok(())
            }
            Err(err) => {
                let message = err.describe(&source);
                tracing::warn!("Rejected source update: {}", message);
                self.last_error = Some(message);
                Err(err)
            }
        }
    }

    /// Apply an update to one element
    pub fn apply_update(&mut self, uid: &str, update: &ElementUpdate) -> Result<MutationResult, MutationError> {
        match self.document.update(uid, update) {
            Ok(result) => {
                // The selected element may have been discarded with replaced children
                if let Some(selected) = &self.selected {
                    if !self.document.contains(selected) {
                        self.selected = None;
                    }
                }
                Ok(result)
            }
            Err(err) => {
                self.last_error = Some(err.to_string());
                Err(err)
            }
        }
    }

    /// Record a selection reported by the rendering surface; unknown identifiers are ignored
    pub fn select(&mut self, uid: &str) -> bool {
        if !self.document.contains(uid) {
            tracing::debug!("Ignoring selection of unknown element {}", uid);
            return false;
        }
        self.selected = Some(uid.to_string());
        true
    }

    pub fn clear_selection(&mut self) {
        self.selected = None;
    }

    pub fn selected(&self) -> Option<&str> {
        self.selected.as_deref()
    }

    /// Record a failure reported from outside the document (e.g. a render error)
    pub fn report_error(&mut self, message: impl Into<String>) {
        self.last_error = Some(message.into());
    }

    pub fn last_error(&self) -> Option<&str> {
        self.last_error.as_deref()
    }

    pub fn node_preview(&self, uid: &str) -> Option<NodePreview> {
        self.document.node_preview(uid)
    }
}
