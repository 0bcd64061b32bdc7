//! # Document Handle
//!
//! A Document is the markup text, its parsed tree and the identifier index,
//! kept mutually consistent.
//!
//! ## Lifecycle
//!
//! ```text
//! Parse → Tag → Print → Mutate → Print ...
//!   ↓      ↓      ↓        ↓
//!  AST   UIDs   text    AST first, text re-derived
//! ```
//!
//! The tree is the source of truth: the text is always the lossless print of
//! the tree against the text it was last parsed from. Replacing the text
//! wholesale reparses and re-tags, continuing the identifier counter.

use crate::mutations::{inline_style, text_content, ElementUpdate, Mutation, MutationError, MutationResult};
use crate::tagger::{build_index, IdentityTagger, UidIndex};
use crate::EditorError;
use serde::Serialize;
use std::path::{Path, PathBuf};
use visedit_common::StyleMap;
use visedit_parser::ast::{Document as AstDocument, Element};
use visedit_parser::{parse_with_path, print, IDGenerator, Parser};

/// Path used for documents that don't come from a file
pub const UNTITLED_PATH: &str = "untitled.jsx";

/// Editable markup document
#[derive(Debug)]
pub struct Document {
    /// Path to source file (or [`UNTITLED_PATH`])
    pub path: PathBuf,

    /// Current version number (increments on each applied change)
    version: u64,

    /// Text the tree's spans refer to (last parsed text)
    base: String,

    /// Current text: `print(base, ast)`
    source: String,

    ast: AstDocument,
    index: UidIndex,
    tagger: IdentityTagger,
    ids: IDGenerator,
}

/// Current text content and inline style of one element
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NodePreview {
    pub uid: String,
    pub text: String,
    pub style: StyleMap,
}

impl Document {
    /// Parse and tag `source`
    pub fn from_source(path: PathBuf, source: String) -> Result<Self, EditorError> {
        let (ast, ids) = parse_tracked(&path, &source)?;

        let mut doc = Self {
            path,
            version: 0,
            base: source,
            source: String::new(),
            ast,
            index: UidIndex::new(),
            tagger: IdentityTagger::new(),
            ids,
        };
        doc.retag();

        tracing::info!(
            "Loaded {} ({} elements, {} bytes)",
            doc.path.display(),
            doc.index.len(),
            doc.source.len()
        );
        Ok(doc)
    }

    /// In-memory document from text
    pub fn initialize(source: impl Into<String>) -> Result<Self, EditorError> {
        Self::from_source(PathBuf::from(UNTITLED_PATH), source.into())
    }

    /// Load document from file
    pub fn load(path: impl AsRef<Path>) -> Result<Self, EditorError> {
        let path = path.as_ref().to_path_buf();
        let source = std::fs::read_to_string(&path)?;
        Self::from_source(path, source)
    }

    /// Replace the text wholesale.
    ///
    /// Existing identifiers are kept, untagged elements get fresh ones from the
    /// same counter. On a parse failure the current document stays as it was.
    pub fn replace_source(&mut self, source: String) -> Result<(), EditorError> {
        let (ast, ids) = parse_tracked(&self.path, &source)?;
        self.base = source;
        self.ast = ast;
        self.ids = ids;
        self.retag();
        self.version += 1;

        tracing::info!("Replaced source of {} (version {})", self.path.display(), self.version);
        Ok(())
    }

    /// Tag the freshly parsed tree and derive the text from it
    fn retag(&mut self) {
        let report = self.tagger.tag(&mut self.ast, &mut self.ids);
        self.source = if report.modified() {
            print(&self.base, &self.ast)
        } else {
            self.base.clone()
        };
        self.index = report.index;
    }

    /// Apply a partial update `{ text?, style? }` to the element `uid`.
    ///
    /// Unknown identifiers and empty updates are no-ops. All parts of the
    /// update are validated before anything changes; the text is re-printed
    /// once at the end.
    pub fn update(&mut self, uid: &str, update: &ElementUpdate) -> Result<MutationResult, MutationError> {
        if update.is_empty() {
            return Ok(MutationResult::Noop {
                reason: "empty update".to_string(),
            });
        }
        self.apply_all(uid, &update.to_mutations(uid))
    }

    /// Apply a single mutation
    pub fn apply(&mut self, mutation: &Mutation) -> Result<MutationResult, MutationError> {
        self.apply_all(mutation.uid(), std::slice::from_ref(mutation))
    }

    fn apply_all(&mut self, uid: &str, mutations: &[Mutation]) -> Result<MutationResult, MutationError> {
        let path = match self.index.get(uid) {
            Some(path) => path.to_vec(),
            None => {
                tracing::debug!("Ignoring update for unknown element {}", uid);
                return Ok(MutationResult::Noop {
                    reason: format!("unknown element {}", uid),
                });
            }
        };

        let element = match self.ast.element_at_mut(&path) {
            Some(element) => element,
            None => {
                tracing::warn!("Index entry for {} points at {:?}, which no longer exists", uid, path);
                return Ok(MutationResult::Noop {
                    reason: format!("unknown element {}", uid),
                });
            }
        };

        for mutation in mutations {
            mutation.validate(element)?;
        }

        for mutation in mutations {
            mutation.apply(element, &mut self.ids)?;
        }

        // Replaced children or style values may have held markup, which moves later paths
        let previous = self.index.len();
        self.index = build_index(&self.ast);
        if previous > self.index.len() {
            tracing::debug!(
                "Dropped {} nested elements of {} from the index",
                previous - self.index.len(),
                uid
            );
        }

        self.source = print(&self.base, &self.ast);
        self.version += 1;

        tracing::info!(
            "Applied {} mutation(s) to {} (version {})",
            mutations.len(),
            uid,
            self.version
        );
        Ok(MutationResult::Applied {
            version: self.version,
        })
    }

    /// Current annotated text
    pub fn source(&self) -> &str {
        &self.source
    }

    pub fn ast(&self) -> &AstDocument {
        &self.ast
    }

    pub fn index(&self) -> &UidIndex {
        &self.index
    }

    pub fn version(&self) -> u64 {
        self.version
    }

    pub fn contains(&self, uid: &str) -> bool {
        self.index.contains(uid)
    }

    pub fn element(&self, uid: &str) -> Option<&Element> {
        self.index
            .get(uid)
            .and_then(|path| self.ast.element_at(path))
    }

    /// Inline style of `uid`; `None` for unknown elements or non-literal styles
    pub fn inline_style(&self, uid: &str) -> Option<StyleMap> {
        self.element(uid).and_then(inline_style)
    }

    /// Text and inline style of `uid` for property panels
    pub fn node_preview(&self, uid: &str) -> Option<NodePreview> {
        let element = self.element(uid)?;
        Some(NodePreview {
            uid: uid.to_string(),
            text: text_content(element),
            style: inline_style(element).unwrap_or_default(),
        })
    }
}

fn parse_tracked(path: &Path, source: &str) -> Result<(AstDocument, IDGenerator), EditorError> {
    let path = path.to_string_lossy();
    let mut parser = Parser::new(source, IDGenerator::new(&path));
    let ast = parser.parse_document()?;
    Ok((ast, parser.into_id_generator()))
}

/// Parse without tagging, for callers that only need to validate text
pub fn check_source(path: &Path, source: &str) -> Result<(), EditorError> {
    parse_with_path(source, &path.to_string_lossy())?;
    Ok(())
}
