pub mod check;
pub mod edit;
pub mod serve;
pub mod tag;

pub use check::{check, CheckArgs};
pub use edit::{edit, EditArgs};
pub use serve::{serve, ServeArgs};
pub use tag::{tag, TagArgs};

use anyhow::{anyhow, Context, Result};
use std::fs;
use std::path::Path;
use visedit_editor::{Document, EditorError};
use visedit_parser::{format_error, ParseError};

/// Load and tag a document, printing parse failures with source context
pub(crate) fn load_document(path: &Path) -> Result<Document> {
    let source = fs::read_to_string(path).with_context(|| format!("Failed to read {}", path.display()))?;

    match Document::from_source(path.to_path_buf(), source.clone()) {
        Ok(doc) => Ok(doc),
        Err(EditorError::Parse(err)) => Err(report_parse_error(path, &source, &err)),
        Err(err) => Err(err.into()),
    }
}

pub(crate) fn report_parse_error(path: &Path, source: &str, err: &ParseError) -> anyhow::Error {
    eprintln!("{}", format_error(source, &path.to_string_lossy(), err));
    let (line, column) = err.line_col(source);
    anyhow!("Failed to parse {}:{}:{}", path.display(), line, column)
}

/// Print the document, or write it back when it changed
pub(crate) fn emit(doc: &Document, original: &str, write: bool) -> Result<bool> {
    if !write {
        print!("{}", doc.source());
        return Ok(false);
    }

    if doc.source() == original {
        return Ok(false);
    }
    fs::write(&doc.path, doc.source()).with_context(|| format!("Failed to write {}", doc.path.display()))?;
    tracing::debug!("Wrote {} ({} bytes)", doc.path.display(), doc.source().len());
    Ok(true)
}
