//! Error types for the editor

use thiserror::Error;

#[derive(Error, Debug)]
pub enum EditorError {
    #[error("Parse error: {0}")]
    Parse(#[from] visedit_parser::ParseError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Mutation error: {0}")]
    Mutation(#[from] crate::mutations::MutationError),
}

impl EditorError {
    /// User-facing message; parse failures include line and column
    pub fn describe(&self, source: &str) -> String {
        match self {
            EditorError::Parse(err) => {
                let (line, column) = err.line_col(source);
                format!("{}:{}: {}", line, column, err.message())
            }
            other => other.to_string(),
        }
    }
}
