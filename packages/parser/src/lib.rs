pub mod ast;
pub mod error;
pub mod id_generator;
pub mod lossless_serializer;
pub mod parser;
pub mod serializer;
pub mod tokenizer;

#[cfg(test)]
mod tests_serializer;

pub use ast::*;
pub use error::{line_col, ParseError, ParseResult};
#[cfg(feature = "pretty-errors")]
pub use error::format_error;
pub use id_generator::{get_document_id, IDGenerator};
pub use lossless_serializer::{print, LosslessSerializer};
pub use parser::{parse, parse_with_path, Parser};
pub use serializer::{serialize, serialize_element, Serializer};
pub use tokenizer::{tokenize, Token};
