//! Folio Parser Library
//!
//! Renders content bodies from markdown to HTML fragments.

pub mod markdown;
pub mod syntax;

pub use markdown::{MarkdownParser, ParsedContent, RenderedBody, TocEntry};
pub use syntax::SyntaxHighlighter;
use thiserror::Error;

/// Parser errors.
#[derive(Debug, Error)]
pub enum ParserError {
    /// Front matter could not be split or deserialized.
    #[error(transparent)]
    FrontMatter(#[from] folio_core::CoreError),
}

impl ParserError {
    /// Line in the source document the error points at, if known.
    pub fn line(&self) -> Option<usize> {
        match self {
            Self::FrontMatter(e) => e.line(),
        }
    }
}

/// Result type for parser operations.
pub type Result<T> = std::result::Result<T, ParserError>;
