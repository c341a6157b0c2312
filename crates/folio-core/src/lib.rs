//! Folio Core Library
//!
//! Front matter parsing, typed metadata, site configuration and error
//! handling for the Folio content pipeline.

pub mod config;
pub mod content;
pub mod error;
pub mod frontmatter;
pub mod value;
mod yaml;

pub use config::{Config, MarkdownConfig};
pub use content::{ContentDocument, ContentPath};
pub use error::{CoreError, Result};
pub use frontmatter::{FrontMatterError, FrontMatterFormat, parse, parse_document};
pub use value::{Metadata, MetadataValue, Timestamp};
