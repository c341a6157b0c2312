//! Folio Generator Library
//!
//! Batch processing of a content directory.
//!
//! # Modules
//!
//! - [`collector`] - Content discovery, parallel parsing and error collection

pub mod collector;

pub use collector::{
    CollectedDocument, Collection, CollectorError, ContentCollector, DocumentError,
};
