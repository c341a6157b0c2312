//! Error types for the Folio core library.

use std::path::PathBuf;

use thiserror::Error;

/// Result type alias using `CoreError`.
pub type Result<T> = std::result::Result<T, CoreError>;

/// Core error types for Folio.
#[derive(Error, Debug)]
pub enum CoreError {
    /// Configuration loading or parsing error.
    #[error("Configuration error: {message}")]
    Config {
        message: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// Opening front matter delimiter without a matching closing one.
    #[error("Malformed front matter in {path}: block opened at line {line} is never closed")]
    MalformedFrontMatter { path: PathBuf, line: usize },

    /// Front matter block content does not parse.
    #[error("Invalid metadata syntax in {path} at line {line}: {message}")]
    InvalidMetadataSyntax {
        path: PathBuf,
        line: usize,
        message: String,
    },

    /// Metadata could not be serialized back into a front matter block.
    #[error("Front matter render error: {0}")]
    Render(String),

    /// File system I/O error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Generic configuration crate error.
    #[error("Config crate error: {0}")]
    ConfigCrate(#[from] config::ConfigError),
}

impl CoreError {
    /// Create a new configuration error with a message.
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config {
            message: message.into(),
            source: None,
        }
    }

    /// Create a new configuration error with source.
    pub fn config_with_source(
        message: impl Into<String>,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        Self::Config {
            message: message.into(),
            source: Some(Box::new(source)),
        }
    }

    /// Create a new render error.
    pub fn render(message: impl Into<String>) -> Self {
        Self::Render(message.into())
    }

    /// Line number for document-level errors.
    pub fn line(&self) -> Option<usize> {
        match self {
            Self::MalformedFrontMatter { line, .. } | Self::InvalidMetadataSyntax { line, .. } => {
                Some(*line)
            }
            _ => None,
        }
    }
}
