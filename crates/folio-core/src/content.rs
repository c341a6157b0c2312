//! Content types and structures.

use std::path::{Path, PathBuf};

use crate::{
    frontmatter::FrontMatterFormat,
    value::{Metadata, MetadataValue, Timestamp},
};

/// File extensions recognized as content documents.
pub const CONTENT_EXTENSIONS: &[&str] = &["md", "markdown"];

/// Whether a path looks like a content document.
pub fn is_content_file(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .is_some_and(|ext| {
            CONTENT_EXTENSIONS
                .iter()
                .any(|known| ext.eq_ignore_ascii_case(known))
        })
}

/// One authored unit of content: typed metadata plus the raw body.
///
/// Built once per input document and never mutated afterwards.
#[derive(Debug, Clone, PartialEq)]
pub struct ContentDocument {
    format: Option<FrontMatterFormat>,
    metadata: Metadata,
    body: String,
}

impl ContentDocument {
    /// Create a document from already separated parts.
    pub fn new(
        format: Option<FrontMatterFormat>,
        metadata: Metadata,
        body: impl Into<String>,
    ) -> Self {
        Self {
            format,
            metadata,
            body: body.into(),
        }
    }

    /// Format of the front matter block, `None` if the document had none.
    pub fn format(&self) -> Option<FrontMatterFormat> {
        self.format
    }

    pub fn metadata(&self) -> &Metadata {
        &self.metadata
    }

    /// Body text, byte-identical to the source after the closing delimiter.
    pub fn body(&self) -> &str {
        &self.body
    }

    /// Look up a single metadata value.
    pub fn get(&self, key: &str) -> Option<&MetadataValue> {
        self.metadata.get(key)
    }

    /// `title` when present and a string.
    pub fn title(&self) -> Option<&str> {
        self.get("title").and_then(MetadataValue::as_str)
    }

    /// `date` when present and a timestamp.
    pub fn date(&self) -> Option<&Timestamp> {
        self.get("date").and_then(MetadataValue::as_timestamp)
    }

    /// `draft = true` marks unpublished content.
    pub fn is_draft(&self) -> bool {
        self.get("draft")
            .and_then(MetadataValue::as_bool)
            .unwrap_or(false)
    }

    /// Split into owned parts.
    pub fn into_parts(self) -> (Metadata, String) {
        (self.metadata, self.body)
    }
}

/// Content path with slug extraction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContentPath {
    /// Original file path, relative to the content directory.
    pub path: PathBuf,

    /// URL slug derived from the path.
    pub slug: String,
}

impl ContentPath {
    /// Parse a relative content path into a slug.
    ///
    /// - `posts/hello.md` → `posts/hello`
    /// - `posts/hello/index.md` → `posts/hello`
    /// - `_index.md` → `` (section index at the root)
    pub fn from_path(path: &Path) -> Option<Self> {
        if !is_content_file(path) {
            return None;
        }

        let stem = path.file_stem()?.to_str()?;
        let parent = path.parent().unwrap_or(Path::new(""));

        let slug = if stem == "index" || stem == "_index" {
            parent.to_string_lossy().to_string()
        } else if parent.as_os_str().is_empty() {
            stem.to_string()
        } else {
            format!("{}/{}", parent.display(), stem)
        };

        // Windows separators and stray slashes.
        let slug = slug.replace('\\', "/").trim_matches('/').to_string();

        Some(Self {
            path: path.to_path_buf(),
            slug,
        })
    }

    /// Get the URL path for this content.
    pub fn url_path(&self) -> String {
        if self.slug.is_empty() {
            "/".to_string()
        } else {
            format!("/{}/", self.slug)
        }
    }
}
