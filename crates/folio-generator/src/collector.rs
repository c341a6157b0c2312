//! Content collection.
//!
//! Walks the content directory and parses every document in parallel. A
//! document that fails to read or parse is recorded as a [`DocumentError`]
//! and left out of the output; it never stops the rest of the batch.

use std::{
    collections::HashMap,
    fmt, fs,
    path::{Path, PathBuf},
};

use folio_core::{Config, ContentDocument, ContentPath, content::is_content_file};
use folio_parser::{MarkdownParser, ParserError, TocEntry};
use rayon::prelude::*;
use thiserror::Error;
use tracing::{debug, info, warn};
use walkdir::WalkDir;

/// Content collection errors.
#[derive(Debug, Error)]
pub enum CollectorError {
    /// The content directory does not exist.
    #[error("content directory not found: {0}")]
    MissingContentDir(PathBuf),

    /// Directory traversal failed.
    #[error("failed to walk content directory: {0}")]
    Walk(#[from] walkdir::Error),

    /// Reading a document failed.
    #[error("failed to read {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Front matter could not be parsed.
    #[error(transparent)]
    Parse(#[from] ParserError),

    /// Path cannot be mapped to a slug.
    #[error("invalid content path: {0}")]
    InvalidPath(PathBuf),
}

/// Result type for collector operations.
pub type Result<T> = std::result::Result<T, CollectorError>;

/// A document that parsed successfully.
#[derive(Debug, Clone)]
pub struct CollectedDocument {
    /// Path relative to the content directory.
    pub path: PathBuf,

    /// Slug derived from the path.
    pub slug: String,

    /// Metadata and raw body.
    pub document: ContentDocument,

    /// Body rendered to an HTML fragment.
    pub html: String,

    /// Headings of the rendered body.
    pub toc: Vec<TocEntry>,
}

impl CollectedDocument {
    /// URL path for this document.
    pub fn url_path(&self) -> String {
        if self.slug.is_empty() {
            "/".to_string()
        } else {
            format!("/{}/", self.slug)
        }
    }
}

/// A document excluded from the output because it failed.
#[derive(Debug)]
pub struct DocumentError {
    /// Path of the failed document.
    pub path: PathBuf,

    pub error: CollectorError,
}

impl fmt::Display for DocumentError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.error {
            // Parse errors already name the document.
            CollectorError::Parse(e) => write!(f, "{e}"),
            other => write!(f, "{}: {other}", self.path.display()),
        }
    }
}

/// Outcome of a full pass over the content directory.
#[derive(Debug, Default)]
pub struct Collection {
    /// Successfully parsed documents, sorted by path.
    pub documents: Vec<CollectedDocument>,

    /// Failures, sorted by path.
    pub errors: Vec<DocumentError>,

    /// Drafts left out because drafts were not requested.
    pub drafts_skipped: usize,
}

impl Collection {
    /// Whether any document failed.
    pub fn has_errors(&self) -> bool {
        !self.errors.is_empty()
    }

    /// Documents ordered newest first; undated documents last, by title.
    pub fn by_date(&self) -> Vec<&CollectedDocument> {
        let mut docs: Vec<_> = self.documents.iter().collect();
        docs.sort_by(|a, b| {
            let a_key = a.document.date().and_then(|d| d.sort_key());
            let b_key = b.document.date().and_then(|d| d.sort_key());
            match (b_key, a_key) {
                (Some(b_date), Some(a_date)) => b_date.cmp(&a_date),
                (Some(_), None) => std::cmp::Ordering::Greater,
                (None, Some(_)) => std::cmp::Ordering::Less,
                (None, None) => a.document.title().cmp(&b.document.title()),
            }
        });
        docs
    }

    /// Slugs claimed by more than one document, with the paths involved.
    pub fn duplicate_slugs(&self) -> Vec<(String, Vec<PathBuf>)> {
        let mut by_slug: HashMap<&str, Vec<PathBuf>> = HashMap::new();
        for doc in &self.documents {
            by_slug.entry(&doc.slug).or_default().push(doc.path.clone());
        }

        let mut duplicates: Vec<_> = by_slug
            .into_iter()
            .filter(|(_, paths)| paths.len() > 1)
            .map(|(slug, paths)| (slug.to_string(), paths))
            .collect();
        duplicates.sort();
        duplicates
    }
}

/// Content collector that walks directories and parses files.
#[derive(Debug)]
pub struct ContentCollector<'a> {
    config: &'a Config,
    parser: MarkdownParser,
    content_dir: PathBuf,
    include_drafts: bool,
}

impl<'a> ContentCollector<'a> {
    /// Create a new content collector.
    #[must_use]
    pub fn new(config: &'a Config, content_dir: impl Into<PathBuf>) -> Self {
        Self {
            config,
            parser: MarkdownParser::new(&config.markdown),
            content_dir: content_dir.into(),
            include_drafts: false,
        }
    }

    /// Keep documents marked `draft = true`.
    #[must_use]
    pub fn with_drafts(mut self, include: bool) -> Self {
        self.include_drafts = include;
        self
    }

    /// Configuration this collector was built with.
    pub fn config(&self) -> &Config {
        self.config
    }

    /// Collect all content from the content directory.
    ///
    /// Only directory-level failures return `Err`; per-document failures
    /// end up in [`Collection::errors`].
    pub fn collect(&self) -> Result<Collection> {
        info!(dir = %self.content_dir.display(), "collecting content");

        let files = self.find_content_files()?;
        info!(count = files.len(), "found content files");

        let results: Vec<_> = files
            .par_iter()
            .map(|path| (path, self.parse_file(path)))
            .collect();

        let mut collection = Collection::default();

        for (path, result) in results {
            match result {
                Ok(doc) if doc.document.is_draft() && !self.include_drafts => {
                    debug!(path = %path.display(), "skipping draft");
                    collection.drafts_skipped += 1;
                }
                Ok(doc) => collection.documents.push(doc),
                Err(error) => {
                    warn!(path = %path.display(), error = %error, "failed to parse document");
                    collection.errors.push(DocumentError {
                        path: path.clone(),
                        error,
                    });
                }
            }
        }

        collection.documents.sort_by(|a, b| a.path.cmp(&b.path));
        collection.errors.sort_by(|a, b| a.path.cmp(&b.path));

        info!(
            documents = collection.documents.len(),
            errors = collection.errors.len(),
            drafts_skipped = collection.drafts_skipped,
            "content collection complete"
        );

        Ok(collection)
    }

    /// Find all content files recursively, skipping hidden entries.
    fn find_content_files(&self) -> Result<Vec<PathBuf>> {
        if !self.content_dir.is_dir() {
            return Err(CollectorError::MissingContentDir(self.content_dir.clone()));
        }

        let mut files = Vec::new();
        let walker = WalkDir::new(&self.content_dir)
            .sort_by_file_name()
            .into_iter()
            .filter_entry(|e| e.depth() == 0 || !is_hidden(e.path()));

        for entry in walker {
            let entry = entry?;
            if entry.file_type().is_file() && is_content_file(entry.path()) {
                files.push(entry.into_path());
            }
        }

        Ok(files)
    }

    /// Parse a single content file.
    fn parse_file(&self, path: &Path) -> Result<CollectedDocument> {
        debug!(path = %path.display(), "parsing file");

        let content = fs::read_to_string(path).map_err(|source| CollectorError::Read {
            path: path.to_path_buf(),
            source,
        })?;

        let relative_path = path.strip_prefix(&self.content_dir).unwrap_or(path);
        let content_path = ContentPath::from_path(relative_path)
            .ok_or_else(|| CollectorError::InvalidPath(path.to_path_buf()))?;

        let parsed = self.parser.parse(&content, path)?;

        Ok(CollectedDocument {
            path: content_path.path,
            slug: content_path.slug,
            document: parsed.document,
            html: parsed.html,
            toc: parsed.toc,
        })
    }
}

fn is_hidden(path: &Path) -> bool {
    path.file_name()
        .is_some_and(|n| n.to_string_lossy().starts_with('.'))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn write(dir: &Path, rel: &str, content: &str) {
        let path = dir.join(rel);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).expect("create dirs");
        }
        fs::write(path, content).expect("write");
    }

    fn test_config() -> Config {
        Config::new("https://example.com")
    }

    #[test]
    fn test_collect_mixed_batch() {
        let dir = tempfile::tempdir().expect("create temp dir");
        write(dir.path(), "posts/good.md", "+++\ntitle = \"Good\"\n+++\nHello\n");
        write(dir.path(), "posts/open.md", "+++\ntitle = \"Open\"\n");
        write(dir.path(), "posts/bad.md", "+++\ntitle = = \"x\"\n+++\n");
        write(dir.path(), "about.md", "Plain page\n");

        let config = test_config();
        let collection = ContentCollector::new(&config, dir.path())
            .collect()
            .expect("collect");

        let slugs: Vec<_> = collection.documents.iter().map(|d| d.slug.as_str()).collect();
        assert_eq!(slugs, vec!["about", "posts/good"]);
        assert_eq!(collection.errors.len(), 2);
        assert!(collection.has_errors());

        let bad = &collection.errors[0];
        assert!(bad.path.ends_with("posts/bad.md"));
        assert!(matches!(
            bad.error,
            CollectorError::Parse(ParserError::FrontMatter(
                folio_core::CoreError::InvalidMetadataSyntax { line: 2, .. }
            ))
        ));
        let open = &collection.errors[1];
        assert!(matches!(
            open.error,
            CollectorError::Parse(ParserError::FrontMatter(
                folio_core::CoreError::MalformedFrontMatter { .. }
            ))
        ));
    }

    #[test]
    fn test_drafts_skipped_by_default() {
        let dir = tempfile::tempdir().expect("create temp dir");
        write(dir.path(), "draft.md", "+++\ntitle = \"WIP\"\ndraft = true\n+++\n");
        write(dir.path(), "done.md", "+++\ntitle = \"Done\"\n+++\n");

        let config = test_config();
        let collection = ContentCollector::new(&config, dir.path())
            .collect()
            .expect("collect");
        assert_eq!(collection.documents.len(), 1);
        assert_eq!(collection.drafts_skipped, 1);

        let with_drafts = ContentCollector::new(&config, dir.path())
            .with_drafts(true)
            .collect()
            .expect("collect");
        assert_eq!(with_drafts.documents.len(), 2);
        assert_eq!(with_drafts.drafts_skipped, 0);
    }

    #[test]
    fn test_hidden_and_foreign_files_ignored() {
        let dir = tempfile::tempdir().expect("create temp dir");
        write(dir.path(), ".drafts/secret.md", "+++\n");
        write(dir.path(), "image.png", "not text");
        write(dir.path(), "post.md", "Body\n");

        let config = test_config();
        let collection = ContentCollector::new(&config, dir.path())
            .collect()
            .expect("collect");

        assert_eq!(collection.documents.len(), 1);
        assert!(!collection.has_errors());
    }

    #[test]
    fn test_missing_content_dir() {
        let config = test_config();
        let result = ContentCollector::new(&config, "/nonexistent/content").collect();
        assert!(matches!(result, Err(CollectorError::MissingContentDir(_))));
    }

    #[test]
    fn test_by_date_and_duplicates() {
        let dir = tempfile::tempdir().expect("create temp dir");
        write(dir.path(), "a.md", "+++\ntitle = \"Old\"\ndate = 2023-01-01\n+++\n");
        write(dir.path(), "b.md", "+++\ntitle = \"New\"\ndate = 2024-06-01\n+++\n");
        write(dir.path(), "c.md", "+++\ntitle = \"Undated\"\n+++\n");
        write(dir.path(), "a/index.md", "+++\ntitle = \"Clash\"\n+++\n");

        let config = test_config();
        let collection = ContentCollector::new(&config, dir.path())
            .collect()
            .expect("collect");

        let titles: Vec<_> = collection
            .by_date()
            .iter()
            .filter_map(|d| d.document.title())
            .collect();
        assert_eq!(titles, vec!["New", "Old", "Clash", "Undated"]);

        let duplicates = collection.duplicate_slugs();
        assert_eq!(duplicates.len(), 1);
        assert_eq!(duplicates[0].0, "a");
        assert_eq!(duplicates[0].1.len(), 2);
    }

    #[test]
    fn test_by_date_puts_undated_last() {
        let dir = tempfile::tempdir().expect("create temp dir");
        write(dir.path(), "a.md", "+++\ntitle = \"Undated\"\n+++\n");
        write(dir.path(), "b.md", "+++\ntitle = \"Dated\"\ndate = 2024-01-01\n+++\n");

        let config = test_config();
        let collection = ContentCollector::new(&config, dir.path())
            .collect()
            .expect("collect");

        let titles: Vec<_> = collection
            .by_date()
            .iter()
            .filter_map(|d| d.document.title())
            .collect();
        assert_eq!(titles, vec!["Dated", "Undated"]);
    }

    #[test]
    fn test_document_error_display() {
        let err = DocumentError {
            path: PathBuf::from("content/x.md"),
            error: CollectorError::InvalidPath(PathBuf::from("content/x.md")),
        };
        assert!(err.to_string().starts_with("content/x.md: invalid content path"));
    }
}
