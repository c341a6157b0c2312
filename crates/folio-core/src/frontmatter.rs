//! Front matter parsing for content documents.
//!
//! A document may open with a metadata block fenced by `+++` (TOML) or `---`
//! (YAML) lines. Parsing is a two-phase scan: the first line either opens a
//! block or the whole input is body; an opened block must be closed by the
//! same delimiter before end of input.

use std::path::Path;

use thiserror::Error;

use crate::{
    content::ContentDocument,
    error::{CoreError, Result},
    value::{self, Metadata},
    yaml,
};

/// Errors produced while splitting and deserializing a front matter block.
///
/// Line numbers are 1-based and count from the start of the document.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FrontMatterError {
    /// Opening delimiter found but no closing delimiter before end of input.
    #[error("front matter block opened at line {line} is never closed")]
    MalformedFrontMatter { line: usize },

    /// Block content does not parse as the detected format.
    #[error("invalid metadata syntax at line {line}: {message}")]
    InvalidMetadataSyntax { line: usize, message: String },
}

impl FrontMatterError {
    /// Document line the error points at.
    pub fn line(&self) -> usize {
        match self {
            Self::MalformedFrontMatter { line } | Self::InvalidMetadataSyntax { line, .. } => *line,
        }
    }

    /// Attach the identifier of the document that failed.
    pub fn with_path(self, path: impl AsRef<Path>) -> CoreError {
        let path = path.as_ref().to_path_buf();
        match self {
            Self::MalformedFrontMatter { line } => CoreError::MalformedFrontMatter { path, line },
            Self::InvalidMetadataSyntax { line, message } => {
                CoreError::InvalidMetadataSyntax {
                    path,
                    line,
                    message,
                }
            }
        }
    }
}

/// Delimiter types for front matter.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FrontMatterFormat {
    /// TOML front matter delimited by `+++`.
    Toml,
    /// YAML front matter delimited by `---`.
    Yaml,
}

impl FrontMatterFormat {
    /// Get the delimiter string for this format.
    pub fn delimiter(&self) -> &'static str {
        match self {
            Self::Toml => "+++",
            Self::Yaml => "---",
        }
    }

    /// Detect the format from a candidate delimiter line.
    pub fn detect(line: &str) -> Option<Self> {
        [Self::Toml, Self::Yaml]
            .into_iter()
            .find(|format| format.is_delimiter(line))
    }

    /// Whether `line` is this format's delimiter on a line of its own.
    ///
    /// Trailing whitespace and the line terminator are ignored.
    pub fn is_delimiter(&self, line: &str) -> bool {
        line.trim_end() == self.delimiter()
    }

    /// Serialize a mapping into a delimited front matter block.
    ///
    /// The result ends with a newline after the closing delimiter, so a body
    /// can be appended directly.
    pub fn render(&self, metadata: &Metadata) -> Result<String> {
        let block = match self {
            Self::Toml => toml::to_string(&value::to_toml_table(metadata)?)
                .map_err(|e| CoreError::render(e.to_string()))?,
            Self::Yaml if metadata.is_empty() => String::new(),
            Self::Yaml => serde_yaml::to_string(&value::to_yaml_mapping(metadata))
                .map_err(|e| CoreError::render(e.to_string()))?,
        };

        let delimiter = self.delimiter();
        let mut out = String::with_capacity(block.len() + 2 * (delimiter.len() + 1));
        out.push_str(delimiter);
        out.push('\n');
        out.push_str(&block);
        if !block.is_empty() && !block.ends_with('\n') {
            out.push('\n');
        }
        out.push_str(delimiter);
        out.push('\n');
        Ok(out)
    }
}

/// A located but not yet deserialized front matter block.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RawFrontMatter<'a> {
    /// Detected format.
    pub format: FrontMatterFormat,
    /// Text strictly between the delimiter lines.
    pub block: &'a str,
    /// Everything after the closing delimiter line.
    pub body: &'a str,
}

/// Split content into front matter and body.
///
/// Returns `Ok(None)` when the first line is not a delimiter.
pub fn split_frontmatter(
    content: &str,
) -> std::result::Result<Option<RawFrontMatter<'_>>, FrontMatterError> {
    let mut lines = content.split_inclusive('\n');

    let Some(first) = lines.next() else {
        return Ok(None);
    };
    let Some(format) = FrontMatterFormat::detect(first) else {
        return Ok(None);
    };

    let block_start = first.len();
    let mut offset = block_start;

    for line in lines {
        if format.is_delimiter(line) {
            return Ok(Some(RawFrontMatter {
                format,
                block: &content[block_start..offset],
                body: &content[offset + line.len()..],
            }));
        }
        offset += line.len();
    }

    Err(FrontMatterError::MalformedFrontMatter { line: 1 })
}

/// Parse a document into metadata and body.
///
/// Pure function of its input. No block means empty metadata and the input
/// as body.
pub fn parse(content: &str) -> std::result::Result<ContentDocument, FrontMatterError> {
    let Some(raw) = split_frontmatter(content)? else {
        return Ok(ContentDocument::new(None, Metadata::new(), content));
    };

    let metadata = match raw.format {
        FrontMatterFormat::Toml => parse_toml_block(raw.block)?,
        FrontMatterFormat::Yaml => parse_yaml_block(raw.block)?,
    };

    Ok(ContentDocument::new(Some(raw.format), metadata, raw.body))
}

/// Parse a document, attaching `path` to any error.
pub fn parse_document(path: &Path, content: &str) -> Result<ContentDocument> {
    parse(content).map_err(|e| e.with_path(path))
}

/// First document line inside the block.
const BLOCK_FIRST_LINE: usize = 2;

fn block_line(block: &str, byte_offset: usize) -> usize {
    let offset = byte_offset.min(block.len());
    BLOCK_FIRST_LINE + block.as_bytes()[..offset].iter().filter(|b| **b == b'\n').count()
}

/// Document line where a top-level key is declared, if it can be found.
fn key_line(block: &str, key: &str) -> usize {
    block
        .lines()
        .position(|line| {
            let line = line.trim_start();
            let rest = line
                .strip_prefix(key)
                .or_else(|| line.strip_prefix(&format!("\"{key}\"")))
                .or_else(|| line.strip_prefix(&format!("'{key}'")));
            rest.is_some_and(|r| {
                let r = r.trim_start();
                r.starts_with('=') || r.starts_with(':')
            })
        })
        .map_or(BLOCK_FIRST_LINE, |idx| BLOCK_FIRST_LINE + idx)
}

fn parse_toml_block(block: &str) -> std::result::Result<Metadata, FrontMatterError> {
    let table: toml::Table = toml::from_str(block).map_err(|e| {
        FrontMatterError::InvalidMetadataSyntax {
            line: e
                .span()
                .map_or(BLOCK_FIRST_LINE, |span| block_line(block, span.start)),
            message: e.message().trim().to_string(),
        }
    })?;

    table
        .into_iter()
        .map(|(key, value)| match value::from_toml(value) {
            Ok(value) => Ok((key, value)),
            Err(message) => Err(FrontMatterError::InvalidMetadataSyntax {
                line: key_line(block, &key),
                message: format!("`{key}`: {message}"),
            }),
        })
        .collect()
}

fn parse_yaml_block(block: &str) -> std::result::Result<Metadata, FrontMatterError> {
    yaml::load_mapping(block).map_err(|e| FrontMatterError::InvalidMetadataSyntax {
        line: BLOCK_FIRST_LINE
            + block
                .chars()
                .take(e.index)
                .filter(|c| *c == '\n')
                .count(),
        message: e.message,
    })
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;

    use super::*;
    use crate::value::{MetadataValue, Timestamp};

    fn string(s: &str) -> MetadataValue {
        MetadataValue::String(s.to_string())
    }

    #[test]
    fn test_parse_toml_example() {
        let doc = parse("+++\ntitle = \"Hello\"\n+++\nBody text\n").expect("parse");

        assert_eq!(doc.metadata().len(), 1);
        assert_eq!(doc.get("title"), Some(&string("Hello")));
        assert_eq!(doc.body(), "Body text\n");
        assert_eq!(doc.format(), Some(FrontMatterFormat::Toml));
    }

    #[test]
    fn test_no_delimiters() {
        let doc = parse("No delimiters here").expect("parse");

        assert!(doc.metadata().is_empty());
        assert_eq!(doc.body(), "No delimiters here");
        assert!(doc.format().is_none());
    }

    #[test]
    fn test_empty_input() {
        let doc = parse("").expect("parse");
        assert!(doc.metadata().is_empty());
        assert_eq!(doc.body(), "");
    }

    #[test]
    fn test_delimiter_not_on_first_line() {
        let content = "\n+++\ntitle = \"Late\"\n+++\nBody";
        let doc = parse(content).expect("parse");

        assert!(doc.metadata().is_empty());
        assert_eq!(doc.body(), content);
    }

    #[test]
    fn test_delimiter_must_own_its_line() {
        let content = "+++ title = \"x\"\n+++\n";
        let doc = parse(content).expect("parse");
        assert!(doc.metadata().is_empty());
        assert_eq!(doc.body(), content);
    }

    #[test]
    fn test_unterminated_block() {
        let err = parse("+++\ntitle = \"Unterminated\"\n").unwrap_err();
        assert_eq!(err, FrontMatterError::MalformedFrontMatter { line: 1 });
    }

    #[test]
    fn test_lone_opening_delimiter() {
        let err = parse("+++").unwrap_err();
        assert!(matches!(err, FrontMatterError::MalformedFrontMatter { .. }));
    }

    #[test]
    fn test_mismatched_delimiters_are_unterminated() {
        let err = parse("+++\ntitle = \"x\"\n---\nBody").unwrap_err();
        assert!(matches!(err, FrontMatterError::MalformedFrontMatter { .. }));
    }

    #[test]
    fn test_body_keeps_blank_lines() {
        let doc = parse("+++\ntitle = \"Hi\"\n+++\n\n# Heading\n").expect("parse");
        assert_eq!(doc.body(), "\n# Heading\n");
    }

    #[test]
    fn test_closing_delimiter_at_eof() {
        let doc = parse("+++\ntitle = \"Hi\"\n+++").expect("parse");
        assert_eq!(doc.body(), "");
        assert_eq!(doc.get("title"), Some(&string("Hi")));
    }

    #[test]
    fn test_crlf_line_endings() {
        let doc = parse("+++\r\ntitle = \"Hi\"\r\n+++\r\nBody\r\n").expect("parse");
        assert_eq!(doc.get("title"), Some(&string("Hi")));
        assert_eq!(doc.body(), "Body\r\n");
    }

    #[test]
    fn test_empty_block() {
        let doc = parse("+++\n+++\nBody").expect("parse");
        assert!(doc.metadata().is_empty());
        assert_eq!(doc.body(), "Body");
        assert_eq!(doc.format(), Some(FrontMatterFormat::Toml));
    }

    #[test]
    fn test_toml_types() {
        let content = r#"+++
title = "Test Post"
weight = 3
draft = false
ratio = 0.5
tags = ["rust", "test"]
date = 2024-01-14

[extra]
comments = true
+++
Content here."#;

        let doc = parse(content).expect("parse");

        assert_eq!(doc.get("title"), Some(&string("Test Post")));
        assert_eq!(doc.get("weight"), Some(&MetadataValue::Integer(3)));
        assert_eq!(doc.get("draft"), Some(&MetadataValue::Boolean(false)));
        assert_eq!(doc.get("ratio"), Some(&MetadataValue::Float(0.5)));
        assert_eq!(
            doc.get("tags").and_then(MetadataValue::as_str_list),
            Some(vec!["rust", "test"])
        );
        assert_eq!(
            doc.get("date"),
            Some(&MetadataValue::Timestamp(Timestamp::Date(
                NaiveDate::from_ymd_opt(2024, 1, 14).expect("date")
            )))
        );
        let extra = doc.get("extra").and_then(MetadataValue::as_table).expect("extra");
        assert_eq!(extra.get("comments"), Some(&MetadataValue::Boolean(true)));
        assert_eq!(doc.body(), "Content here.");
    }

    #[test]
    fn test_yaml_types() {
        let content = r#"---
title: "Test Post"
date: 2024-01-14T10:00:00Z
draft: false
weight: 7
tags:
  - rust
  - test
---

Content here."#;

        let doc = parse(content).expect("parse");

        assert_eq!(doc.format(), Some(FrontMatterFormat::Yaml));
        assert_eq!(doc.get("title"), Some(&string("Test Post")));
        assert!(matches!(
            doc.get("date").and_then(MetadataValue::as_timestamp),
            Some(Timestamp::Offset(_))
        ));
        assert_eq!(doc.get("draft"), Some(&MetadataValue::Boolean(false)));
        assert_eq!(doc.get("weight"), Some(&MetadataValue::Integer(7)));
        assert_eq!(
            doc.get("tags").and_then(MetadataValue::as_str_list),
            Some(vec!["rust", "test"])
        );
        assert_eq!(doc.body(), "\nContent here.");
    }

    #[test]
    fn test_invalid_toml_reports_document_line() {
        let content = "+++\ntitle = \"Ok\"\ndate = = 2024\n+++\nBody";
        let err = parse(content).unwrap_err();

        match err {
            FrontMatterError::InvalidMetadataSyntax { line, .. } => assert_eq!(line, 3),
            other => panic!("expected syntax error, got {other:?}"),
        }
    }

    #[test]
    fn test_invalid_yaml_reports_document_line() {
        // The unclosed flow sequence runs to the end of the block, which is
        // the closing delimiter's line.
        let content = "---\ntitle: ok\ntags: [rust\n---\nBody";
        let err = parse(content).unwrap_err();

        match err {
            FrontMatterError::InvalidMetadataSyntax { line, message } => {
                assert_eq!(line, 4);
                assert!(!message.contains("line"), "message leaks a position: {message}");
            }
            other => panic!("expected syntax error, got {other:?}"),
        }
    }

    #[test]
    fn test_yaml_duplicate_key_reports_document_line() {
        let err = parse("---\ntitle: a\ndraft: false\ntitle: b\n---\n").unwrap_err();
        assert_eq!(err.line(), 4);
    }

    #[test]
    fn test_yaml_quoted_date_stays_string() {
        let doc = parse("---\ntitle: \"2024-01-14\"\ndate: 2024-01-14\n---\n").expect("parse");

        assert_eq!(doc.get("title"), Some(&string("2024-01-14")));
        assert!(matches!(
            doc.get("date").and_then(MetadataValue::as_timestamp),
            Some(Timestamp::Date(_))
        ));
    }

    #[test]
    fn test_round_trip_yaml() {
        let mut extra = Metadata::new();
        extra.insert("toc".to_string(), MetadataValue::Boolean(true));

        let mut metadata = Metadata::new();
        metadata.insert("title".to_string(), string("Round Trip"));
        metadata.insert("slug".to_string(), string("2024-01-14"));
        metadata.insert("code".to_string(), string("007"));
        metadata.insert("answer".to_string(), string("42"));
        metadata.insert("weight".to_string(), MetadataValue::Integer(-4));
        metadata.insert("draft".to_string(), MetadataValue::Boolean(false));
        metadata.insert(
            "tags".to_string(),
            MetadataValue::List(vec![string("rust"), string("true")]),
        );
        metadata.insert(
            "date".to_string(),
            MetadataValue::Timestamp(Timestamp::Date(
                NaiveDate::from_ymd_opt(2024, 1, 14).expect("date"),
            )),
        );
        metadata.insert("extra".to_string(), MetadataValue::Table(extra));
        let body = "Body\n---\n";

        let rendered = FrontMatterFormat::Yaml.render(&metadata).expect("render");
        let doc = parse(&format!("{rendered}{body}")).expect("parse");

        assert_eq!(doc.metadata(), &metadata);
        assert_eq!(doc.body(), body);
    }

    #[test]
    fn test_render_rejects_year_out_of_toml_range() {
        let mut metadata = Metadata::new();
        metadata.insert(
            "date".to_string(),
            MetadataValue::Timestamp(Timestamp::Date(
                NaiveDate::from_ymd_opt(70_000, 1, 1).expect("date"),
            )),
        );

        let err = FrontMatterFormat::Toml.render(&metadata).unwrap_err();
        assert!(matches!(err, CoreError::Render(_)));
    }

    #[test]
    fn test_yaml_non_mapping_rejected() {
        let err = parse("---\n- a\n- b\n---\n").unwrap_err();
        match err {
            FrontMatterError::InvalidMetadataSyntax { message, .. } => {
                assert!(message.contains("expected a mapping"));
            }
            other => panic!("expected syntax error, got {other:?}"),
        }
    }

    #[test]
    fn test_yaml_null_value_points_at_key() {
        let err = parse("---\ntitle: ok\nsummary:\n---\n").unwrap_err();
        assert_eq!(err.line(), 3);
    }

    #[test]
    fn test_round_trip_toml() {
        let mut metadata = Metadata::new();
        metadata.insert("title".to_string(), string("Round Trip"));
        metadata.insert("weight".to_string(), MetadataValue::Integer(-4));
        metadata.insert("draft".to_string(), MetadataValue::Boolean(true));
        metadata.insert(
            "tags".to_string(),
            MetadataValue::List(vec![string("a"), string("b")]),
        );
        metadata.insert(
            "updated".to_string(),
            MetadataValue::Timestamp(
                Timestamp::parse_str("2023-11-02T08:15:00+01:00").expect("timestamp"),
            ),
        );
        let body = "\n\nSome *markdown* body\n+++\n";

        let rendered = FrontMatterFormat::Toml.render(&metadata).expect("render");
        let doc = parse(&format!("{rendered}{body}")).expect("parse");

        assert_eq!(doc.metadata(), &metadata);
        assert_eq!(doc.body(), body);
    }

    #[test]
    fn test_round_trip_empty_metadata() {
        for format in [FrontMatterFormat::Toml, FrontMatterFormat::Yaml] {
            let rendered = format.render(&Metadata::new()).expect("render");
            let doc = parse(&format!("{rendered}Body")).expect("parse");
            assert!(doc.metadata().is_empty());
            assert_eq!(doc.body(), "Body");
        }
    }

    #[test]
    fn test_reparse_body_is_idempotent() {
        let doc = parse("+++\ntitle = \"Hi\"\n+++\nFirst paragraph.\n").expect("parse");
        let again = parse(doc.body()).expect("reparse");

        assert!(again.metadata().is_empty());
        assert_eq!(again.body(), doc.body());
    }

    #[test]
    fn test_parse_document_attaches_path() {
        let err = parse_document(Path::new("content/post.md"), "---\ntitle: x\n").unwrap_err();
        assert!(matches!(
            err,
            CoreError::MalformedFrontMatter { ref path, line: 1 } if path == Path::new("content/post.md")
        ));
    }

    #[test]
    fn test_detect_format() {
        assert_eq!(FrontMatterFormat::detect("+++\n"), Some(FrontMatterFormat::Toml));
        assert_eq!(FrontMatterFormat::detect("---  \r\n"), Some(FrontMatterFormat::Yaml));
        assert_eq!(FrontMatterFormat::detect("----\n"), None);
        assert_eq!(FrontMatterFormat::detect(" +++\n"), None);
    }
}
