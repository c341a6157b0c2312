//! Show command - print the parsed form of one document

use std::{fmt::Write as _, fs, path::Path};

use color_eyre::eyre::{Result, WrapErr};
use folio_core::{ContentDocument, FrontMatterFormat};
use folio_parser::MarkdownParser;

use super::config_or_default;

/// Run the show command.
///
/// Prints the document's metadata with sorted keys, followed by the raw body
/// or, with `html`, the rendered body.
pub fn run(config_path: &Path, file: &Path, html: bool) -> Result<()> {
    tracing::info!(?file, html, "Showing document");

    let config = config_or_default(config_path)?;
    let content = fs::read_to_string(file)
        .wrap_err_with(|| format!("Failed to read {}", file.display()))?;

    let parser = MarkdownParser::new(&config.markdown);
    let parsed = parser.parse(&content, file)?;

    let body = if html {
        parsed.html.as_str()
    } else {
        parsed.document.body()
    };
    print!("{}", describe(&parsed.document, body));

    Ok(())
}

/// Human readable dump of a document.
pub fn describe(document: &ContentDocument, body: &str) -> String {
    let mut out = String::new();

    let format = match document.format() {
        Some(FrontMatterFormat::Toml) => "toml",
        Some(FrontMatterFormat::Yaml) => "yaml",
        None => "none",
    };
    let _ = writeln!(out, "front matter: {format}");

    let mut keys: Vec<_> = document.metadata().keys().collect();
    keys.sort();
    for key in keys {
        let value = &document.metadata()[key];
        let _ = writeln!(out, "  {key} ({}) = {value}", value.type_name());
    }

    let _ = writeln!(out, "---- body ----");
    out.push_str(body);
    if !body.is_empty() && !body.ends_with('\n') {
        out.push('\n');
    }
    out
}
