//! New command - create new content with front matter

use std::{fs, path::Path};

use chrono::Local;
use color_eyre::eyre::{Result, WrapErr, bail};
use folio_core::{FrontMatterFormat, Metadata, MetadataValue, Timestamp};

use super::config_or_default;

/// Run the new command.
///
/// Creates a new content file with boilerplate front matter under the
/// configured content directory. Existing files are never overwritten.
pub fn run(config_path: &Path, path: &Path, format: FrontMatterFormat) -> Result<()> {
    tracing::info!(?path, ?format, "Creating new content");

    let config = config_or_default(config_path)?;
    let full_path = config.content_path(config_path).join(path);

    let file_path = if full_path.extension().is_some() {
        full_path
    } else {
        full_path.with_extension("md")
    };

    if file_path.exists() {
        bail!("Refusing to overwrite {}", file_path.display());
    }

    if let Some(parent) = file_path.parent() {
        fs::create_dir_all(parent).wrap_err("Failed to create directories")?;
    }

    let document = scaffold(path, format)?;
    fs::write(&file_path, document).wrap_err("Failed to write file")?;

    tracing::info!(?file_path, "Created new content file");
    println!("Created: {}", file_path.display());

    Ok(())
}

/// Front matter and placeholder body for a new document.
pub fn scaffold(path: &Path, format: FrontMatterFormat) -> Result<String> {
    let title = path
        .file_stem()
        .and_then(|s| s.to_str())
        .filter(|s| *s != "index")
        .or_else(|| path.parent()?.file_name()?.to_str())
        .unwrap_or("Untitled")
        .replace(['-', '_'], " ");

    let mut metadata = Metadata::new();
    metadata.insert("title".to_string(), MetadataValue::String(title));
    metadata.insert(
        "date".to_string(),
        MetadataValue::Timestamp(Timestamp::Date(Local::now().date_naive())),
    );
    metadata.insert("draft".to_string(), MetadataValue::Boolean(true));
    metadata.insert("tags".to_string(), MetadataValue::List(Vec::new()));

    let mut document = format.render(&metadata)?;
    document.push_str("\nWrite your content here.\n");
    Ok(document)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scaffold_parses_back() {
        for format in [FrontMatterFormat::Toml, FrontMatterFormat::Yaml] {
            let text = scaffold(Path::new("posts/my-first-post"), format).expect("scaffold");
            let doc = folio_core::parse(&text).expect("parse scaffold");

            assert_eq!(doc.format(), Some(format));
            assert_eq!(doc.title(), Some("my first post"));
            assert!(doc.is_draft());
            assert!(matches!(doc.date(), Some(Timestamp::Date(_))));
            assert_eq!(doc.body(), "\nWrite your content here.\n");
        }
    }

    #[test]
    fn test_scaffold_index_uses_directory_name() {
        let text = scaffold(Path::new("posts/trip_notes/index.md"), FrontMatterFormat::Toml)
            .expect("scaffold");
        let doc = folio_core::parse(&text).expect("parse scaffold");
        assert_eq!(doc.title(), Some("trip notes"));
    }

    #[test]
    fn test_run_creates_file_once() {
        let dir = tempfile::tempdir().expect("create temp dir");
        let config_path = dir.path().join("config.toml");
        fs::write(&config_path, "base_url = \"https://example.com\"\n").expect("write config");

        run(&config_path, Path::new("posts/hello"), FrontMatterFormat::Toml).expect("create");
        let created = dir.path().join("content/posts/hello.md");
        assert!(created.exists());

        let err = run(&config_path, Path::new("posts/hello"), FrontMatterFormat::Toml).unwrap_err();
        assert!(err.to_string().contains("Refusing to overwrite"));
    }
}
