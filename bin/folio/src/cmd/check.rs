//! Check command - validate configuration and content

use std::path::Path;

use color_eyre::eyre::{Result, bail};
use folio_core::Config;
use folio_generator::{Collection, CollectorError, ContentCollector};
use folio_parser::SyntaxHighlighter;

/// Validation result.
#[derive(Debug, Default)]
pub struct ValidationResult {
    pub errors: Vec<String>,
    pub warnings: Vec<String>,
}

impl ValidationResult {
    fn add_error(&mut self, msg: impl Into<String>) {
        self.errors.push(msg.into());
    }

    fn add_warning(&mut self, msg: impl Into<String>) {
        self.warnings.push(msg.into());
    }

    pub fn has_errors(&self) -> bool {
        !self.errors.is_empty()
    }

    pub fn has_warnings(&self) -> bool {
        !self.warnings.is_empty()
    }
}

/// Run the check command.
///
/// Parses every document, reports all failures after the full pass and
/// exits with an error if any document failed.
pub fn run(config_path: &Path, strict: bool) -> Result<()> {
    tracing::info!(?config_path, strict, "Checking configuration and content");

    let result = validate(config_path)?;

    println!();
    println!("Summary:");
    println!("  Errors:   {}", result.errors.len());
    println!("  Warnings: {}", result.warnings.len());

    if result.has_errors() {
        println!();
        println!("Errors:");
        for err in &result.errors {
            println!("  ✗ {err}");
        }
    }

    if result.has_warnings() {
        println!();
        println!("Warnings:");
        for warn in &result.warnings {
            println!("  ⚠ {warn}");
        }
    }

    if result.has_errors() {
        bail!("Validation failed with {} error(s)", result.errors.len());
    }

    if strict && result.has_warnings() {
        bail!(
            "Validation failed with {} warning(s) (strict mode)",
            result.warnings.len()
        );
    }

    println!();
    println!("✓ All checks passed");

    Ok(())
}

/// Validate configuration and content without printing the summary.
pub fn validate(config_path: &Path) -> Result<ValidationResult> {
    let mut result = ValidationResult::default();

    println!("Checking configuration...");
    let config = match Config::load_with_env(config_path) {
        Ok(c) => {
            println!("  ✓ Configuration valid");
            check_config_values(&c, config_path, &mut result);
            c
        }
        Err(e) => {
            result.add_error(format!("Configuration error: {e}"));
            println!("  ✗ Configuration invalid: {e}");
            return Ok(result);
        }
    };

    println!("\nChecking content files...");
    let content_dir = config.content_path(config_path);
    match ContentCollector::new(&config, &content_dir)
        .with_drafts(true)
        .collect()
    {
        Ok(collection) => check_collection(&collection, &mut result),
        Err(CollectorError::MissingContentDir(dir)) => {
            result.add_error(format!("Content directory missing: {}", dir.display()));
            println!("  ✗ {} missing (required)", dir.display());
        }
        Err(e) => return Err(e.into()),
    }

    Ok(result)
}

/// Report per-document failures and metadata the site engine will reject.
fn check_collection(collection: &Collection, result: &mut ValidationResult) {
    let checked = collection.documents.len() + collection.errors.len();

    for failure in &collection.errors {
        result.add_error(failure.to_string());
    }

    for doc in &collection.documents {
        if doc.document.title().is_none() {
            result.add_warning(format!(
                "{}: missing string `title` in front matter",
                doc.path.display()
            ));
        }
    }

    for (slug, paths) in collection.duplicate_slugs() {
        let paths: Vec<_> = paths.iter().map(|p| p.display().to_string()).collect();
        result.add_warning(format!(
            "Slug '/{slug}' is claimed by several documents: {}",
            paths.join(", ")
        ));
    }

    if collection.has_errors() {
        println!(
            "  ✗ {}/{checked} content files have errors",
            collection.errors.len()
        );
    } else {
        println!("  ✓ All {checked} content files valid");
    }
}

/// Check configuration values for common issues.
fn check_config_values(config: &Config, config_path: &Path, result: &mut ValidationResult) {
    if !config.base_url.starts_with("http") {
        result.add_warning("base_url should start with http:// or https://");
    }

    if config.base_url.ends_with('/') {
        result.add_warning("base_url should not have a trailing slash");
    }

    if config.title.as_deref().is_none_or(str::is_empty) {
        result.add_warning("title is empty");
    }

    if let Some(theme) = &config.theme {
        let theme_dir = config_path
            .parent()
            .unwrap_or(Path::new(""))
            .join("themes")
            .join(theme);
        if !theme_dir.is_dir() {
            result.add_warning(format!(
                "Theme '{theme}' not found at {}",
                theme_dir.display()
            ));
        }
    }

    if config.markdown.highlight_code
        && !SyntaxHighlighter::has_theme(&config.markdown.highlight_theme)
    {
        result.add_warning(format!(
            "Unknown highlight_theme '{}'",
            config.markdown.highlight_theme
        ));
    }
}
