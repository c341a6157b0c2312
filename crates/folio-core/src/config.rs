//! Site configuration management.
//!
//! Loaded once at process start and passed by reference afterwards.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{CoreError, Result};

/// Site-wide settings read from `config.toml`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Base URL for the site (e.g., "https://example.com").
    pub base_url: String,

    /// Site title.
    #[serde(default)]
    pub title: Option<String>,

    /// Site description for meta tags.
    #[serde(default)]
    pub description: Option<String>,

    /// Site author name.
    #[serde(default)]
    pub author: Option<String>,

    /// Theme identifier handed to the site engine.
    #[serde(default)]
    pub theme: Option<String>,

    /// Whether the site engine compiles Sass.
    #[serde(default)]
    pub compile_sass: bool,

    /// Whether the site engine builds a search index.
    #[serde(default)]
    pub build_search_index: bool,

    /// Whether the site engine generates feeds.
    #[serde(default, alias = "generate_feed")]
    pub generate_feeds: bool,

    /// Whether HTML output is minified.
    #[serde(default, alias = "minify")]
    pub minify_html: bool,

    /// Directory holding content documents, relative to the config file.
    #[serde(default = "default_content_dir")]
    pub content_dir: String,

    /// Markdown rendering settings.
    #[serde(default)]
    pub markdown: MarkdownConfig,
}

/// Markdown rendering configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MarkdownConfig {
    /// Whether fenced code blocks are syntax highlighted.
    #[serde(default)]
    pub highlight_code: bool,

    /// Syntax highlighting theme name.
    #[serde(default = "default_highlight_theme")]
    pub highlight_theme: String,
}

fn default_content_dir() -> String {
    "content".to_string()
}

fn default_highlight_theme() -> String {
    "base16-ocean.dark".to_string()
}

impl Default for MarkdownConfig {
    fn default() -> Self {
        Self {
            highlight_code: false,
            highlight_theme: default_highlight_theme(),
        }
    }
}

impl Config {
    /// Create a configuration with defaults for everything but the base URL.
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            title: None,
            description: None,
            author: None,
            theme: None,
            compile_sass: false,
            build_search_index: false,
            generate_feeds: false,
            minify_html: false,
            content_dir: default_content_dir(),
            markdown: MarkdownConfig::default(),
        }
    }

    /// Load configuration from a TOML file.
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Err(CoreError::config(format!(
                "Configuration file not found: {}",
                path.display()
            )));
        }

        let content = std::fs::read_to_string(path)?;
        let config: Config = toml::from_str(&content).map_err(|e| {
            CoreError::config_with_source(
                format!("Failed to parse config file: {}", path.display()),
                e,
            )
        })?;

        config.validate()?;
        tracing::debug!(?path, base_url = %config.base_url, "Loaded configuration");
        Ok(config)
    }

    /// Load configuration with `FOLIO__*` environment overrides.
    ///
    /// `FOLIO__BASE_URL` overrides `base_url`, `FOLIO__MARKDOWN__HIGHLIGHT_CODE`
    /// overrides `markdown.highlight_code`.
    pub fn load_with_env(path: &Path) -> Result<Self> {
        Self::load_with_environment(path, Self::environment())
    }

    fn environment() -> config::Environment {
        config::Environment::with_prefix("FOLIO")
            .prefix_separator("__")
            .separator("__")
            .try_parsing(true)
    }

    fn load_with_environment(path: &Path, environment: config::Environment) -> Result<Self> {
        if !path.exists() {
            return Err(CoreError::config(format!(
                "Configuration file not found: {}",
                path.display()
            )));
        }

        let settings = config::Config::builder()
            .add_source(config::File::from(path))
            .add_source(environment)
            .build()?;

        let config: Config = settings.try_deserialize()?;
        config.validate()?;
        tracing::debug!(?path, base_url = %config.base_url, "Loaded configuration");
        Ok(config)
    }

    /// Validate the configuration.
    fn validate(&self) -> Result<()> {
        if self.base_url.is_empty() {
            return Err(CoreError::config("base_url cannot be empty"));
        }

        if self.content_dir.is_empty() {
            return Err(CoreError::config("content_dir cannot be empty"));
        }

        Ok(())
    }

    /// Get the full URL for a path.
    pub fn url_for(&self, path: &str) -> String {
        let base = self.base_url.trim_end_matches('/');
        let path = path.trim_start_matches('/');
        format!("{base}/{path}")
    }

    /// Content directory resolved against the directory holding the config file.
    pub fn content_path(&self, config_path: &Path) -> std::path::PathBuf {
        let root = config_path.parent().unwrap_or(Path::new(""));
        root.join(&self.content_dir)
    }
}
