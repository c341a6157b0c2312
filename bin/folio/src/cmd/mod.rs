//! CLI command implementations.

pub mod check;
pub mod new;
pub mod show;

use std::path::Path;

use folio_core::Config;

/// Load the configuration with `FOLIO__*` overrides if the file exists,
/// falling back to defaults.
///
/// Commands that only read one document work without a site config.
pub(crate) fn config_or_default(config_path: &Path) -> color_eyre::Result<Config> {
    if config_path.exists() {
        Ok(Config::load_with_env(config_path)?)
    } else {
        tracing::debug!(?config_path, "no configuration file, using defaults");
        Ok(Config::new("http://localhost"))
    }
}

