//! Folio CLI
//!
//! Front matter content pipeline for static blogs.
//!
//! This is the binary entry point. The library functionality is in `lib.rs`.

use clap::{Parser, ValueEnum};
use color_eyre::eyre::Result;
use folio_core::FrontMatterFormat;

/// Command-line interface for Folio.
#[derive(Parser)]
#[command(
    name = "folio",
    version,
    about = "Parse, check and scaffold front matter content"
)]
struct Cli {
    /// Path to configuration file
    #[arg(short, long, default_value = "config.toml")]
    config: std::path::PathBuf,

    /// Increase verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

/// Front matter format selectable on the command line.
#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
enum FormatArg {
    /// `+++` fenced TOML
    Toml,
    /// `---` fenced YAML
    Yaml,
}

impl From<FormatArg> for FrontMatterFormat {
    fn from(arg: FormatArg) -> Self {
        match arg {
            FormatArg::Toml => Self::Toml,
            FormatArg::Yaml => Self::Yaml,
        }
    }
}

/// Available CLI commands.
#[derive(clap::Subcommand)]
enum Commands {
    /// Parse every content document and report all errors
    Check {
        /// Treat warnings as errors
        #[arg(long)]
        strict: bool,
    },
    /// Print the metadata and body of one document
    Show {
        /// Document to parse
        file: std::path::PathBuf,
        /// Print the rendered HTML body instead of the raw body
        #[arg(long)]
        html: bool,
    },
    /// Create new content with front matter
    New {
        /// Path for the new content (e.g., posts/my-article)
        path: std::path::PathBuf,
        /// Front matter format
        #[arg(short, long, value_enum, default_value_t = FormatArg::Toml)]
        format: FormatArg,
    },
}

fn main() -> Result<()> {
    color_eyre::install()?;

    let cli = Cli::parse();
    folio::init_tracing(cli.verbose);

    match cli.command {
        Commands::Check { strict } => {
            folio::cmd::check::run(&cli.config, strict)?;
        }
        Commands::Show { file, html } => {
            folio::cmd::show::run(&cli.config, &file, html)?;
        }
        Commands::New { path, format } => {
            folio::cmd::new::run(&cli.config, &path, format.into())?;
        }
    }

    Ok(())
}
