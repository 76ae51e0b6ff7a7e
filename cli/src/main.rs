//! # fathom CLI
//!
//! Command-line front end for fathom - incremental project search.
//!
//! ## Usage
//!
//! - `fathom content <query>` - Search file contents with ripgrep
//! - `fathom names <query>` - Find files by name (`--tracked` for the fuzzy index)
//! - `fathom paths <query>` - Find files by path (`--tracked` for the fuzzy index)
//! - `fathom settings` - Show the resolved settings
//!
//! Results go to stdout, logs to stderr.

use anyhow::Result;
use clap::{Parser, Subcommand};
use std::io::IsTerminal;
use std::path::PathBuf;

mod commands;
mod config;
mod output;

use commands::{
    content_command, names_command, paths_command, resolve_root, settings_command,
    FileSearchArgs,
};
use config::CliConfigLoader;
use output::OutputFormat;

/// fathom - Incremental content and file search
#[derive(Parser)]
#[command(name = "fathom")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Incremental content and file search for project trees")]
#[command(long_about = None)]
struct Cli {
    /// Configuration file or directory path
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Directory to search
    #[arg(short, long, global = true, default_value = ".")]
    root: PathBuf,

    /// ripgrep program override
    #[arg(long, global = true)]
    rg_path: Option<PathBuf>,

    /// git program override
    #[arg(long, global = true)]
    git_path: Option<PathBuf>,

    /// Separator used in paths returned by tracked searches
    #[arg(long, global = true)]
    delimiter: Option<String>,

    /// Print results as JSON
    #[arg(long, global = true)]
    json: bool,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Search file contents
    Content {
        /// Text to search for
        query: String,

        /// Match case exactly
        #[arg(short = 's', long)]
        case_sensitive: bool,

        /// Additional ignore file handed to ripgrep (repeatable)
        #[arg(long = "ignore-file")]
        ignore_files: Vec<String>,
    },

    /// Find files by name
    Names {
        /// Name fragment(s) to search for
        query: String,

        /// Maximum number of results
        #[arg(short = 'n', long)]
        top: Option<usize>,

        /// Rank tracked files with the fuzzy index
        #[arg(short, long)]
        tracked: bool,
    },

    /// Find files by path
    Paths {
        /// Characters the path must contain in order
        query: String,

        /// Maximum number of results
        #[arg(short = 'n', long)]
        top: Option<usize>,

        /// Rank tracked files with the fuzzy index
        #[arg(short, long)]
        tracked: bool,
    },

    /// Show the resolved settings
    Settings,
}

/// Build a configuration loader from CLI arguments
fn build_config_loader(cli: &Cli) -> CliConfigLoader {
    let mut loader = CliConfigLoader::new();

    if let Some(config_path) = &cli.config {
        loader = loader.with_config_override(config_path.clone());
    }

    if let Some(rg_path) = &cli.rg_path {
        loader = loader.with_ripgrep_override(rg_path.clone());
    }

    if let Some(git_path) = &cli.git_path {
        loader = loader.with_git_override(git_path.clone());
    }

    if let Some(delimiter) = &cli.delimiter {
        loader = loader.with_delimiter_override(delimiter.clone());
    }

    loader
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize tracing; RUST_LOG wins unless --verbose was given
    if cli.verbose {
        fathom_core::init_tracing_with_debug(true);
    } else if std::env::var_os("RUST_LOG").is_some() {
        fathom_core::init_tracing();
    } else {
        fathom_core::init_tracing_with_debug(false);
    }

    if cli.json || !std::io::stdout().is_terminal() {
        colored::control::set_override(false);
    }

    let format = OutputFormat::from_flag(cli.json);
    let (settings, source) = build_config_loader(&cli).load_with_source().await?;

    match cli.command {
        Commands::Settings => settings_command(settings, source).await,
        Commands::Content {
            query,
            case_sensitive,
            ignore_files,
        } => {
            let root = resolve_root(&cli.root)?;
            content_command(settings, root, query, case_sensitive, ignore_files, format).await
        }
        Commands::Names { query, top, tracked } => {
            let root = resolve_root(&cli.root)?;
            let args = FileSearchArgs {
                query,
                top,
                tracked,
            };
            names_command(settings, root, args, format).await
        }
        Commands::Paths { query, top, tracked } => {
            let root = resolve_root(&cli.root)?;
            let args = FileSearchArgs {
                query,
                top,
                tracked,
            };
            paths_command(settings, root, args, format).await
        }
    }
}
