//! Search subcommands

use crate::output::{print_matches, print_paths, OutputFormat};
use anyhow::{Context, Result};
use fathom_core::{ContentQuery, FileQuery, SearchService, SearchSettings};
use std::path::{Path, PathBuf};
use tracing::info;

/// Options shared by the `names` and `paths` subcommands
#[derive(Debug, Clone)]
pub struct FileSearchArgs {
    pub query: String,
    pub top: Option<usize>,
    pub tracked: bool,
}

/// Canonical form of the search root, so the tracked index is keyed consistently
pub fn resolve_root(root: &Path) -> Result<PathBuf> {
    std::fs::canonicalize(root)
        .with_context(|| format!("Search root does not exist: {}", root.display()))
}

/// Full-text search below the root
pub async fn content_command(
    settings: SearchSettings,
    root: PathBuf,
    query: String,
    case_sensitive: bool,
    ignore_files: Vec<String>,
    format: OutputFormat,
) -> Result<()> {
    info!("Searching contents of {} for '{}'", root.display(), query);

    let service = SearchService::new(settings)?;
    let mut request = ContentQuery::new(query, root).case_sensitive(case_sensitive);
    for ignore_file in ignore_files {
        request = request.exclude(ignore_file);
    }

    let records = service.search_content(request).await?;
    print_matches(&records, format)
}

/// File name search, fuzzy over tracked files with `--tracked`
pub async fn names_command(
    settings: SearchSettings,
    root: PathBuf,
    args: FileSearchArgs,
    format: OutputFormat,
) -> Result<()> {
    info!("Searching file names in {} for '{}'", root.display(), args.query);

    let service = SearchService::new(settings)?;
    let request = file_query(&args, root);
    let paths = if args.tracked {
        service.search_tracked_file_names(request).await?
    } else {
        service.search_file_names(request).await?
    };

    print_paths(&paths, format)
}

/// File path search, fuzzy over tracked files with `--tracked`
pub async fn paths_command(
    settings: SearchSettings,
    root: PathBuf,
    args: FileSearchArgs,
    format: OutputFormat,
) -> Result<()> {
    info!("Searching file paths in {} for '{}'", root.display(), args.query);

    let service = SearchService::new(settings)?;
    let request = file_query(&args, root);
    let paths = if args.tracked {
        service.search_tracked_file_paths(request).await?
    } else {
        service.search_file_paths(request).await?
    };

    print_paths(&paths, format)
}

fn file_query(args: &FileSearchArgs, root: PathBuf) -> FileQuery {
    let query = FileQuery::new(args.query.clone(), root);
    match args.top {
        Some(top) => query.with_top_results(top),
        None => query,
    }
}
