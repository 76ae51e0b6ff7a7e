//! Single-slot fuzzy index over the tracked files of one root

use super::fuzzy::{FuzzyEngine, FuzzyHit};
use crate::config::FuzzyOptions;
use crate::error::Result;
use crate::process;
use async_trait::async_trait;
use std::path::{Path, PathBuf};
use tokio::time::Duration;

/// Source of the version-controlled file list for a directory
#[async_trait]
pub trait TrackedFiles: Send + Sync {
    /// Whether `root` lies inside a working tree this source understands
    async fn is_available(&self, root: &Path) -> bool;

    /// Tracked files below `root`, relative to it and `/`-separated
    async fn list(&self, root: &Path) -> Result<Vec<String>>;
}

/// [`TrackedFiles`] backed by the git executable
#[derive(Debug, Clone)]
pub struct GitTrackedFiles {
    program: PathBuf,
    timeout: Duration,
}

impl GitTrackedFiles {
    pub fn new(program: impl Into<PathBuf>, timeout: Duration) -> Self {
        Self {
            program: program.into(),
            timeout,
        }
    }
}

#[async_trait]
impl TrackedFiles for GitTrackedFiles {
    async fn is_available(&self, root: &Path) -> bool {
        process::command_succeeds(
            &self.program,
            ["rev-parse", "--is-inside-work-tree"],
            root,
            self.timeout,
        )
        .await
    }

    async fn list(&self, root: &Path) -> Result<Vec<String>> {
        let output =
            process::run_command(&self.program, ["ls-files", "-z"], root, self.timeout).await?;
        let output = process::ensure_success(&self.program, output)?;

        let files = split_nul_list(&output.stdout);
        tracing::debug!(
            "Listed {} tracked files in {} ({}ms)",
            files.len(),
            root.display(),
            output.duration_ms
        );
        Ok(files)
    }
}

/// Split `-z` output into entries, ignoring the trailing terminator
fn split_nul_list(raw: &[u8]) -> Vec<String> {
    raw.split(|b| *b == 0)
        .filter(|entry| !entry.is_empty())
        .map(|entry| String::from_utf8_lossy(entry).into_owned())
        .collect()
}

/// A fuzzy engine together with the root it was built for
#[derive(Debug)]
pub struct FuzzyIndex {
    root: PathBuf,
    engine: FuzzyEngine,
}

impl FuzzyIndex {
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Best `limit` hits for `query`
    pub fn query(&self, query: &str, limit: usize) -> Vec<FuzzyHit<'_>> {
        let mut hits = self.engine.search(query);
        hits.truncate(limit);
        hits
    }
}

/// Holds at most one [`FuzzyIndex`]
///
/// A query for another root replaces the resident index entirely; there
/// are no incremental updates.
#[derive(Debug)]
pub struct FuzzyIndexCache {
    slot: Option<FuzzyIndex>,
    options: FuzzyOptions,
    builds: usize,
}

impl FuzzyIndexCache {
    pub fn new(options: FuzzyOptions) -> Self {
        Self {
            slot: None,
            options,
            builds: 0,
        }
    }

    /// Root of the resident index, if any
    pub fn resident_root(&self) -> Option<&Path> {
        self.slot.as_ref().map(|index| index.root.as_path())
    }

    /// How many indexes were built so far
    pub fn builds(&self) -> usize {
        self.builds
    }

    pub fn clear(&mut self) {
        if let Some(index) = self.slot.take() {
            tracing::debug!("Dropping fuzzy index for {}", index.root.display());
        }
    }

    /// Make sure an index for `root` is resident, building one if needed
    ///
    /// Returns `None` when the source is unavailable for `root` or the listing
    /// failed. A failed listing also empties the cache.
    pub async fn ensure(
        &mut self,
        source: &dyn TrackedFiles,
        root: &Path,
    ) -> Option<&FuzzyIndex> {
        if !source.is_available(root).await {
            tracing::debug!("No tracked files for {}", root.display());
            return None;
        }

        if self.resident_root() != Some(root) {
            match source.list(root).await {
                Ok(files) => self.install(root, files),
                Err(e) => {
                    tracing::warn!("Listing tracked files in {} failed: {}", root.display(), e);
                    self.clear();
                    return None;
                }
            }
        }

        self.slot.as_ref()
    }

    fn install(&mut self, root: &Path, files: Vec<String>) {
        self.builds += 1;
        tracing::info!(
            "Built fuzzy index for {} with {} files{}",
            root.display(),
            files.len(),
            if self.slot.is_some() { " (replaced previous root)" } else { "" }
        );

        self.slot = Some(FuzzyIndex {
            root: root.to_path_buf(),
            engine: FuzzyEngine::new(files, self.options),
        });
    }
}
