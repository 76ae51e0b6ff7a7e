//! File search that prefers the fuzzy index over tracked files

use super::cache::{FuzzyIndexCache, TrackedFiles};
use super::plain::PlainScanner;
use super::types::{FileFlavor, FileQuery};
use crate::config::FuzzyOptions;
use crate::error::Result;
use std::path::PathBuf;
use std::sync::Arc;
use tokio::sync::Mutex;

/// Tracked-file search with a plain scan as fallback
pub struct TrackedSearch {
    cache: Mutex<FuzzyIndexCache>,
    source: Arc<dyn TrackedFiles>,
    fallback: PlainScanner,
    delimiter: String,
}

impl TrackedSearch {
    pub fn new(
        source: Arc<dyn TrackedFiles>,
        fallback: PlainScanner,
        options: FuzzyOptions,
        delimiter: impl Into<String>,
    ) -> Self {
        Self {
            cache: Mutex::new(FuzzyIndexCache::new(options)),
            source,
            fallback,
            delimiter: delimiter.into(),
        }
    }

    /// Fuzzy-ranked paths whose base name contains the query
    pub async fn names(&self, query: &FileQuery, top_results: usize) -> Result<Vec<String>> {
        self.search(FileFlavor::Name, query, top_results).await
    }

    /// Fuzzy-ranked paths
    pub async fn paths(&self, query: &FileQuery, top_results: usize) -> Result<Vec<String>> {
        self.search(FileFlavor::Path, query, top_results).await
    }

    /// Root of the resident index, if any
    pub async fn cached_root(&self) -> Option<PathBuf> {
        self.cache
            .lock()
            .await
            .resident_root()
            .map(|root| root.to_path_buf())
    }

    /// Indexes built since creation
    pub async fn builds(&self) -> usize {
        self.cache.lock().await.builds()
    }

    /// Forget the resident index; the next query rebuilds it
    pub async fn invalidate(&self) {
        self.cache.lock().await.clear();
    }

    async fn search(
        &self,
        flavor: FileFlavor,
        query: &FileQuery,
        top_results: usize,
    ) -> Result<Vec<String>> {
        let indexed = {
            let mut cache = self.cache.lock().await;
            cache
                .ensure(self.source.as_ref(), &query.root_path)
                .await
                .map(|index| {
                    index
                        .query(&query.query, top_results)
                        .into_iter()
                        .map(|hit| hit.item.to_string())
                        .collect::<Vec<_>>()
                })
        };

        let Some(hits) = indexed else {
            tracing::debug!(
                "Falling back to plain {:?} scan in {}",
                flavor,
                query.root_path.display()
            );
            return self.fallback.scan(flavor, query, top_results).await;
        };

        let results = match flavor {
            FileFlavor::Path => hits
                .iter()
                .map(|hit| self.with_delimiter(hit))
                .collect(),
            FileFlavor::Name => {
                let needle = query.query.to_lowercase();
                hits.iter()
                    .filter(|hit| base_name(hit).to_lowercase().contains(&needle))
                    .map(|hit| self.with_delimiter(hit))
                    .collect()
            }
        };

        Ok(results)
    }

    fn with_delimiter(&self, path: &str) -> String {
        if self.delimiter == "/" {
            path.to_string()
        } else {
            path.replace('/', &self.delimiter)
        }
    }
}

/// Last `/`-separated component of a tracked path
fn base_name(path: &str) -> &str {
    path.rsplit('/').next().unwrap_or(path)
}
