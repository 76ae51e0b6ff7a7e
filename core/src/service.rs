//! The search service handed to an editor host
//!
//! Each entry point has its own [`Throttle`], so a burst of keystrokes in one
//! search box never delays another kind of search.

use crate::config::{ScanTool, SearchSettings};
use crate::error::Result;
use crate::search::{
    ContentQuery, ContentSearcher, FileQuery, GitTrackedFiles, MatchRecord, PlainScanner,
    TrackedFiles, TrackedSearch,
};
use crate::throttle::Throttle;
use std::path::PathBuf;
use std::sync::Arc;
use tokio::time::Duration;

/// Entry points for content, file name and file path searches
pub struct SearchService {
    settings: SearchSettings,
    tracked: Arc<TrackedSearch>,
    content: Throttle<ContentQuery, Vec<MatchRecord>>,
    file_names: Throttle<FileQuery, Vec<String>>,
    file_paths: Throttle<FileQuery, Vec<String>>,
    tracked_names: Throttle<FileQuery, Vec<String>>,
    tracked_paths: Throttle<FileQuery, Vec<String>>,
}

impl SearchService {
    /// Create a service that lists tracked files through git
    pub fn new(settings: SearchSettings) -> Result<Self> {
        let source = GitTrackedFiles::new(
            settings.git_path.clone(),
            Duration::from_secs(settings.command_timeout_secs),
        );
        Self::with_tracked_source(settings, Arc::new(source))
    }

    /// Create a service with a custom tracked-file source
    pub fn with_tracked_source(
        settings: SearchSettings,
        source: Arc<dyn TrackedFiles>,
    ) -> Result<Self> {
        settings.validate()?;

        let wait = Duration::from_millis(settings.throttle_wait_ms);
        let top_default = settings.default_top_results;

        let scan_program = match settings.scan_tool {
            ScanTool::Find => settings.find_path.clone(),
            ScanTool::Ripgrep => settings.ripgrep_path.clone(),
        };
        let scanner = Arc::new(PlainScanner::new(settings.scan_tool, scan_program));
        let searcher = Arc::new(ContentSearcher::new(
            settings.ripgrep_path.clone(),
            settings.match_cap,
        ));
        let tracked = Arc::new(TrackedSearch::new(
            source,
            (*scanner).clone(),
            settings.fuzzy,
            settings.platform_delimiter.clone(),
        ));

        let content = Throttle::new(wait, move |query: ContentQuery| {
            let searcher = Arc::clone(&searcher);
            async move { Ok(searcher.search(&query).await) }
        });

        let file_names = {
            let scanner = Arc::clone(&scanner);
            Throttle::new(wait, move |query: FileQuery| {
                let scanner = Arc::clone(&scanner);
                async move {
                    let top = query.top_results_or(top_default);
                    scanner.search_names(&query, top).await
                }
            })
        };

        let file_paths = Throttle::new(wait, move |query: FileQuery| {
            let scanner = Arc::clone(&scanner);
            async move {
                let top = query.top_results_or(top_default);
                scanner.search_paths(&query, top).await
            }
        });

        let tracked_names = {
            let tracked = Arc::clone(&tracked);
            Throttle::new(wait, move |query: FileQuery| {
                let tracked = Arc::clone(&tracked);
                async move {
                    let top = query.top_results_or(top_default);
                    tracked.names(&query, top).await
                }
            })
        };

        let tracked_paths = {
            let tracked = Arc::clone(&tracked);
            Throttle::new(wait, move |query: FileQuery| {
                let tracked = Arc::clone(&tracked);
                async move {
                    let top = query.top_results_or(top_default);
                    tracked.paths(&query, top).await
                }
            })
        };

        tracing::debug!(
            "Search service ready (throttle {}ms, scan tool {:?})",
            settings.throttle_wait_ms,
            settings.scan_tool
        );

        Ok(Self {
            settings,
            tracked,
            content,
            file_names,
            file_paths,
            tracked_names,
            tracked_paths,
        })
    }

    pub fn settings(&self) -> &SearchSettings {
        &self.settings
    }

    /// Lines matching the query below its root
    pub async fn search_content(&self, query: ContentQuery) -> Result<Vec<MatchRecord>> {
        tracing::debug!("Content search request: '{}'", query.query);
        self.content.call(query).await
    }

    /// Files whose base name matches the query, via a plain scan
    pub async fn search_file_names(&self, query: FileQuery) -> Result<Vec<String>> {
        tracing::debug!("File name search request: '{}'", query.query);
        self.file_names.call(query).await
    }

    /// Files whose path contains the query characters in order, via a plain scan
    pub async fn search_file_paths(&self, query: FileQuery) -> Result<Vec<String>> {
        tracing::debug!("File path search request: '{}'", query.query);
        self.file_paths.call(query).await
    }

    /// Fuzzy file name search over tracked files, falling back to a plain scan
    pub async fn search_tracked_file_names(&self, query: FileQuery) -> Result<Vec<String>> {
        tracing::debug!("Tracked file name search request: '{}'", query.query);
        self.tracked_names.call(query).await
    }

    /// Fuzzy file path search over tracked files, falling back to a plain scan
    pub async fn search_tracked_file_paths(&self, query: FileQuery) -> Result<Vec<String>> {
        tracing::debug!("Tracked file path search request: '{}'", query.query);
        self.tracked_paths.call(query).await
    }

    /// Drop the resident fuzzy index, e.g. after files were added or removed
    pub async fn invalidate_tracked_cache(&self) {
        self.tracked.invalidate().await;
    }

    /// Root of the resident fuzzy index, if any
    pub async fn cached_root(&self) -> Option<PathBuf> {
        self.tracked.cached_root().await
    }

    /// Fuzzy indexes built so far
    pub async fn tracked_index_builds(&self) -> usize {
        self.tracked.builds().await
    }
}
