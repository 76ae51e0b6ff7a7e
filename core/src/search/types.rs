//! Request and result types shared by the search strategies

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::path::PathBuf;

/// A full-text search over the files below `root_path`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContentQuery {
    pub query: String,
    pub root_path: PathBuf,
    /// Ignore files handed to the search tool, one `--ignore-file` each
    #[serde(default)]
    pub exclude_paths: BTreeSet<String>,
    #[serde(default)]
    pub case_sensitive: bool,
}

impl ContentQuery {
    pub fn new(query: impl Into<String>, root_path: impl Into<PathBuf>) -> Self {
        Self {
            query: query.into(),
            root_path: root_path.into(),
            exclude_paths: BTreeSet::new(),
            case_sensitive: false,
        }
    }

    pub fn case_sensitive(mut self, case_sensitive: bool) -> Self {
        self.case_sensitive = case_sensitive;
        self
    }

    pub fn exclude(mut self, ignore_file: impl Into<String>) -> Self {
        self.exclude_paths.insert(ignore_file.into());
        self
    }
}

/// A file name or file path search below `root_path`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FileQuery {
    pub query: String,
    pub root_path: PathBuf,
    /// Falls back to the configured default (50) when absent
    #[serde(default)]
    pub top_results: Option<usize>,
}

impl FileQuery {
    pub fn new(query: impl Into<String>, root_path: impl Into<PathBuf>) -> Self {
        Self {
            query: query.into(),
            root_path: root_path.into(),
            top_results: None,
        }
    }

    pub fn with_top_results(mut self, top_results: usize) -> Self {
        self.top_results = Some(top_results);
        self
    }

    pub fn top_results_or(&self, default: usize) -> usize {
        self.top_results.unwrap_or(default)
    }
}

/// Whether a file search compares against the base name or the whole path
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileFlavor {
    Name,
    Path,
}

/// One matched span inside a [`MatchRecord`] line
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Submatch {
    pub text: String,
    pub start: usize,
    pub end: usize,
}

/// One line matched by the content search
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MatchRecord {
    pub file_path: String,
    /// 1-based, absent when the search tool did not report one
    pub line_number: Option<u64>,
    /// The matched line without its trailing line break
    pub matched_text: String,
    pub submatches: Vec<Submatch>,
    /// The complete JSON record as emitted by the search tool
    pub raw_payload: serde_json::Value,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_content_query_from_host_payload() {
        let query: ContentQuery = serde_json::from_str(
            r#"{"query": "TODO", "rootPath": "/work", "excludePaths": ["/work/.ignore"], "caseSensitive": true}"#,
        )
        .unwrap();

        assert_eq!(query.query, "TODO");
        assert_eq!(query.root_path, PathBuf::from("/work"));
        assert!(query.exclude_paths.contains("/work/.ignore"));
        assert!(query.case_sensitive);
    }

    #[test]
    fn test_file_query_defaults_top_results() {
        let query: FileQuery =
            serde_json::from_str(r#"{"query": "main", "rootPath": "/work"}"#).unwrap();
        assert_eq!(query.top_results, None);
        assert_eq!(query.top_results_or(50), 50);
        assert_eq!(query.with_top_results(3).top_results_or(50), 3);
    }
}
