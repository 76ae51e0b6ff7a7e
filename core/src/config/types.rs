//! Settings types for fathom core
//!
//! Core only accepts fully resolved, validated settings.
//! All discovery, loading, and merging happens in the CLI layer.

use crate::error::{ConfigError, Result};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Which enumeration command backs the plain name/path scan
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScanTool {
    /// `find . -type f -iname|-ipath <pattern>`
    Find,
    /// `rg --files --iglob <pattern> ./`
    Ripgrep,
}

impl Default for ScanTool {
    fn default() -> Self {
        if cfg!(target_os = "windows") {
            ScanTool::Ripgrep
        } else {
            ScanTool::Find
        }
    }
}

/// Fuzzy engine parameters
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FuzzyOptions {
    /// Attach the match score to every hit
    pub include_score: bool,
    /// Highest score (0.0 is a perfect match) a hit may have
    pub threshold: f64,
    /// How far from the start of a candidate a match may drift before it scores 1.0
    pub distance: usize,
    /// Compare characters exactly instead of case-folded
    pub case_sensitive: bool,
}

impl Default for FuzzyOptions {
    fn default() -> Self {
        Self {
            include_score: true,
            threshold: 0.3,
            distance: 50,
            case_sensitive: false,
        }
    }
}

/// Resolved settings for a [`crate::SearchService`]
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SearchSettings {
    /// Line-search program (ripgrep)
    pub ripgrep_path: PathBuf,
    /// Version-control program
    pub git_path: PathBuf,
    /// Recursive enumeration program used by [`ScanTool::Find`]
    pub find_path: PathBuf,
    /// Enumeration command for plain name/path scans
    pub scan_tool: ScanTool,
    /// Separator written into paths returned by the tracked-file searches
    pub platform_delimiter: String,
    /// Content search kills the search process once more matches than this arrived
    pub match_cap: usize,
    /// Result count used when a file query does not name one
    pub default_top_results: usize,
    /// Coalescing window applied to every entry point, in milliseconds
    pub throttle_wait_ms: u64,
    /// Upper bound for the version-control probe and listing commands
    pub command_timeout_secs: u64,
    /// Fuzzy engine parameters for the tracked-file index
    pub fuzzy: FuzzyOptions,
}

impl Default for SearchSettings {
    fn default() -> Self {
        Self {
            ripgrep_path: PathBuf::from("rg"),
            git_path: PathBuf::from("git"),
            find_path: PathBuf::from("find"),
            scan_tool: ScanTool::default(),
            platform_delimiter: std::path::MAIN_SEPARATOR_STR.to_string(),
            match_cap: 500,
            default_top_results: 50,
            throttle_wait_ms: 0,
            command_timeout_secs: 30,
            fuzzy: FuzzyOptions::default(),
        }
    }
}

impl SearchSettings {
    /// Create settings with defaults for the current platform
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the ripgrep program
    pub fn with_ripgrep_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.ripgrep_path = path.into();
        self
    }

    /// Set the git program
    pub fn with_git_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.git_path = path.into();
        self
    }

    /// Set the platform delimiter
    pub fn with_delimiter(mut self, delimiter: impl Into<String>) -> Self {
        self.platform_delimiter = delimiter.into();
        self
    }

    /// Set the throttle window
    pub fn with_throttle_wait_ms(mut self, wait_ms: u64) -> Self {
        self.throttle_wait_ms = wait_ms;
        self
    }

    /// Set the content match cap
    pub fn with_match_cap(mut self, cap: usize) -> Self {
        self.match_cap = cap;
        self
    }

    /// Validate the settings
    pub fn validate(&self) -> Result<()> {
        for (field, path) in [
            ("ripgrep_path", &self.ripgrep_path),
            ("git_path", &self.git_path),
            ("find_path", &self.find_path),
        ] {
            if path.as_os_str().is_empty() {
                return Err(ConfigError::MissingField {
                    field: field.to_string(),
                }
                .into());
            }
        }

        if self.platform_delimiter.is_empty() {
            return Err(ConfigError::MissingField {
                field: "platform_delimiter".to_string(),
            }
            .into());
        }

        if self.match_cap == 0 {
            return Err(ConfigError::InvalidValue {
                field: "match_cap".to_string(),
                value: "0".to_string(),
            }
            .into());
        }

        let threshold = self.fuzzy.threshold;
        if !(0.0..=1.0).contains(&threshold) {
            return Err(ConfigError::InvalidValue {
                field: "fuzzy.threshold".to_string(),
                value: threshold.to_string(),
            }
            .into());
        }

        if self.fuzzy.distance == 0 {
            return Err(ConfigError::InvalidValue {
                field: "fuzzy.distance".to_string(),
                value: "0".to_string(),
            }
            .into());
        }

        Ok(())
    }
}
