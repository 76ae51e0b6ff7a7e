//! Settings loader for the fathom CLI
//!
//! Implements single-source priority loading with flag overrides:
//! 1. --config file/dir (highest priority)
//! 2. Current working directory: ./fathom.json or ./.fathom/config.json
//! 3. Git repository root: <repo_root>/.fathom/config.json
//! 4. User config: $XDG_CONFIG_HOME/fathom/config.json (or the platform equivalent)
//! 5. Built-in defaults
//!
//! `FATHOM_*` environment variables are applied on top of whichever source won,
//! and command-line flags on top of those.

use anyhow::{anyhow, Context, Result};
use fathom_core::SearchSettings;
use std::path::{Path, PathBuf};

const CONFIG_FILE: &str = "fathom.json";
const CONFIG_DIR: &str = ".fathom";

/// Where the resolved settings came from
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SettingsSource {
    File(PathBuf),
    Defaults,
}

/// CLI settings loader
pub struct CliConfigLoader {
    /// Override config file/directory path
    config_override: Option<PathBuf>,
    /// Directory discovery starts from
    working_dir: Option<PathBuf>,
    /// Flag overrides
    ripgrep_override: Option<PathBuf>,
    git_override: Option<PathBuf>,
    delimiter_override: Option<String>,
}

impl CliConfigLoader {
    /// Create a new loader
    pub fn new() -> Self {
        Self {
            config_override: None,
            working_dir: None,
            ripgrep_override: None,
            git_override: None,
            delimiter_override: None,
        }
    }

    /// Set config file/directory override
    pub fn with_config_override(mut self, path: PathBuf) -> Self {
        self.config_override = Some(path);
        self
    }

    /// Discover config files from `dir` instead of the process working directory
    pub fn with_working_dir(mut self, dir: PathBuf) -> Self {
        self.working_dir = Some(dir);
        self
    }

    /// Set ripgrep program override
    pub fn with_ripgrep_override(mut self, path: PathBuf) -> Self {
        self.ripgrep_override = Some(path);
        self
    }

    /// Set git program override
    pub fn with_git_override(mut self, path: PathBuf) -> Self {
        self.git_override = Some(path);
        self
    }

    /// Set platform delimiter override
    pub fn with_delimiter_override(mut self, delimiter: String) -> Self {
        self.delimiter_override = Some(delimiter);
        self
    }

    /// Load and resolve settings
    pub async fn load(&self) -> Result<SearchSettings> {
        self.load_with_source().await.map(|(settings, _)| settings)
    }

    /// Load and resolve settings, reporting which source was used
    pub async fn load_with_source(&self) -> Result<(SearchSettings, SettingsSource)> {
        // Step 1: Find and load base settings
        let (mut settings, source) = if let Some(override_path) = &self.config_override {
            let file = resolve_config_path(override_path)?;
            let settings = load_file(&file).await.with_context(|| {
                format!(
                    "Failed to load config from override path: {}",
                    override_path.display()
                )
            })?;
            (settings, SettingsSource::File(file))
        } else {
            self.search_and_load().await?
        };

        // Step 2: Environment, then flags
        apply_env_overrides(&mut settings, |name| std::env::var(name).ok())?;

        if let Some(path) = &self.ripgrep_override {
            settings.ripgrep_path = path.clone();
        }
        if let Some(path) = &self.git_override {
            settings.git_path = path.clone();
        }
        if let Some(delimiter) = &self.delimiter_override {
            settings.platform_delimiter = delimiter.clone();
        }

        // Step 3: Expand program paths and validate
        expand_program_paths(&mut settings)?;
        settings
            .validate()
            .map_err(|e| anyhow!("Settings validation failed: {}", e))?;

        tracing::debug!("Resolved settings from {:?}", source);
        Ok((settings, source))
    }

    /// Search for settings in priority order
    async fn search_and_load(&self) -> Result<(SearchSettings, SettingsSource)> {
        let cwd = match &self.working_dir {
            Some(dir) => dir.clone(),
            None => std::env::current_dir().context("Failed to read current directory")?,
        };

        let mut candidates = vec![
            cwd.join(CONFIG_FILE),
            cwd.join(CONFIG_DIR).join("config.json"),
        ];
        if let Some(git_root) = find_git_root(&cwd) {
            candidates.push(git_root.join(CONFIG_DIR).join("config.json"));
        }
        if let Some(config_dir) = dirs::config_dir() {
            candidates.push(config_dir.join("fathom").join("config.json"));
        }

        for candidate in candidates {
            if candidate.is_file() {
                let settings = load_file(&candidate).await?;
                return Ok((settings, SettingsSource::File(candidate)));
            }
        }

        Ok((SearchSettings::default(), SettingsSource::Defaults))
    }
}

impl Default for CliConfigLoader {
    fn default() -> Self {
        Self::new()
    }
}

/// A file is used as is; a directory must contain `config.json`
fn resolve_config_path(path: &Path) -> Result<PathBuf> {
    if path.is_file() {
        Ok(path.to_path_buf())
    } else if path.is_dir() {
        let config_file = path.join("config.json");
        if config_file.is_file() {
            Ok(config_file)
        } else {
            Err(anyhow!(
                "No config.json found in directory: {}",
                path.display()
            ))
        }
    } else {
        Err(anyhow!("Config path does not exist: {}", path.display()))
    }
}

/// Load a single settings file
async fn load_file(path: &Path) -> Result<SearchSettings> {
    let content = tokio::fs::read_to_string(path)
        .await
        .with_context(|| format!("Failed to read config file: {}", path.display()))?;

    serde_json::from_str(&content)
        .with_context(|| format!("Failed to parse config file: {}", path.display()))
}

/// Find the nearest ancestor of `start` containing `.git`
fn find_git_root(start: &Path) -> Option<PathBuf> {
    start
        .ancestors()
        .find(|dir| dir.join(".git").exists())
        .map(Path::to_path_buf)
}

/// Apply `FATHOM_*` variables looked up through `lookup`
fn apply_env_overrides<F>(settings: &mut SearchSettings, lookup: F) -> Result<()>
where
    F: Fn(&str) -> Option<String>,
{
    if let Some(path) = lookup("FATHOM_RG_PATH") {
        settings.ripgrep_path = PathBuf::from(path);
    }
    if let Some(path) = lookup("FATHOM_GIT_PATH") {
        settings.git_path = PathBuf::from(path);
    }
    if let Some(delimiter) = lookup("FATHOM_DELIMITER") {
        settings.platform_delimiter = delimiter;
    }
    if let Some(wait) = lookup("FATHOM_THROTTLE_MS") {
        settings.throttle_wait_ms = wait
            .trim()
            .parse()
            .with_context(|| format!("Invalid FATHOM_THROTTLE_MS: {}", wait))?;
    }
    if let Some(cap) = lookup("FATHOM_MATCH_CAP") {
        settings.match_cap = cap
            .trim()
            .parse()
            .with_context(|| format!("Invalid FATHOM_MATCH_CAP: {}", cap))?;
    }
    Ok(())
}

/// Expand `~` and `$VAR` in the configured program paths
fn expand_program_paths(settings: &mut SearchSettings) -> Result<()> {
    for path in [
        &mut settings.ripgrep_path,
        &mut settings.git_path,
        &mut settings.find_path,
    ] {
        let Some(raw) = path.to_str() else {
            continue;
        };
        let expanded = shellexpand::full(raw)
            .with_context(|| format!("Failed to expand program path: {}", raw))?;
        *path = PathBuf::from(expanded.as_ref());
    }
    Ok(())
}
