//! Plain file name/path scan through a platform enumeration command

use super::types::{FileFlavor, FileQuery};
use crate::config::ScanTool;
use crate::error::{Error, Result};
use crate::process;
use std::path::PathBuf;
use std::process::Stdio;
use tokio::io::{AsyncBufReadExt, AsyncReadExt, BufReader};

/// Wildcard pattern for a name search: every token becomes `*token*`
pub fn name_pattern(query: &str) -> String {
    let pattern: String = query
        .split_whitespace()
        .map(|token| format!("*{}*", token))
        .collect();

    if pattern.is_empty() {
        "*".to_string()
    } else {
        pattern
    }
}

/// Wildcard pattern for a path search: `abc` becomes `*a*b*c*`
pub fn path_pattern(query: &str) -> String {
    let mut pattern = String::with_capacity(query.len() * 2 + 1);
    pattern.push('*');
    for ch in query.chars() {
        pattern.push(ch);
        pattern.push('*');
    }
    pattern
}

/// Strip the leading "current directory" component enumeration tools print
fn strip_current_dir(line: &str) -> &str {
    line.strip_prefix("./")
        .or_else(|| line.strip_prefix(".\\"))
        .unwrap_or(line)
}

/// Runs `find` or `rg --files` below a root and collects relative paths
#[derive(Debug, Clone)]
pub struct PlainScanner {
    tool: ScanTool,
    program: PathBuf,
}

impl PlainScanner {
    pub fn new(tool: ScanTool, program: impl Into<PathBuf>) -> Self {
        Self {
            tool,
            program: program.into(),
        }
    }

    pub fn build_args(&self, flavor: FileFlavor, query: &str) -> Vec<String> {
        let pattern = match flavor {
            FileFlavor::Name => name_pattern(query),
            FileFlavor::Path => path_pattern(query),
        };

        match self.tool {
            ScanTool::Find => {
                let test = match flavor {
                    FileFlavor::Name => "-iname",
                    FileFlavor::Path => "-ipath",
                };
                vec![
                    ".".to_string(),
                    "-type".to_string(),
                    "f".to_string(),
                    test.to_string(),
                    pattern,
                ]
            }
            ScanTool::Ripgrep => vec![
                "--files".to_string(),
                "--iglob".to_string(),
                pattern,
                "./".to_string(),
            ],
        }
    }

    /// Files whose base name matches the query tokens
    pub async fn search_names(
        &self,
        query: &FileQuery,
        top_results: usize,
    ) -> Result<Vec<String>> {
        self.scan(FileFlavor::Name, query, top_results).await
    }

    /// Files whose path contains the query characters in order
    pub async fn search_paths(
        &self,
        query: &FileQuery,
        top_results: usize,
    ) -> Result<Vec<String>> {
        self.scan(FileFlavor::Path, query, top_results).await
    }

    /// Enumerate at most `top_results` files
    ///
    /// The enumeration process is killed as soon as enough lines were read.
    /// A failing exit only rejects when nothing was listed, except for the
    /// ripgrep "no match" exit which yields an empty list.
    pub async fn scan(
        &self,
        flavor: FileFlavor,
        query: &FileQuery,
        top_results: usize,
    ) -> Result<Vec<String>> {
        if top_results == 0 {
            return Ok(Vec::new());
        }

        let args = self.build_args(flavor, &query.query);
        let mut cmd = process::command(&self.program, &args, &query.root_path);
        cmd.stdout(Stdio::piped()).stderr(Stdio::piped());

        let mut child = cmd.spawn().map_err(|source| Error::Spawn {
            program: self.program.display().to_string(),
            source,
        })?;

        let stdout = child
            .stdout
            .take()
            .ok_or("Failed to capture enumeration stdout")?;
        // Drained on the side so a chatty stderr cannot stall the scan
        let stderr_task = child.stderr.take().map(|mut stderr| {
            tokio::spawn(async move {
                let mut text = String::new();
                let _ = stderr.read_to_string(&mut text).await;
                text
            })
        });

        // File names need not be UTF-8; decode each line lossily
        let mut lines = BufReader::new(stdout).split(b'\n');
        let mut results = Vec::new();
        let mut truncated = false;

        while let Some(raw) = lines.next_segment().await? {
            let line = String::from_utf8_lossy(&raw);
            let path = strip_current_dir(line.trim_end_matches('\r'));
            if path.is_empty() {
                continue;
            }
            results.push(path.to_string());
            if results.len() >= top_results {
                truncated = true;
                let _ = child.start_kill();
                break;
            }
        }
        drop(lines);

        let status = child.wait().await?;
        if !truncated && !status.success() {
            let stderr = match stderr_task {
                Some(task) => task.await.unwrap_or_default(),
                None => String::new(),
            };
            let stderr = stderr.trim();

            if !results.is_empty() {
                // e.g. find hitting an unreadable directory after listing matches
                tracing::warn!(
                    "'{}' exited with {} after listing {} files: {}",
                    self.program.display(),
                    status,
                    results.len(),
                    stderr
                );
            } else if !self.is_no_match_exit(status.code()) {
                return Err(Error::CommandFailed {
                    program: self.program.display().to_string(),
                    code: status.code(),
                    stderr: stderr.to_string(),
                });
            }
        }

        tracing::debug!(
            "Plain {:?} scan for '{}' found {} files{}",
            flavor,
            query.query,
            results.len(),
            if truncated { " (truncated)" } else { "" }
        );

        Ok(results)
    }

    /// `rg --files` exits with 1 when the glob matched nothing
    fn is_no_match_exit(&self, code: Option<i32>) -> bool {
        self.tool == ScanTool::Ripgrep && code == Some(1)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_name_pattern() {
        assert_eq!(name_pattern("main"), "*main*");
        assert_eq!(name_pattern("foo bar"), "*foo**bar*");
        assert_eq!(name_pattern("  spaced   out "), "*spaced**out*");
        assert_eq!(name_pattern(""), "*");
    }

    #[test]
    fn test_path_pattern() {
        assert_eq!(path_pattern("abc"), "*a*b*c*");
        assert_eq!(path_pattern(""), "*");
        assert_eq!(path_pattern("s/m"), "*s*/*m*");
    }

    #[test]
    fn test_strip_current_dir() {
        assert_eq!(strip_current_dir("./src/main.rs"), "src/main.rs");
        assert_eq!(strip_current_dir(".\\src\\main.rs"), "src\\main.rs");
        assert_eq!(strip_current_dir("src/main.rs"), "src/main.rs");
    }

    #[test]
    fn test_build_args_per_tool() {
        let find = PlainScanner::new(ScanTool::Find, "find");
        assert_eq!(
            find.build_args(FileFlavor::Name, "main"),
            vec![".", "-type", "f", "-iname", "*main*"]
        );
        assert_eq!(
            find.build_args(FileFlavor::Path, "sm"),
            vec![".", "-type", "f", "-ipath", "*s*m*"]
        );

        let rg = PlainScanner::new(ScanTool::Ripgrep, "rg");
        assert_eq!(
            rg.build_args(FileFlavor::Name, "main"),
            vec!["--files", "--iglob", "*main*", "./"]
        );
    }

    #[cfg(unix)]
    fn project() -> tempfile::TempDir {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path();
        std::fs::create_dir_all(root.join("src/nested")).unwrap();
        std::fs::write(root.join("main.rs"), "").unwrap();
        std::fs::write(root.join("src/module.rs"), "").unwrap();
        std::fs::write(root.join("src/nested/Main_Helper.rs"), "").unwrap();
        std::fs::write(root.join("README.md"), "").unwrap();
        dir
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_find_names_are_relative() {
        let dir = project();
        let scanner = PlainScanner::new(ScanTool::Find, "find");

        let mut results = scanner
            .search_names(&FileQuery::new("main", dir.path()), 50)
            .await
            .unwrap();
        results.sort();

        assert_eq!(results, vec!["main.rs", "src/nested/Main_Helper.rs"]);
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_find_paths_match_subsequence() {
        let dir = project();
        let scanner = PlainScanner::new(ScanTool::Find, "find");

        let results = scanner
            .search_paths(&FileQuery::new("snh", dir.path()), 50)
            .await
            .unwrap();

        assert_eq!(results, vec!["src/nested/Main_Helper.rs"]);
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_results_are_truncated() {
        let dir = project();
        let scanner = PlainScanner::new(ScanTool::Find, "find");

        let results = scanner
            .search_names(&FileQuery::new("", dir.path()), 2)
            .await
            .unwrap();
        assert_eq!(results.len(), 2);

        let results = scanner
            .search_names(&FileQuery::new("", dir.path()), 0)
            .await
            .unwrap();
        assert!(results.is_empty());
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_shell_metacharacters_stay_literal() {
        let dir = project();
        let scanner = PlainScanner::new(ScanTool::Find, "find");

        let results = scanner
            .search_names(&FileQuery::new("\"; touch pwned; echo \"", dir.path()), 50)
            .await
            .unwrap();

        assert!(results.is_empty());
        assert!(!dir.path().join("pwned").exists());
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_failing_command_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let scanner = PlainScanner::new(ScanTool::Find, "false");

        let result = scanner
            .search_names(&FileQuery::new("x", dir.path()), 50)
            .await;

        assert!(matches!(result, Err(Error::CommandFailed { .. })));
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_non_utf8_names_are_decoded_lossily() {
        use std::os::unix::ffi::OsStrExt;

        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("main.rs"), "").unwrap();
        let raw_name = std::ffi::OsStr::from_bytes(b"main\xff.rs");
        std::fs::write(dir.path().join(raw_name), "").unwrap();
        let scanner = PlainScanner::new(ScanTool::Find, "find");

        let mut results = scanner
            .search_names(&FileQuery::new("main", dir.path()), 50)
            .await
            .unwrap();
        results.sort();

        assert_eq!(results, vec!["main.rs", "main\u{FFFD}.rs"]);
    }

    #[cfg(unix)]
    fn fake_tool(dir: &std::path::Path, body: &str) -> PathBuf {
        use std::os::unix::fs::PermissionsExt;

        let script = dir.join("fake-scan");
        std::fs::write(&script, format!("#!/bin/sh\n{body}\n")).unwrap();
        let mut perms = std::fs::metadata(&script).unwrap().permissions();
        perms.set_mode(0o755);
        std::fs::set_permissions(&script, perms).unwrap();
        script
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_partial_listing_survives_failing_exit() {
        let dir = tempfile::tempdir().unwrap();
        let tool = fake_tool(
            dir.path(),
            "echo ./src/main.rs\necho 'find: ./locked: Permission denied' >&2\nexit 1",
        );
        let scanner = PlainScanner::new(ScanTool::Find, tool);

        let results = scanner
            .search_names(&FileQuery::new("main", dir.path()), 50)
            .await
            .unwrap();

        assert_eq!(results, vec!["src/main.rs"]);
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_ripgrep_no_match_exit_is_empty() {
        let dir = tempfile::tempdir().unwrap();
        let scanner = PlainScanner::new(ScanTool::Ripgrep, fake_tool(dir.path(), "exit 1"));

        let results = scanner
            .search_names(&FileQuery::new("nothing", dir.path()), 50)
            .await
            .unwrap();
        assert!(results.is_empty());

        let scanner = PlainScanner::new(
            ScanTool::Ripgrep,
            fake_tool(dir.path(), "echo 'rg: bad glob' >&2\nexit 2"),
        );
        let result = scanner
            .search_names(&FileQuery::new("nothing", dir.path()), 50)
            .await;
        assert!(matches!(result, Err(Error::CommandFailed { code: Some(2), .. })));
    }

    #[tokio::test]
    async fn test_missing_program_is_spawn_error() {
        let scanner = PlainScanner::new(ScanTool::Find, "definitely-not-a-real-find-fathom");
        let result = scanner
            .search_paths(&FileQuery::new("x", std::env::temp_dir()), 50)
            .await;
        assert!(matches!(result, Err(Error::Spawn { .. })));
    }
}
