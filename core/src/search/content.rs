//! Full-text search backed by a streaming ripgrep process

use super::stream::MatchLineBuffer;
use super::types::{ContentQuery, MatchRecord};
use crate::process;
use std::ffi::OsString;
use std::path::PathBuf;
use std::process::Stdio;
use tokio::io::AsyncReadExt;
use tokio::time::Instant;

const READ_CHUNK_SIZE: usize = 8 * 1024;

/// Runs the line-search tool and collects its match records
#[derive(Debug, Clone)]
pub struct ContentSearcher {
    program: PathBuf,
    match_cap: usize,
}

impl ContentSearcher {
    pub fn new(program: impl Into<PathBuf>, match_cap: usize) -> Self {
        Self {
            program: program.into(),
            match_cap,
        }
    }

    /// Argument vector for one query; the query stays a single token
    pub fn build_args(query: &ContentQuery) -> Vec<OsString> {
        let mut args: Vec<OsString> =
            ["--json", "--line-number", "--with-filename", "--sort-files"]
                .into_iter()
                .map(OsString::from)
                .collect();

        if query.case_sensitive {
            args.push("--case-sensitive".into());
        } else {
            args.push("-i".into());
        }

        for ignore_file in &query.exclude_paths {
            args.push("--ignore-file".into());
            args.push(ignore_file.into());
        }

        // Everything after `--` is positional, even a query starting with '-'
        args.push("--".into());
        args.push(query.query.as_str().into());
        args.push(query.root_path.clone().into_os_string());
        args
    }

    /// Search and return what was collected
    ///
    /// Never fails: a missing program or a broken pipe yields whatever was
    /// gathered up to that point, possibly nothing. Once more than the
    /// configured cap arrived the process is killed and the rest of its
    /// output is ignored.
    pub async fn search(&self, query: &ContentQuery) -> Vec<MatchRecord> {
        let start_time = Instant::now();
        let mut cmd = process::command(&self.program, Self::build_args(query), &query.root_path);
        cmd.stdout(Stdio::piped()).stderr(Stdio::null());

        let mut child = match cmd.spawn() {
            Ok(child) => child,
            Err(e) => {
                tracing::warn!(
                    "Content search could not start '{}': {}",
                    self.program.display(),
                    e
                );
                return Vec::new();
            }
        };

        let Some(mut stdout) = child.stdout.take() else {
            tracing::warn!("Content search stdout unavailable");
            let _ = child.start_kill();
            let _ = child.wait().await;
            return Vec::new();
        };

        let mut buffer = MatchLineBuffer::new();
        let mut records = Vec::new();
        let mut chunk = vec![0u8; READ_CHUNK_SIZE];
        let mut capped = false;
        let mut completed = false;

        loop {
            match stdout.read(&mut chunk).await {
                Ok(0) => {
                    completed = true;
                    break;
                }
                Ok(n) => {
                    records.extend(buffer.push_chunk(&chunk[..n]));
                    if records.len() > self.match_cap {
                        capped = true;
                        if let Err(e) = child.start_kill() {
                            tracing::debug!("Content search already gone at cap: {}", e);
                        }
                        break;
                    }
                }
                Err(e) => {
                    tracing::warn!("Content search output read failed: {}", e);
                    let _ = child.start_kill();
                    break;
                }
            }
        }
        drop(stdout);

        if completed {
            records.extend(buffer.finish());
        }

        match child.wait().await {
            Ok(status) if !capped && !status.success() => {
                // ripgrep exits with 1 when nothing matched
                tracing::debug!("Content search exited with {}", status);
            }
            Ok(_) => {}
            Err(e) => tracing::warn!("Content search wait failed: {}", e),
        }

        tracing::debug!(
            "Content search for '{}' in {} returned {} matches in {}ms{}",
            query.query,
            query.root_path.display(),
            records.len(),
            start_time.elapsed().as_millis(),
            if capped { " (capped)" } else { "" }
        );

        records
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::Path;

    fn args_as_strings(query: &ContentQuery) -> Vec<String> {
        ContentSearcher::build_args(query)
            .into_iter()
            .map(|a| a.to_string_lossy().into_owned())
            .collect()
    }

    #[test]
    fn test_build_args_case_insensitive() {
        let query = ContentQuery::new("TODO", "/work");
        let args = args_as_strings(&query);

        assert_eq!(
            args,
            vec![
                "--json",
                "--line-number",
                "--with-filename",
                "--sort-files",
                "-i",
                "--",
                "TODO",
                "/work"
            ]
        );
    }

    #[test]
    fn test_build_args_with_ignore_files() {
        let query = ContentQuery::new("fn main", "/work")
            .case_sensitive(true)
            .exclude("/work/.a-ignore")
            .exclude("/work/.b-ignore");
        let args = args_as_strings(&query);

        assert!(args.contains(&"--case-sensitive".to_string()));
        assert!(!args.contains(&"-i".to_string()));
        let ignore_pairs: Vec<_> = args
            .windows(2)
            .filter(|w| w[0] == "--ignore-file")
            .map(|w| w[1].clone())
            .collect();
        assert_eq!(ignore_pairs, vec!["/work/.a-ignore", "/work/.b-ignore"]);
        // The query is one token even with whitespace in it
        assert_eq!(&args[args.len() - 2..], ["fn main", "/work"]);
    }

    #[tokio::test]
    async fn test_missing_program_returns_empty() {
        let searcher = ContentSearcher::new("definitely-not-a-real-rg-fathom", 500);
        let query = ContentQuery::new("x", std::env::temp_dir());
        assert!(searcher.search(&query).await.is_empty());
    }

    #[cfg(unix)]
    fn fake_search_tool(dir: &Path, body: &str) -> PathBuf {
        use std::os::unix::fs::PermissionsExt;

        let script = dir.join("fake-rg");
        std::fs::write(&script, format!("#!/bin/sh\n{body}\n")).unwrap();
        let mut perms = std::fs::metadata(&script).unwrap().permissions();
        perms.set_mode(0o755);
        std::fs::set_permissions(&script, perms).unwrap();
        script
    }

    #[cfg(unix)]
    fn match_line(n: usize) -> String {
        format!(
            r#"{{"type":"match","data":{{"path":{{"text":"f.txt"}},"lines":{{"text":"hit {n}\n"}},"line_number":{n},"submatches":[]}}}}"#
        )
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_fake_tool_output_is_filtered() {
        let dir = tempfile::tempdir().unwrap();
        let begin = r#"{"type":"begin","data":{"path":{"text":"f.txt"}}}"#;
        let body = format!(
            "printf '%s\\n' '{begin}' '{}' '{}'\nprintf '%s' '{}'",
            match_line(1),
            match_line(2),
            match_line(3)
        );
        let searcher = ContentSearcher::new(fake_search_tool(dir.path(), &body), 500);

        let records = searcher
            .search(&ContentQuery::new("hit", dir.path()))
            .await;

        let lines: Vec<_> = records.iter().filter_map(|r| r.line_number).collect();
        assert_eq!(lines, vec![1, 2, 3]);
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_cap_kills_endless_producer() {
        let dir = tempfile::tempdir().unwrap();
        let body = format!("while true; do printf '%s\\n' '{}'; done", match_line(7));
        let searcher = ContentSearcher::new(fake_search_tool(dir.path(), &body), 500);

        let records = tokio::time::timeout(
            std::time::Duration::from_secs(20),
            searcher.search(&ContentQuery::new("hit", dir.path())),
        )
        .await
        .expect("capped search must terminate");

        assert!(records.len() > 500);
        // One read chunk holds at most this many lines on top of the cap
        assert!(records.len() <= 500 + READ_CHUNK_SIZE / match_line(7).len() + 1);
        assert!(records.iter().all(|r| r.line_number == Some(7)));
    }

    #[tokio::test]
    async fn test_ripgrep_case_insensitive_line_number() {
        if which::which("rg").is_err() {
            eprintln!("rg not installed, skipping");
            return;
        }

        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("notes.txt"), "first\nsecond\ntodo\n").unwrap();
        let searcher = ContentSearcher::new("rg", 500);

        let records = searcher
            .search(&ContentQuery::new("TODO", dir.path()).case_sensitive(false))
            .await;

        assert_eq!(records.len(), 1);
        assert_eq!(records[0].line_number, Some(3));
        assert_eq!(records[0].matched_text, "todo");
        assert!(records[0].file_path.ends_with("notes.txt"));

        let records = searcher
            .search(&ContentQuery::new("TODO", dir.path()).case_sensitive(true))
            .await;
        assert!(records.is_empty());
    }
}
