use assert_cmd::Command;
use predicates::prelude::*;
use std::fs;
use std::path::Path;
use tempfile::TempDir;

/// The binary, isolated from the caller's settings files and environment
fn fathom(cwd: &Path) -> Command {
    let mut cmd = Command::cargo_bin("fathom").unwrap();
    cmd.current_dir(cwd)
        .env("XDG_CONFIG_HOME", cwd.join(".xdg"))
        .env_remove("RUST_LOG")
        .env_remove("FATHOM_RG_PATH")
        .env_remove("FATHOM_GIT_PATH")
        .env_remove("FATHOM_DELIMITER")
        .env_remove("FATHOM_THROTTLE_MS")
        .env_remove("FATHOM_MATCH_CAP");
    cmd
}

fn project() -> TempDir {
    let dir = TempDir::new().unwrap();
    fs::create_dir_all(dir.path().join("src/nested")).unwrap();
    fs::write(dir.path().join("main.rs"), "fn main() {}\n").unwrap();
    fs::write(dir.path().join("src/lib.rs"), "// TODO: docs\n").unwrap();
    fs::write(dir.path().join("src/nested/helper.rs"), "pub fn help() {}\n").unwrap();
    dir
}

#[test]
fn test_help_lists_subcommands() {
    let dir = TempDir::new().unwrap();
    fathom(dir.path())
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("content"))
        .stdout(predicate::str::contains("names"))
        .stdout(predicate::str::contains("paths"))
        .stdout(predicate::str::contains("settings"));
}

#[test]
fn test_settings_defaults() {
    let dir = TempDir::new().unwrap();
    fathom(dir.path())
        .arg("settings")
        .assert()
        .success()
        .stdout(predicate::str::contains("\"match_cap\": 500"))
        .stderr(predicate::str::contains("using defaults"));
}

#[test]
fn test_settings_from_working_dir_file() {
    let dir = TempDir::new().unwrap();
    fs::write(dir.path().join("fathom.json"), r#"{"match_cap": 7}"#).unwrap();

    fathom(dir.path())
        .arg("settings")
        .assert()
        .success()
        .stdout(predicate::str::contains("\"match_cap\": 7"))
        .stderr(predicate::str::contains("fathom.json"));
}

#[test]
fn test_settings_env_and_flag_overrides() {
    let dir = TempDir::new().unwrap();
    fathom(dir.path())
        .env("FATHOM_THROTTLE_MS", "25")
        .args(["--delimiter", ":", "settings"])
        .assert()
        .success()
        .stdout(predicate::str::contains("\"throttle_wait_ms\": 25"))
        .stdout(predicate::str::contains("\"platform_delimiter\": \":\""));
}

#[test]
fn test_malformed_config_fails() {
    let dir = TempDir::new().unwrap();
    let config = dir.path().join("broken.json");
    fs::write(&config, "{ nope").unwrap();

    fathom(dir.path())
        .arg("--config")
        .arg(&config)
        .arg("settings")
        .assert()
        .failure()
        .stderr(predicate::str::contains("Failed to parse config file"));
}

#[test]
fn test_missing_root_fails() {
    let dir = TempDir::new().unwrap();
    fathom(dir.path())
        .args(["--root", "does-not-exist", "names", "x"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Search root does not exist"));
}

#[cfg(unix)]
#[test]
fn test_names_plain_scan() {
    let dir = project();
    fathom(dir.path())
        .args(["--json", "names", "help"])
        .assert()
        .success()
        .stdout(predicate::str::contains("src/nested/helper.rs"))
        .stdout(predicate::str::contains("main.rs").not());
}

#[cfg(unix)]
#[test]
fn test_paths_plain_scan_with_top() {
    let dir = project();
    let output = fathom(dir.path())
        .args(["--json", "paths", "rs", "--top", "1"])
        .output()
        .unwrap();

    assert!(output.status.success());
    let paths: Vec<String> = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(paths.len(), 1);
}

#[test]
fn test_tracked_paths_in_git_repo() {
    if which::which("git").is_err() {
        eprintln!("git not installed, skipping");
        return;
    }
    let dir = project();
    for args in [&["init", "--quiet"][..], &["add", "."][..]] {
        let status = std::process::Command::new("git")
            .args(args)
            .current_dir(dir.path())
            .status()
            .unwrap();
        assert!(status.success());
    }

    fathom(dir.path())
        .args(["--delimiter", "/", "paths", "--tracked", "lib.rs"])
        .assert()
        .success()
        .stdout(predicate::str::contains("src/lib.rs"));
}

#[test]
fn test_content_without_ripgrep_is_empty() {
    let dir = project();
    fathom(dir.path())
        .args(["--json", "--rg-path", "definitely-not-a-real-rg-fathom"])
        .args(["content", "TODO"])
        .assert()
        .success()
        .stdout(predicate::str::diff("[]\n"));
}

#[test]
fn test_content_with_ripgrep() {
    if which::which("rg").is_err() {
        eprintln!("rg not installed, skipping");
        return;
    }
    let dir = project();
    fathom(dir.path())
        .args(["content", "todo"])
        .assert()
        .success()
        .stdout(predicate::str::contains("lib.rs:1:// TODO: docs"));
}
