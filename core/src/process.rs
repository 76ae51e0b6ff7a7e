//! External command execution utilities
//!
//! Every command is spawned with an explicit argument vector. Nothing here goes
//! through a shell, so query text can never change what gets executed.

use crate::error::{Error, Result};
use std::ffi::OsStr;
use std::path::Path;
use std::process::{ExitStatus, Stdio};
use tokio::process::Command;
use tokio::time::{timeout, Duration, Instant};

/// Captured result of a finished command
#[derive(Debug, Clone)]
pub struct CommandOutput {
    pub status: ExitStatus,
    pub stdout: Vec<u8>,
    pub stderr: String,
    pub duration_ms: u64,
}

impl CommandOutput {
    pub fn success(&self) -> bool {
        self.status.success()
    }

    /// Stdout decoded lossily
    pub fn stdout_lossy(&self) -> String {
        String::from_utf8_lossy(&self.stdout).into_owned()
    }
}

/// Build a command that runs `program` with `args` inside `cwd`
pub fn command<I, S>(program: &Path, args: I, cwd: &Path) -> Command
where
    I: IntoIterator<Item = S>,
    S: AsRef<OsStr>,
{
    let mut cmd = Command::new(program);
    cmd.args(args)
        .current_dir(cwd)
        .stdin(Stdio::null())
        .kill_on_drop(true);
    cmd
}

/// Run a command to completion and capture its output
///
/// Returns `Error::Spawn` when the program cannot be started and
/// `Error::Timeout` when it outlives `limit`. A non-zero exit is *not* an
/// error here; callers decide what it means.
pub async fn run_command<I, S>(
    program: &Path,
    args: I,
    cwd: &Path,
    limit: Duration,
) -> Result<CommandOutput>
where
    I: IntoIterator<Item = S>,
    S: AsRef<OsStr>,
{
    let start_time = Instant::now();
    let mut cmd = command(program, args, cwd);
    cmd.stdout(Stdio::piped()).stderr(Stdio::piped());

    let child = cmd.spawn().map_err(|source| Error::Spawn {
        program: program.display().to_string(),
        source,
    })?;

    // kill_on_drop reaps the child if the timeout drops the future
    let output = match timeout(limit, child.wait_with_output()).await {
        Ok(output) => output?,
        Err(_) => {
            return Err(Error::Timeout {
                program: program.display().to_string(),
                seconds: limit.as_secs(),
            })
        }
    };

    Ok(CommandOutput {
        status: output.status,
        stdout: output.stdout,
        stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
        duration_ms: start_time.elapsed().as_millis() as u64,
    })
}

/// Run a command purely as an availability probe
pub async fn command_succeeds<I, S>(program: &Path, args: I, cwd: &Path, limit: Duration) -> bool
where
    I: IntoIterator<Item = S>,
    S: AsRef<OsStr>,
{
    match run_command(program, args, cwd, limit).await {
        Ok(output) => output.success(),
        Err(e) => {
            tracing::debug!("Probe '{}' unavailable: {}", program.display(), e);
            false
        }
    }
}

/// Turn an unsuccessful exit into `Error::CommandFailed`
pub fn ensure_success(program: &Path, output: CommandOutput) -> Result<CommandOutput> {
    if output.success() {
        Ok(output)
    } else {
        Err(Error::CommandFailed {
            program: program.display().to_string(),
            code: output.status.code(),
            stderr: output.stderr,
        })
    }
}
