//! Module command process runner
//!
//! `CommandRunner` is the seam between the client and the operating system:
//! `ProcessRunner` spawns the real module command, tests plug in scripted
//! runners instead.

use std::path::Path;
use std::process::Stdio;
use std::time::Duration;

use async_trait::async_trait;
use tokio::process::Command;
use tokio::time::timeout;
use tracing::{debug, instrument};

use super::ShellEnv;
use crate::error::{CommandError, Result};

/// Default command timeout
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(60);

/// Captured result of one module command run
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RunOutput {
    /// Decoded standard output
    pub stdout: String,
    /// Decoded standard error
    pub stderr: String,
    /// Whether the process exited successfully
    pub success: bool,
}

/// Runs the module command with a given environment
#[async_trait]
pub trait CommandRunner: Send + Sync {
    /// Run `program` with `args`, waiting for it to exit
    async fn run(&self, program: &Path, args: &[String], env: &ShellEnv) -> Result<RunOutput>;
}

/// Runner spawning real processes
#[derive(Debug, Clone)]
pub struct ProcessRunner {
    /// Command timeout, `None` waits forever
    timeout: Option<Duration>,
}

impl ProcessRunner {
    /// Create a runner with the default timeout
    pub fn new() -> Self {
        Self {
            timeout: Some(DEFAULT_TIMEOUT),
        }
    }

    /// Set the command timeout
    pub fn with_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.timeout = timeout;
        self
    }
}

impl Default for ProcessRunner {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl CommandRunner for ProcessRunner {
    #[instrument(skip(self, env), fields(program = %program.display()))]
    async fn run(&self, program: &Path, args: &[String], env: &ShellEnv) -> Result<RunOutput> {
        let mut cmd = Command::new(program);
        cmd.args(args)
            .env_clear()
            .envs(env.vars())
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);
        if let Some(dir) = env.cwd() {
            cmd.current_dir(dir);
        }

        let command_line = || format!("{} {}", program.display(), args.join(" "));

        let output = match self.timeout {
            Some(limit) => timeout(limit, cmd.output())
                .await
                .map_err(|_| CommandError::Timeout(limit))?,
            None => cmd.output().await,
        }
        .map_err(|e| CommandError::SpawnFailed {
            command: command_line(),
            reason: e.to_string(),
        })?;

        debug!(status = ?output.status, "module command exited");

        Ok(RunOutput {
            stdout: String::from_utf8_lossy(&output.stdout).to_string(),
            stderr: String::from_utf8_lossy(&output.stderr).to_string(),
            success: output.status.success(),
        })
    }
}
