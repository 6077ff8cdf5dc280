//! Scripted runner for unit tests

use std::collections::HashMap;
use std::path::Path;
use std::sync::Mutex;

use async_trait::async_trait;

use super::{CommandRunner, RunOutput, ShellEnv};
use crate::error::{CommandError, Result};

/// Replies to known argument lines, fails to spawn on anything else
///
/// Argument lines are keyed as the space-joined arguments, output shell
/// first (`python avail --terse --output=sym`).
#[derive(Default)]
pub(crate) struct ScriptedRunner {
    responses: HashMap<String, RunOutput>,
    calls: Mutex<Vec<Vec<String>>>,
}

impl ScriptedRunner {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn on_output(mut self, args: &str, output: RunOutput) -> Self {
        self.responses.insert(args.to_string(), output);
        self
    }

    pub(crate) fn on_stderr(self, args: &str, stderr: &str) -> Self {
        self.on_output(
            args,
            RunOutput {
                stderr: stderr.to_string(),
                success: true,
                ..RunOutput::default()
            },
        )
    }

    pub(crate) fn on_stdout(self, args: &str, stdout: &str) -> Self {
        self.on_output(
            args,
            RunOutput {
                stdout: stdout.to_string(),
                success: true,
                ..RunOutput::default()
            },
        )
    }

    pub(crate) fn calls(&self) -> Vec<Vec<String>> {
        self.calls.lock().unwrap().clone()
    }

    pub(crate) fn count(&self, args: &str) -> usize {
        self.calls()
            .iter()
            .filter(|call| call.join(" ") == args)
            .count()
    }
}

#[async_trait]
impl CommandRunner for ScriptedRunner {
    async fn run(&self, program: &Path, args: &[String], _env: &ShellEnv) -> Result<RunOutput> {
        self.calls.lock().unwrap().push(args.to_vec());
        let key = args.join(" ");
        self.responses.get(&key).cloned().ok_or_else(|| {
            CommandError::SpawnFailed {
                command: format!("{} {}", program.display(), key),
                reason: "no scripted response".to_string(),
            }
            .into()
        })
    }
}
