//! Module command client
//!
//! `Modulecmd` translates user intents into module command runs and parses
//! the textual replies. Listings come back on stderr, environment change code
//! on stdout.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use tokio::sync::OnceCell;
use tracing::{debug, error, info, instrument, warn};

use super::{
    CommandRunner, ProcessRunner, RunOutput, ShellEnv, Statement, locate_modulecmd, parse_python,
};
use crate::config::Config;
use crate::error::{Result, SetupError};
use crate::module::{AvailableModules, strip_lines};

/// Output shell whose code the client knows how to apply
pub const PYTHON_SHELL: &str = "python";

/// Which output channel of a run to return
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Channel {
    Stdout,
    Stderr,
}

/// Client session with the module command
pub struct Modulecmd {
    /// Module command executable
    path: PathBuf,
    /// Environment passed to each run, updated by `eval`
    env: ShellEnv,
    /// Process runner
    runner: Arc<dyn CommandRunner>,
    /// Variable listing loaded modules
    loaded_var: String,
    /// Variable listing enabled modulepaths
    modulepath_var: String,
    /// Cached availability listing
    avail_mods: Option<Arc<AvailableModules>>,
    /// Cached saved collection names
    saved_colls: Option<Vec<String>>,
    /// Module command release, fetched once
    cmd_version: OnceCell<String>,
}

impl Modulecmd {
    /// Create a client over an explicit environment and runner
    pub fn new(path: impl Into<PathBuf>, env: ShellEnv, runner: Arc<dyn CommandRunner>) -> Self {
        let defaults = Config::default();
        Self {
            path: path.into(),
            env,
            runner,
            loaded_var: defaults.loaded_var,
            modulepath_var: defaults.modulepath_var,
            avail_mods: None,
            saved_colls: None,
            cmd_version: OnceCell::new(),
        }
    }

    /// Use different variables for loaded modules and modulepaths
    pub fn with_env_vars(
        mut self,
        loaded_var: impl Into<String>,
        modulepath_var: impl Into<String>,
    ) -> Self {
        self.loaded_var = loaded_var.into();
        self.modulepath_var = modulepath_var.into();
        self
    }

    /// Connect to the module command of the current process environment
    ///
    /// Fails when the command cannot be located or its release is older
    /// than `config.min_version`.
    pub async fn connect(config: &Config) -> Result<Self> {
        let env = ShellEnv::from_process();
        Self::connect_with_env(config, env).await
    }

    /// Connect using an explicit environment
    pub async fn connect_with_env(config: &Config, env: ShellEnv) -> Result<Self> {
        let path = locate_modulecmd(&env, config.modulecmd.as_deref())?;
        let runner = ProcessRunner::new().with_timeout(config.command_timeout());

        let client = Self::new(path, env, Arc::new(runner))
            .with_env_vars(&config.loaded_var, &config.modulepath_var);

        if client.used().is_empty() {
            warn!("Module search path empty");
        }

        client.check_version(&config.min_version).await?;
        info!(
            "Using module command {} (release {})",
            client.path.display(),
            client.version().await
        );

        Ok(client)
    }

    /// Module command executable
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Current environment view
    pub fn env(&self) -> &ShellEnv {
        &self.env
    }

    /// Run the module command, returning `None` when it could not be run
    async fn execute(&self, args: &[&str], out_shell: &str) -> Option<RunOutput> {
        let mut argv = Vec::with_capacity(args.len() + 1);
        argv.push(out_shell.to_string());
        argv.extend(args.iter().map(|a| a.to_string()));

        match self.runner.run(&self.path, &argv, &self.env).await {
            Ok(output) => Some(output),
            Err(e) => {
                error!("{}", e);
                None
            }
        }
    }

    /// Run a command for the python output shell and return its stderr
    pub async fn run(&self, args: &[&str]) -> String {
        self.run_with(args, PYTHON_SHELL, Channel::Stderr, false)
            .await
    }

    /// Run a command producing code for `out_shell`
    ///
    /// Returns the content of `channel`, or an empty string when the command
    /// could not be run. When stdout is returned, stderr content is forwarded
    /// to the error stream unless `silent_err` is set. With `silent_err`,
    /// stderr content is dropped altogether.
    #[instrument(skip(self))]
    pub async fn run_with(
        &self,
        args: &[&str],
        out_shell: &str,
        channel: Channel,
        silent_err: bool,
    ) -> String {
        let Some(output) = self.execute(args, out_shell).await else {
            return String::new();
        };

        let err_content = if silent_err { String::new() } else { output.stderr };

        match channel {
            Channel::Stdout => {
                if !err_content.is_empty() {
                    eprint!("{}", err_content);
                }
                output.stdout
            }
            Channel::Stderr => err_content,
        }
    }

    /// Run a command and apply the environment changes it produces
    ///
    /// Returns the status reported by the module command; `false` when the
    /// command could not be run at all.
    #[instrument(skip(self))]
    pub async fn eval(&mut self, args: &[&str]) -> bool {
        let Some(output) = self.execute(args, PYTHON_SHELL).await else {
            return false;
        };
        if !output.stderr.is_empty() {
            eprint!("{}", output.stderr);
        }

        let statements = parse_python(&output.stdout);
        let reported = statements.iter().any(|s| matches!(s, Statement::Status(_)));
        if !output.success && !reported {
            debug!("module command exited unsuccessfully without reporting a status");
        }
        let status = self.env.apply(&statements);
        debug!(status, changes = statements.len(), "evaluated module command");
        status
    }

    /// Modules available in enabled modulepaths
    ///
    /// The listing is fetched once and shared; `refresh` fetches it again.
    pub async fn avail(&mut self, refresh: bool) -> Arc<AvailableModules> {
        if let Some(mods) = &self.avail_mods {
            if !refresh {
                return Arc::clone(mods);
            }
        }

        let listing = self.run(&["avail", "--terse", "--output=sym"]).await;
        let mods = Arc::new(AvailableModules::from_terse(&listing));
        debug!(count = mods.len(), "fetched available modules");
        self.avail_mods = Some(Arc::clone(&mods));
        mods
    }

    /// Loaded modules, read from the environment
    pub fn loaded(&self) -> Vec<String> {
        self.env.path_list(&self.loaded_var)
    }

    /// Enabled modulepaths, read from the environment
    pub fn used(&self) -> Vec<String> {
        self.env.path_list(&self.modulepath_var)
    }

    /// Saved collection names
    pub async fn saved(&mut self, refresh: bool) -> Vec<String> {
        if let Some(colls) = &self.saved_colls {
            if !refresh {
                return colls.clone();
            }
        }

        let listing = self.run(&["savelist", "--terse"]).await;
        // first line is the listing header
        let colls: Vec<String> = listing
            .trim()
            .lines()
            .skip(1)
            .map(String::from)
            .collect();
        self.saved_colls = Some(colls.clone());
        colls
    }

    /// Display message of a saved collection
    pub async fn saveshow(&self, collection: &str) -> String {
        let out = self.run(&["saveshow", collection]).await;
        strip_lines(&out, 2, 3)
    }

    /// Release of the module command
    pub async fn version(&self) -> &str {
        self.cmd_version
            .get_or_init(|| async move {
                let raw = self.run(&["--version"]).await;
                raw.split_whitespace().nth(2).unwrap_or_default().to_string()
            })
            .await
    }

    /// Check the module command is at least at release `min_version`
    pub async fn check_version(&self, min_version: &str) -> Result<()> {
        let found = self.version().await;
        let found_tuple =
            version_tuple(found).ok_or_else(|| SetupError::InvalidVersion(found.to_string()))?;
        let required_tuple = version_tuple(min_version)
            .ok_or_else(|| SetupError::InvalidVersion(min_version.to_string()))?;

        if compare_versions(&found_tuple, &required_tuple).is_lt() {
            return Err(SetupError::UnsupportedVersion {
                required: min_version.to_string(),
                found: found.to_string(),
            }
            .into());
        }
        Ok(())
    }

    /// Summary of the module command state for debug output
    pub async fn describe(&self) -> String {
        [
            format!("Module command version {}", self.version().await),
            format!("Used modulepaths: {}", self.used().join(", ")),
            format!("Loaded modules: {}", self.loaded().join(", ")),
        ]
        .join("\n  ")
    }
}

/// Numeric components of a release string, such as `5.4.0`
///
/// Each component keeps its leading digits, so `5.4.0-rc1` reads as `5.4.0`.
fn version_tuple(version: &str) -> Option<Vec<u32>> {
    version
        .split('.')
        .map(|part| {
            let digits: String = part.chars().take_while(char::is_ascii_digit).collect();
            digits.parse().ok()
        })
        .collect()
}

/// Compare releases, padding the shorter one with zeros
fn compare_versions(a: &[u32], b: &[u32]) -> std::cmp::Ordering {
    let len = a.len().max(b.len());
    let pad = |v: &[u32]| {
        let mut v = v.to_vec();
        v.resize(len, 0);
        v
    };
    pad(a).cmp(&pad(b))
}
