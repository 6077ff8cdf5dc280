//! MoGui - Front-end for Environment Modules
//!
//! Run with `mogui-cmd --help` for usage. `mogui-cmd init <shell>` prints the
//! shell function that lets actions update the calling shell session.

use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;

use clap::{Parser, Subcommand};
use color_eyre::eyre::Result;
use serde::Serialize;
use tracing::{debug, info};
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

use mogui::{
    APP_NAME, Action, Config, Module, Modulecmd, Session, Shell, VERSION,
};

#[derive(Parser)]
#[command(name = APP_NAME)]
#[command(version = VERSION)]
#[command(about = "Browse, load and save environment modules")]
#[command(long_about = None)]
#[command(disable_help_subcommand = true)]
struct Cli {
    /// Enable debug logging
    #[arg(short, long, global = true)]
    debug: bool,

    /// Path to config file
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Produce environment change code for this shell on stdout
    #[arg(short, long, value_enum, global = true)]
    shell: Option<Shell>,

    /// Print listings as JSON
    #[arg(long, global = true)]
    json: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List available modules
    Avail,

    /// List loaded modules
    List,

    /// List enabled modulepaths
    Paths,

    /// List saved collections
    Savelist,

    /// Load modules
    Load {
        /// Module designations
        #[arg(required = true)]
        modules: Vec<String>,
    },

    /// Unload modules
    Unload {
        /// Module designations
        #[arg(required = true)]
        modules: Vec<String>,
    },

    /// Enable a modulepath
    Use {
        /// Modulepath directory
        path: String,
    },

    /// Disable a modulepath
    Unuse {
        /// Modulepath directory
        path: String,
    },

    /// Unload all loaded modules
    Purge,

    /// Restore the initial environment
    Reset,

    /// Load the environment recorded in a collection
    Restore {
        /// Collection name (default: configured default collection)
        collection: Option<String>,
    },

    /// Record the loaded environment in a collection
    Save {
        /// Collection name (default: configured default collection)
        collection: Option<String>,
    },

    /// Show the description of a module
    Whatis {
        /// Module designation
        module: String,
    },

    /// Show the help message of a module
    Help {
        /// Module designation
        module: String,
    },

    /// Show the environment changes a module makes
    Display {
        /// Module designation
        module: String,
    },

    /// Show the content of a collection
    Saveshow {
        /// Collection name (default: configured default collection)
        collection: Option<String>,
    },

    /// Show module command version, modulepaths and loaded modules
    Status,

    /// Print code defining the `mogui` shell function
    Init {
        /// Shell to initialize
        #[arg(value_enum, value_name = "SHELL")]
        target: Shell,
    },

    /// Show configuration
    Config {
        /// Initialize config file with defaults
        #[arg(long)]
        init: bool,
    },
}

/// Human-readable output
///
/// Goes to stderr when stdout carries shell code for the calling shell.
struct Printer {
    to_stderr: bool,
    json: bool,
}

impl Printer {
    fn line(&self, text: impl AsRef<str>) {
        if self.to_stderr {
            eprintln!("{}", text.as_ref());
        } else {
            println!("{}", text.as_ref());
        }
    }

    fn list<T: Serialize>(&self, items: &[T], render: impl Fn(&T) -> String) -> Result<()> {
        if self.json {
            self.line(serde_json::to_string_pretty(items)?);
        } else {
            for item in items {
                self.line(render(item));
            }
        }
        Ok(())
    }
}

/// Default filter directive; stderr also carries the action report
fn default_directive(debug: bool) -> &'static str {
    if debug { "debug" } else { "warn" }
}

fn setup_logging(debug: bool, log_file: Option<&PathBuf>) -> Result<()> {
    let filter = if debug {
        EnvFilter::new(default_directive(true))
    } else {
        EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| EnvFilter::new(default_directive(false)))
    };

    if let Some(path) = log_file {
        let file = std::fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(path)?;

        tracing_subscriber::registry()
            .with(fmt::layer().with_writer(file).with_target(false))
            .with(filter)
            .init();
    } else {
        // stdout is reserved for shell code
        tracing_subscriber::registry()
            .with(
                fmt::layer()
                    .with_writer(std::io::stderr)
                    .with_target(false)
                    .without_time(),
            )
            .with(filter)
            .init();
    }

    Ok(())
}

/// Fetch a module from the availability listing, or describe it by name alone
async fn lookup_module(modulecmd: &mut Modulecmd, name: &str) -> Arc<Module> {
    let available = modulecmd.avail(false).await;
    available
        .get(name)
        .cloned()
        .unwrap_or_else(|| Arc::new(Module::new(name, Vec::new())))
}

/// Apply actions in order, printing shell code and change reports
async fn run_actions(session: &mut Session, actions: Vec<Action>, out: &Printer) -> bool {
    let mut all_ok = true;
    for action in actions {
        let outcome = session.apply(&action).await;
        if let Some(code) = &outcome.shell_code {
            print!("{}", code);
        }
        out.line(action.to_string());
        for message in outcome.changes.messages() {
            out.line(format!("  * {}", message));
        }
        all_ok &= outcome.status;
    }
    all_ok
}

#[tokio::main]
async fn main() -> Result<ExitCode> {
    // Install color-eyre error hooks
    color_eyre::install()?;

    let cli = Cli::parse();

    // Load configuration
    let loaded = match &cli.config {
        Some(path) => Config::load_from(path),
        None => Config::load(),
    };
    let config = loaded.unwrap_or_else(|e| {
        eprintln!("Warning: Failed to load config, using defaults: {}", e);
        Config::default()
    });

    setup_logging(cli.debug || config.debug, config.log_file.as_ref())?;

    let out = Printer {
        to_stderr: cli.shell.is_some(),
        json: cli.json,
    };

    let command = match cli.command {
        Commands::Init { target } => {
            println!("{}", target.init_code());
            return Ok(ExitCode::SUCCESS);
        }
        Commands::Config { init } => {
            if init {
                config.save()?;
                out.line(format!(
                    "Configuration initialized at {:?}",
                    Config::config_file_path()?
                ));
            } else {
                out.line("Configuration:");
                out.line(toml::to_string_pretty(&config)?);
                out.line(format!("Config file: {:?}", Config::config_file_path()?));
            }
            return Ok(ExitCode::SUCCESS);
        }
        command => command,
    };

    let mut modulecmd = match Modulecmd::connect(&config).await {
        Ok(modulecmd) => modulecmd,
        Err(e) => {
            eprintln!("ERROR: {}", e);
            return Ok(ExitCode::FAILURE);
        }
    };
    debug!("{}", modulecmd.describe().await);
    info!("Starting {} v{}", APP_NAME, VERSION);

    let default_collection = || config.default_collection.clone();

    let actions: Vec<Action> = match command {
        Commands::Load { modules } => modules.into_iter().map(Action::Load).collect(),
        Commands::Unload { modules } => modules.into_iter().map(Action::Unload).collect(),
        Commands::Use { path } => vec![Action::Use(path)],
        Commands::Unuse { path } => vec![Action::Unuse(path)],
        Commands::Purge => vec![Action::Purge],
        Commands::Reset => vec![Action::Reset],
        Commands::Restore { collection } => {
            vec![Action::Restore(collection.unwrap_or_else(default_collection))]
        }
        Commands::Save { collection } => {
            vec![Action::Save(collection.unwrap_or_else(default_collection))]
        }

        Commands::Whatis { module } => {
            let module = lookup_module(&mut modulecmd, &module).await;
            out.line(format!("{}: {}", module.name, module.desc(&modulecmd).await));
            return Ok(ExitCode::SUCCESS);
        }
        Commands::Help { module } => {
            let module = lookup_module(&mut modulecmd, &module).await;
            out.line(format!("Module Help for {}", module.name));
            out.line(module.help(&modulecmd).await);
            return Ok(ExitCode::SUCCESS);
        }
        Commands::Display { module } => {
            let module = lookup_module(&mut modulecmd, &module).await;
            out.line(format!("Module Display for {}", module.name));
            out.line(module.display(&modulecmd).await);
            return Ok(ExitCode::SUCCESS);
        }
        Commands::Saveshow { collection } => {
            let collection = collection.unwrap_or_else(default_collection);
            out.line(format!("Collection Display for {}", collection));
            out.line(modulecmd.saveshow(&collection).await);
            return Ok(ExitCode::SUCCESS);
        }
        Commands::Status => {
            out.line(modulecmd.describe().await);
            return Ok(ExitCode::SUCCESS);
        }

        listing @ (Commands::Avail | Commands::List | Commands::Paths | Commands::Savelist) => {
            let mut session = Session::new(modulecmd, cli.shell);
            let view = session.refresh().await;
            match listing {
                Commands::Avail => out.list(&view.available_rows(), |row| {
                    let marker = if row.loaded { "*" } else { " " };
                    if row.symbols.is_empty() {
                        format!("{} {}", marker, row.name)
                    } else {
                        format!("{} {}({})", marker, row.name, row.symbols.join(":"))
                    }
                })?,
                Commands::List => out.list(&view.loaded, |entry| {
                    if entry.available {
                        entry.name.clone()
                    } else {
                        format!("{} (not available)", entry.name)
                    }
                })?,
                Commands::Paths => out.list(&view.used, String::clone)?,
                _ => out.list(&view.saved, String::clone)?,
            }
            return Ok(ExitCode::SUCCESS);
        }
        Commands::Init { .. } | Commands::Config { .. } => return Ok(ExitCode::SUCCESS),
    };

    let mut session = Session::new(modulecmd, cli.shell);
    if run_actions(&mut session, actions, &out).await {
        Ok(ExitCode::SUCCESS)
    } else {
        Ok(ExitCode::FAILURE)
    }
}
