//! Integration tests for mogui
//!
//! These tests drive a fake `modulecmd` shell script written to a temporary
//! directory. The script understands the handful of commands the client
//! issues and renders environment changes for the python and sh shells.

use std::os::unix::fs::PermissionsExt;
use std::path::{Path, PathBuf};
use std::process::Command;

use pretty_assertions::assert_eq;
use tempfile::TempDir;

use mogui::error::{Error, SetupError};
use mogui::{Action, Config, Modulecmd, Session, Shell, ShellEnv};

const FAKE_MODULECMD: &str = r#"#!/bin/sh
shell="$1"; shift
cmd="$1"; shift

emit() {
    if [ "$shell" = python ]; then
        printf "os.environ['%s'] = '%s'\n" "$1" "$2"
    else
        printf "%s=%s; export %s;\n" "$1" "$2" "$1"
    fi
}

drop_var() {
    if [ "$shell" = python ]; then
        printf "os.environ['%s'] = ''\ndel os.environ['%s']\n" "$1" "$1"
    else
        printf "unset %s;\n" "$1"
    fi
}

status() {
    if [ "$shell" = python ]; then
        printf "_mlstatus = %s\n" "$1"
    fi
}

set_loaded() {
    if [ -n "$1" ]; then emit LOADEDMODULES "$1"; else drop_var LOADEDMODULES; fi
}

case "$cmd" in
--version)
    echo "Modules Release @VERSION@ (2024-02-20)" >&2
    ;;
avail)
    printf '%s:\n' "$MODULEPATH" >&2
    printf 'bar/3.1(stable)\nfoo/1.0(default)\nfoo/2.0\n' >&2
    ;;
savelist)
    printf 'Named collection list:\ndefault\n' >&2
    ;;
whatis)
    printf '%s: Tool %s\n' "$1" "$1" >&2
    ;;
load)
    set_loaded "${LOADEDMODULES:+$LOADEDMODULES:}$1"
    status True
    ;;
unload)
    new=""
    old_ifs=$IFS
    IFS=:
    for m in $LOADEDMODULES; do
        [ "$m" = "$1" ] || new="${new:+$new:}$m"
    done
    IFS=$old_ifs
    set_loaded "$new"
    status True
    ;;
purge)
    set_loaded ""
    status True
    ;;
*)
    echo "ERROR: Invalid command '$cmd'" >&2
    status False
    ;;
esac
"#;

/// Write the fake module command reporting `version` and return its path
fn write_modulecmd(dir: &TempDir, version: &str) -> PathBuf {
    let path = dir.path().join("modulecmd");
    std::fs::write(&path, FAKE_MODULECMD.replace("@VERSION@", version)).unwrap();
    std::fs::set_permissions(&path, std::fs::Permissions::from_mode(0o755)).unwrap();
    path
}

fn config_for(path: PathBuf) -> Config {
    Config {
        modulecmd: Some(path),
        command_timeout_secs: 10,
        ..Config::default()
    }
}

/// `mogui-cmd` isolated from the caller's environment and config file
fn mogui_cmd(dir: &TempDir, modulecmd: Option<&Path>) -> Command {
    let mut cmd = Command::new(env!("CARGO_BIN_EXE_mogui-cmd"));
    cmd.env_clear()
        .env("HOME", dir.path())
        .env("MODULEPATH", "/opt/modulefiles")
        .env("LOADEDMODULES", "")
        .arg("--config")
        .arg(dir.path().join("config.toml"));
    if let Some(path) = modulecmd {
        cmd.env("MODULES_CMD", path);
    }
    cmd
}

fn base_env() -> ShellEnv {
    ShellEnv::from_vars([("MODULEPATH", "/opt/modulefiles"), ("LOADEDMODULES", "")])
}

#[tokio::test]
async fn test_load_unload_purge_roundtrip() {
    let dir = TempDir::new().unwrap();
    let config = config_for(write_modulecmd(&dir, "5.4.0"));

    let modulecmd = Modulecmd::connect_with_env(&config, base_env())
        .await
        .expect("fake modulecmd should be accepted");
    assert_eq!(modulecmd.version().await, "5.4.0");

    let mut session = Session::new(modulecmd, Some(Shell::Bash));

    let view = session.refresh().await;
    assert_eq!(view.available.names(), vec!["bar/3.1", "foo/1.0", "foo/2.0"]);
    assert_eq!(view.used, vec!["/opt/modulefiles"]);
    assert_eq!(view.saved, vec!["default"]);
    assert!(view.loaded.is_empty());

    let outcome = session.apply(&Action::Load("foo/1.0".into())).await;
    assert!(outcome.status);
    assert_eq!(
        outcome.shell_code.as_deref(),
        Some("LOADEDMODULES=foo/1.0; export LOADEDMODULES;\n")
    );
    assert_eq!(outcome.changes.loaded, vec!["foo/1.0"]);

    let outcome = session.apply(&Action::Load("bar/3.1".into())).await;
    assert_eq!(
        outcome.shell_code.as_deref(),
        Some("LOADEDMODULES=foo/1.0:bar/3.1; export LOADEDMODULES;\n")
    );
    assert_eq!(session.modulecmd().loaded(), vec!["foo/1.0", "bar/3.1"]);
    assert!(session.view().is_loaded("bar/3.1"));

    let outcome = session.apply(&Action::Unload("foo/1.0".into())).await;
    assert_eq!(outcome.changes.unloaded, vec!["foo/1.0"]);
    assert!(outcome.changes.loaded.is_empty());
    assert_eq!(session.modulecmd().loaded(), vec!["bar/3.1"]);

    let outcome = session.apply(&Action::Purge).await;
    assert!(outcome.status);
    assert_eq!(outcome.shell_code.as_deref(), Some("unset LOADEDMODULES;\n"));
    assert_eq!(outcome.changes.unloaded, vec!["bar/3.1"]);
    assert!(session.modulecmd().loaded().is_empty());
    assert_eq!(session.modulecmd().env().get("LOADEDMODULES"), None);
}

#[tokio::test]
async fn test_failed_action_and_module_texts() {
    let dir = TempDir::new().unwrap();
    let config = config_for(write_modulecmd(&dir, "5.2.0"));

    let mut modulecmd = Modulecmd::connect_with_env(&config, base_env())
        .await
        .unwrap();

    let available = modulecmd.avail(false).await;
    let foo = available.get("foo/1.0").unwrap();
    assert!(foo.is_default());
    assert_eq!(foo.desc(&modulecmd).await, "Tool foo/1.0");

    let mut session = Session::new(modulecmd, None);
    let outcome = session.apply(&Action::Restore("missing".into())).await;
    assert!(!outcome.status);
    assert!(outcome.changes.is_empty());
}

#[tokio::test]
async fn test_setup_errors() {
    let dir = TempDir::new().unwrap();

    let missing = config_for(dir.path().join("nope"));
    let err = Modulecmd::connect_with_env(&missing, base_env())
        .await
        .err()
        .unwrap();
    assert!(matches!(err, Error::Setup(SetupError::NotFound(_))));

    let old = config_for(write_modulecmd(&dir, "4.8.0"));
    let err = Modulecmd::connect_with_env(&old, base_env())
        .await
        .err()
        .unwrap();
    assert!(matches!(
        err,
        Error::Setup(SetupError::UnsupportedVersion { .. })
    ));
}

#[test]
fn test_cli_shell_code_on_stdout_only() {
    let dir = TempDir::new().unwrap();
    let modulecmd = write_modulecmd(&dir, "5.4.0");

    let output = mogui_cmd(&dir, Some(&modulecmd))
        .args(["--shell", "bash", "load", "foo/1.0", "bar/3.1"])
        .output()
        .unwrap();
    let stdout = String::from_utf8_lossy(&output.stdout);
    let stderr = String::from_utf8_lossy(&output.stderr);

    assert!(output.status.success(), "stderr: {stderr}");
    assert_eq!(
        stdout,
        "LOADEDMODULES=foo/1.0; export LOADEDMODULES;\n\
         LOADEDMODULES=foo/1.0:bar/3.1; export LOADEDMODULES;\n"
    );
    assert!(stderr.contains("Module 'foo/1.0' selected"));
    assert!(stderr.contains("  * 'foo/1.0' loaded"));
    assert!(stderr.contains("Module 'bar/3.1' selected"));
    assert!(stderr.contains("  * 'bar/3.1' loaded"));
    assert!(!stderr.contains("INFO"));
}

#[test]
fn test_cli_reports_without_shell_on_stdout() {
    let dir = TempDir::new().unwrap();
    let modulecmd = write_modulecmd(&dir, "5.4.0");

    let output = mogui_cmd(&dir, Some(&modulecmd))
        .args(["load", "foo/1.0"])
        .output()
        .unwrap();

    assert!(output.status.success());
    assert_eq!(
        String::from_utf8_lossy(&output.stdout),
        "Module 'foo/1.0' selected\n  * 'foo/1.0' loaded\n"
    );
}

#[test]
fn test_cli_failed_action_exit_code() {
    let dir = TempDir::new().unwrap();
    let modulecmd = write_modulecmd(&dir, "5.4.0");

    let output = mogui_cmd(&dir, Some(&modulecmd))
        .args(["restore", "nope"])
        .output()
        .unwrap();

    assert_eq!(output.status.code(), Some(1));
}

#[test]
fn test_cli_setup_error_exit_code() {
    let dir = TempDir::new().unwrap();

    let output = mogui_cmd(&dir, None).arg("list").output().unwrap();

    assert_eq!(output.status.code(), Some(1));
    assert!(String::from_utf8_lossy(&output.stderr).contains("MODULES_CMD"));
}
