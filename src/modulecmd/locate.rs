//! Module command discovery

use std::path::{Path, PathBuf};

use nix::unistd::{AccessFlags, access};

use super::ShellEnv;
use crate::error::{Result, SetupError};

/// Variable naming the module command executable
pub const MODULES_CMD_VAR: &str = "MODULES_CMD";

/// Resolve the module command path and check it can be run
///
/// `override_path` (from configuration) wins over the `MODULES_CMD`
/// variable. The path must name a regular file readable and executable by
/// the current user.
pub fn locate_modulecmd(env: &ShellEnv, override_path: Option<&Path>) -> Result<PathBuf> {
    let path = match override_path {
        Some(path) => path.to_path_buf(),
        None => match env.get(MODULES_CMD_VAR) {
            Some(value) if !value.is_empty() => PathBuf::from(value),
            _ => return Err(SetupError::CommandVarUnset(MODULES_CMD_VAR.to_string()).into()),
        },
    };

    if !path.is_file() {
        return Err(SetupError::NotFound(path).into());
    }

    if access(path.as_path(), AccessFlags::R_OK | AccessFlags::X_OK).is_err() {
        return Err(SetupError::PermissionDenied(path).into());
    }

    Ok(path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;
    use std::os::unix::fs::PermissionsExt;
    use tempfile::TempDir;

    fn write_file(dir: &TempDir, mode: u32) -> PathBuf {
        let path = dir.path().join("modulecmd");
        std::fs::write(&path, "#!/bin/sh\n").unwrap();
        std::fs::set_permissions(&path, std::fs::Permissions::from_mode(mode)).unwrap();
        path
    }

    #[test]
    fn test_unset_variable() {
        let err = locate_modulecmd(&ShellEnv::default(), None).unwrap_err();
        assert!(matches!(err, Error::Setup(SetupError::CommandVarUnset(_))));
    }

    #[test]
    fn test_missing_file() {
        let env = ShellEnv::from_vars([(MODULES_CMD_VAR, "/nonexistent/modulecmd.tcl")]);
        let err = locate_modulecmd(&env, None).unwrap_err();
        assert!(matches!(err, Error::Setup(SetupError::NotFound(_))));
    }

    #[test]
    fn test_directory_is_not_a_command() {
        let dir = TempDir::new().unwrap();
        let err = locate_modulecmd(&ShellEnv::default(), Some(dir.path())).unwrap_err();
        assert!(matches!(err, Error::Setup(SetupError::NotFound(_))));
    }

    #[test]
    fn test_not_executable() {
        let dir = TempDir::new().unwrap();
        let path = write_file(&dir, 0o644);
        let env = ShellEnv::from_vars([(MODULES_CMD_VAR, path.to_string_lossy().to_string())]);
        let err = locate_modulecmd(&env, None).unwrap_err();
        assert!(matches!(err, Error::Setup(SetupError::PermissionDenied(_))));
    }

    #[test]
    fn test_executable_found() {
        let dir = TempDir::new().unwrap();
        let path = write_file(&dir, 0o755);
        let env = ShellEnv::from_vars([(MODULES_CMD_VAR, path.to_string_lossy().to_string())]);
        assert_eq!(locate_modulecmd(&env, None).unwrap(), path);
    }

    #[test]
    fn test_override_wins_over_variable() {
        let dir = TempDir::new().unwrap();
        let path = write_file(&dir, 0o755);
        let env = ShellEnv::from_vars([(MODULES_CMD_VAR, "/nonexistent")]);
        assert_eq!(locate_modulecmd(&env, Some(&path)).unwrap(), path);
    }
}
