//! Target shells
//!
//! The module command can render environment changes for each of these
//! shells. `init_code` defines the `mogui` shell function that evaluates
//! what `mogui-cmd --shell <shell>` prints.

use std::fmt;

use clap::ValueEnum;
use serde::{Deserialize, Serialize};

/// Name of the binary the shell function wraps
pub const CMD_NAME: &str = "mogui-cmd";

/// Shell to produce environment change code for
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Shell {
    Sh,
    Bash,
    Ksh,
    Zsh,
    Csh,
    Tcsh,
    Fish,
}

impl Shell {
    /// Output shell name understood by the module command
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Sh => "sh",
            Self::Bash => "bash",
            Self::Ksh => "ksh",
            Self::Zsh => "zsh",
            Self::Csh => "csh",
            Self::Tcsh => "tcsh",
            Self::Fish => "fish",
        }
    }

    /// Code defining `mogui` in a shell session
    pub fn init_code(&self) -> String {
        let shell = self.as_str();
        match self {
            Self::Sh | Self::Bash | Self::Ksh | Self::Zsh => {
                format!(r#"mogui() {{ eval "$({CMD_NAME} --shell {shell} "$@")"; }}"#)
            }
            Self::Csh | Self::Tcsh => {
                format!(r#"alias mogui 'eval "`{CMD_NAME} --shell {shell} \!*:q`"' ;"#)
            }
            Self::Fish => [
                "function mogui".to_string(),
                format!("   eval {CMD_NAME} --shell {shell} (string escape -- $argv) | source -"),
                "end".to_string(),
            ]
            .join("\n"),
        }
    }
}

impl fmt::Display for Shell {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_sh_family_init() {
        insta::assert_snapshot!(
            Shell::Bash.init_code(),
            @r#"mogui() { eval "$(mogui-cmd --shell bash "$@")"; }"#
        );
        assert!(Shell::Zsh.init_code().contains("--shell zsh"));
    }

    #[test]
    fn test_csh_init() {
        insta::assert_snapshot!(
            Shell::Tcsh.init_code(),
            @r#"alias mogui 'eval "`mogui-cmd --shell tcsh \!*:q`"' ;"#
        );
    }

    #[test]
    fn test_fish_init() {
        assert_eq!(
            Shell::Fish.init_code(),
            "function mogui\n   eval mogui-cmd --shell fish (string escape -- $argv) | source -\nend"
        );
    }

    #[test]
    fn test_value_names() {
        for shell in Shell::value_variants() {
            let parsed = Shell::from_str(shell.as_str(), false).unwrap();
            assert_eq!(&parsed, shell);
        }
    }
}
