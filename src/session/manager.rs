//! Session manager - applies actions and keeps the view current
//!
//! Every interaction follows the same path: mutate through the client, then
//! rebuild the view from the client's latest state.

use tracing::{info, instrument};

use super::{Action, ActionOutcome, EnvironmentView, LoadedChanges};
use crate::modulecmd::{Channel, Modulecmd};
use crate::shell::Shell;

/// Module environment session
pub struct Session {
    /// Module command client
    modulecmd: Modulecmd,
    /// Shell to produce environment change code for
    shell_out: Option<Shell>,
    /// Latest snapshot
    view: EnvironmentView,
}

impl Session {
    /// Create a session; the view is empty until the first refresh
    pub fn new(modulecmd: Modulecmd, shell_out: Option<Shell>) -> Self {
        Self {
            modulecmd,
            shell_out,
            view: EnvironmentView::default(),
        }
    }

    /// Module command client
    pub fn modulecmd(&self) -> &Modulecmd {
        &self.modulecmd
    }

    /// Latest snapshot
    pub fn view(&self) -> &EnvironmentView {
        &self.view
    }

    /// Fetch the current module state
    pub async fn refresh(&mut self) -> &EnvironmentView {
        self.view = EnvironmentView::fetch(&mut self.modulecmd).await;
        &self.view
    }

    /// Apply an action and report its effect
    ///
    /// When a target shell is set, the code the module command produces for
    /// it is captured before the client applies the same change to its own
    /// environment view.
    #[instrument(skip_all, fields(action = %action))]
    pub async fn apply(&mut self, action: &Action) -> ActionOutcome {
        info!("{}", action);
        let args = action.command();

        if !action.changes_environment() {
            let status = self.modulecmd.eval(&args).await;
            return ActionOutcome {
                status,
                ..ActionOutcome::default()
            };
        }

        let loaded_before = self.modulecmd.loaded();
        let shell_code = self.shell_code(&args).await;
        let status = self.modulecmd.eval(&args).await;
        let loaded_after = self.modulecmd.loaded();

        self.refresh().await;

        let changes = LoadedChanges::between(&loaded_before, &loaded_after);
        for message in changes.messages() {
            info!("  * {}", message);
        }

        ActionOutcome {
            status,
            shell_code,
            changes,
        }
    }

    /// Code produced for the target shell, if any
    async fn shell_code(&self, args: &[&str]) -> Option<String> {
        let shell = self.shell_out?;
        let code = self
            .modulecmd
            .run_with(args, shell.as_str(), Channel::Stdout, true)
            .await;
        (!code.is_empty()).then_some(code)
    }
}
