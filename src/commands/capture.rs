use super::{RunnableCommand, announce};
use crate::args::OutputArgs;
use crate::artifact::{ArtifactPaths, generate_artifact};
use crate::errors::CaptureResult;
use crate::parsers::parse_log;
use crate::shell::{DEFAULT_SHELL, Launcher, SystemLauncher, run_session};
use crate::workspace::{CaptureOutcome, Workspace};
use clap::Args;
use crossterm::tty::IsTty;
use tracing::{info, warn};

#[derive(Args, PartialEq, Eq, Debug)]
pub struct CaptureCommand {
    /// Shell to capture
    #[arg(long, env = "SHELL", default_value = DEFAULT_SHELL, value_name = "PATH")]
    shell: String,

    #[command(flatten)]
    output: OutputArgs,
}

/// What a finished capture produced.
#[derive(Debug, PartialEq, Eq)]
pub enum CaptureSummary {
    NotSaved,
    NothingRecorded,
    Saved(ArtifactPaths),
}

impl RunnableCommand for CaptureCommand {
    fn run(&self) -> CaptureResult<()> {
        if !std::io::stdin().is_tty() {
            warn!("stdin is not a terminal, the captured shell may not be interactive");
        }
        let workspace = Workspace::create()?;
        announce(&format!(
            "Capturing commands. Type `shellcap save` to keep them or `shellcap cancel` to discard. (workspace: {})",
            workspace.root().display()
        ));

        match self.capture_in(&workspace, &SystemLauncher)? {
            CaptureSummary::NotSaved => announce("Capture not saved"),
            CaptureSummary::NothingRecorded => announce("Capture saved, but no commands were recorded"),
            CaptureSummary::Saved(paths) => {
                announce("Capture saved");
                println!("  replay script: {}", paths.script_path.display());
                println!("  metadata:      {}", paths.meta_path.display());
            }
        }
        Ok(())
    }
}

impl CaptureCommand {
    pub fn new(shell: impl Into<String>, output: OutputArgs) -> Self {
        Self {
            shell: shell.into(),
            output,
        }
    }

    fn shell_path(&self) -> &str {
        if self.shell.trim().is_empty() {
            DEFAULT_SHELL
        } else {
            &self.shell
        }
    }

    /// Run one capture session in `workspace` and turn a saved session into
    /// a replay artifact.
    pub fn capture_in<L: Launcher>(
        &self,
        workspace: &Workspace,
        launcher: &L,
    ) -> CaptureResult<CaptureSummary> {
        run_session(workspace, self.shell_path(), launcher)?;

        if workspace.outcome() == CaptureOutcome::NotSaved {
            info!("capture ended without `shellcap save`");
            return Ok(CaptureSummary::NotSaved);
        }

        let entries = match parse_log(&workspace.log_path()) {
            Ok(entries) => entries,
            Err(err) => {
                warn!("{}", err);
                return Ok(CaptureSummary::NothingRecorded);
            }
        };
        if entries.is_empty() {
            return Ok(CaptureSummary::NothingRecorded);
        }

        let paths = generate_artifact(&entries, workspace, &self.output.output_dir)?;
        info!(entries = entries.len(), "capture saved");
        Ok(CaptureSummary::Saved(paths))
    }
}
