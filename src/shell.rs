//! # Shell
//!
//! Launches the user's interactive shell with the generated startup file
//! and blocks until it exits. The child shares the controlling terminal,
//! nothing it prints goes through `shellcap`.

use crate::errors::{CaptureError, CaptureResult};
use crate::instrument::{InstrumentationStrategy, ShellKind, generate_instrumentation};
use crate::workspace::Workspace;
use std::fmt;
use std::io;
use std::os::unix::process::ExitStatusExt;
use std::path::Path;
use std::process::{Command, ExitStatus, Stdio};
use tracing::{debug, info, warn};

pub const DEFAULT_SHELL: &str = "/bin/sh";

/// Spawns a fully configured command and waits for it.
#[cfg_attr(test, mockall::automock)]
pub trait Launcher {
    fn launch(&self, command: &mut Command) -> io::Result<ExitStatus>;
}

pub struct SystemLauncher;

impl Launcher for SystemLauncher {
    fn launch(&self, command: &mut Command) -> io::Result<ExitStatus> {
        command
            .stdin(Stdio::inherit())
            .stdout(Stdio::inherit())
            .stderr(Stdio::inherit())
            .status()
    }
}

/// How the captured shell ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExitReport {
    pub code: Option<i32>,
    pub signal: Option<i32>,
}

impl From<ExitStatus> for ExitReport {
    fn from(status: ExitStatus) -> Self {
        Self {
            code: status.code(),
            signal: status.signal(),
        }
    }
}

impl ExitReport {
    pub fn is_clean(&self) -> bool {
        self.code == Some(0)
    }
}

impl fmt::Display for ExitReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match (self.code, self.signal) {
            (Some(code), _) => write!(f, "exit code {}", code),
            (None, Some(signal)) => write!(f, "signal {}", signal),
            (None, None) => write!(f, "unknown status"),
        }
    }
}

/// Case-insensitive match on the executable's base name.
pub fn detect_shell(shell_path: &str) -> Option<ShellKind> {
    let name = Path::new(shell_path)
        .file_name()
        .map(|name| name.to_string_lossy().to_lowercase())
        .unwrap_or_default();

    if name.contains("zsh") {
        Some(ShellKind::ZshHooked)
    } else if name.contains("bash") {
        Some(ShellKind::PosixTraced)
    } else {
        None
    }
}

/// Like [`detect_shell`], falling back to the `--rcfile` + `DEBUG` trap
/// strategy for shells we do not know.
pub fn shell_kind(shell_path: &str) -> ShellKind {
    detect_shell(shell_path).unwrap_or_else(|| {
        warn!(
            shell = shell_path,
            "unrecognized shell, trying bash-style instrumentation"
        );
        ShellKind::PosixTraced
    })
}

/// Write the startup file into the workspace and run the shell until the
/// user leaves it. A non-zero exit of the shell is not an error.
pub fn run_session<L: Launcher>(
    workspace: &Workspace,
    shell_path: &str,
    launcher: &L,
) -> CaptureResult<ExitReport> {
    let strategy = shell_kind(shell_path).strategy();
    let rc_path = strategy.rc_path(workspace);
    let script = generate_instrumentation(
        strategy.kind(),
        &workspace.log_path(),
        &workspace.marker_path(),
    );
    workspace.write_private(&rc_path, &script)?;
    debug!(rc = %rc_path.display(), kind = ?strategy.kind(), "wrote instrumentation");

    let mut command = session_command(strategy, workspace, shell_path);
    let status = launcher
        .launch(&mut command)
        .map_err(|source| CaptureError::Spawn {
            shell: shell_path.to_string(),
            source,
        })?;

    let report = ExitReport::from(status);
    if report.is_clean() {
        info!(shell = shell_path, status = %report, "capture session ended");
    } else {
        warn!(shell = shell_path, status = %report, "captured shell did not exit cleanly");
    }
    Ok(report)
}

fn session_command(
    strategy: &dyn InstrumentationStrategy,
    workspace: &Workspace,
    shell_path: &str,
) -> Command {
    let mut command = Command::new(shell_path);
    strategy.configure(&mut command, workspace);
    command
}
