//! # Workspace
//!
//! Every capture owns a private temporary directory holding the command
//! log, the save marker and the generated shell startup files. The
//! directory is never removed by `shellcap` so it can be inspected after
//! the session ends.

use crate::errors::{CaptureError, CaptureResult};
use std::fs::OpenOptions;
use std::io::Write;
use std::os::unix::fs::OpenOptionsExt;
use std::path::{Path, PathBuf};
use tracing::debug;

const WORKSPACE_PREFIX: &str = "shellcap-";
pub const LOG_FILE: &str = "commands.log";
pub const MARKER_FILE: &str = ".save_marker";
pub const POSIX_RC_FILE: &str = "capture_rc.sh";
pub const ZSH_RC_FILE: &str = ".zshrc";

/// Owner read/write only.
pub(crate) const PRIVATE_MODE: u32 = 0o600;

/// Whether the user asked to keep the capture.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CaptureOutcome {
    Saved,
    NotSaved,
}

#[derive(Debug, Clone)]
pub struct Workspace {
    root: PathBuf,
}

impl Workspace {
    /// Create a uniquely named directory under the system temp dir with an
    /// empty command log inside it.
    pub fn create() -> CaptureResult<Self> {
        Self::create_in(std::env::temp_dir())
    }

    pub fn create_in(parent: impl AsRef<Path>) -> CaptureResult<Self> {
        let root = tempfile::Builder::new()
            .prefix(WORKSPACE_PREFIX)
            .tempdir_in(parent)
            .map_err(CaptureError::Workspace)?
            .keep();

        let workspace = Self { root };
        OpenOptions::new()
            .write(true)
            .create_new(true)
            .mode(PRIVATE_MODE)
            .open(workspace.log_path())
            .map_err(CaptureError::Workspace)?;

        debug!(root = %workspace.root.display(), "created capture workspace");
        Ok(workspace)
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn log_path(&self) -> PathBuf {
        self.root.join(LOG_FILE)
    }

    pub fn marker_path(&self) -> PathBuf {
        self.root.join(MARKER_FILE)
    }

    pub fn posix_rc_path(&self) -> PathBuf {
        self.root.join(POSIX_RC_FILE)
    }

    pub fn zsh_rc_path(&self) -> PathBuf {
        self.root.join(ZSH_RC_FILE)
    }

    /// Write a generated startup file, readable by the owner only.
    pub fn write_private(&self, path: &Path, contents: &str) -> CaptureResult<()> {
        let mut file = OpenOptions::new()
            .write(true)
            .create(true)
            .truncate(true)
            .mode(PRIVATE_MODE)
            .open(path)?;
        file.write_all(contents.as_bytes())?;
        Ok(())
    }

    /// Only the presence of the marker matters, never its content.
    pub fn outcome(&self) -> CaptureOutcome {
        if self.marker_path().exists() {
            CaptureOutcome::Saved
        } else {
            CaptureOutcome::NotSaved
        }
    }
}
