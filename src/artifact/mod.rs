//! # Artifact
//!
//! A saved capture becomes two files in the output directory, both named
//! after the moment they were generated:
//!
//! - `<token>-replay.sh` a POSIX `sh` script running every command through
//!   `sh -c`, stopping at the first failure with that step's status,
//! - `<token>-meta.json` the captured entries and where they came from.

use crate::errors::{CaptureError, CaptureResult};
use crate::parsers::LogEntry;
use crate::paths;
use crate::workspace::Workspace;
use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
use std::borrow::Cow;
use std::fs::{File, OpenOptions};
use std::io::{BufReader, Write};
use std::os::unix::fs::OpenOptionsExt;
use std::path::{Path, PathBuf};
use tracing::debug;

mod display;

pub use display::DisplayMeta;

const SCRIPT_MODE: u32 = 0o755;
const META_MODE: u32 = 0o644;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CaptureMeta {
    pub original_captured_at: DateTime<Utc>,
    pub tmp_workspace: PathBuf,
    pub entries: Vec<LogEntry>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArtifactPaths {
    pub script_path: PathBuf,
    pub meta_path: PathBuf,
}

impl CaptureMeta {
    pub fn load(path: &Path) -> CaptureResult<Self> {
        let file = File::open(path)?;
        let meta = serde_json::from_reader(BufReader::new(file))?;
        Ok(meta)
    }

    /// `index` 0 is the most recent capture in `output_dir`.
    pub fn load_by_index(output_dir: &Path, index: u32) -> CaptureResult<Self> {
        let files = paths::list_meta_files(output_dir)?;
        let path = files.get(index as usize).ok_or_else(|| {
            CaptureError::NotFound(format!(
                "capture@{{{}}} ({} saved in {})",
                index,
                files.len(),
                output_dir.display()
            ))
        })?;
        Self::load(path)
    }

    pub fn iter_commands(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|e| e.command.as_str())
    }
}

/// Write the replay script and metadata for `entries` into `output_dir`.
pub fn generate_artifact(
    entries: &[LogEntry],
    workspace: &Workspace,
    output_dir: &Path,
) -> CaptureResult<ArtifactPaths> {
    generate_artifact_at(entries, workspace.root(), output_dir, Utc::now())
}

pub(crate) fn generate_artifact_at(
    entries: &[LogEntry],
    workspace_root: &Path,
    output_dir: &Path,
    now: DateTime<Utc>,
) -> CaptureResult<ArtifactPaths> {
    let meta = CaptureMeta {
        original_captured_at: now,
        tmp_workspace: workspace_root.to_path_buf(),
        entries: entries.to_vec(),
    };
    let script = render_script(entries, now)?;
    let json = serde_json::to_string_pretty(&meta)?;

    let token = paths::timestamp_token(now);
    paths::ensure_dir(output_dir).map_err(|err| write_error(output_dir, err))?;

    // Metadata goes last: `list` and `run` only ever see complete captures.
    let script_path = paths::replay_script_path(output_dir, &token);
    create_file(&script_path, SCRIPT_MODE, &script)?;
    let meta_path = paths::meta_path(output_dir, &token);
    create_file(&meta_path, META_MODE, &json)?;

    debug!(
        script = %script_path.display(),
        meta = %meta_path.display(),
        entries = entries.len(),
        "wrote replay artifact"
    );
    Ok(ArtifactPaths {
        script_path,
        meta_path,
    })
}

/// Render the replay script. Every command is embedded as one quoted
/// shell word, so its text reaches `sh -c` byte for byte.
pub fn render_script(entries: &[LogEntry], now: DateTime<Utc>) -> CaptureResult<String> {
    let mut script = format!(
        r#"#!/bin/sh
# Replay generated by shellcap
# Entries: {}
# Generated at: {}
#
# Each step runs through `sh -c`. The replay stops at the first failing
# step and exits with its status.

shellcap_step() {{
    sh -c "$2"
    status=$?
    if [ "$status" -ne 0 ]; then
        printf 'replay: step %s failed with exit status %s\n' "$1" "$status" >&2
        exit "$status"
    fi
}}

"#,
        entries.len(),
        now.to_rfc3339_opts(SecondsFormat::Millis, true),
    );

    for (i, entry) in entries.iter().enumerate() {
        let quoted = shlex::try_quote(&entry.command)
            .map(Cow::into_owned)
            .map_err(|_| {
                CaptureError::ArtifactWrite(format!("command {} contains a NUL byte", i + 1))
            })?;
        script.push_str(&format!("shellcap_step {} {}\n", i + 1, quoted));
    }
    Ok(script)
}

fn create_file(path: &Path, mode: u32, contents: &str) -> CaptureResult<()> {
    let mut file = OpenOptions::new()
        .write(true)
        .create_new(true)
        .mode(mode)
        .open(path)
        .map_err(|err| write_error(path, err))?;
    file.write_all(contents.as_bytes())
        .map_err(|err| write_error(path, err))
}

fn write_error(path: &Path, err: std::io::Error) -> CaptureError {
    CaptureError::ArtifactWrite(format!("{}: {}", path.display(), err))
}
