use chrono::{DateTime, SecondsFormat, Utc};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

pub const DEFAULT_OUTPUT_DIR: &str = "generated";
pub const REPLAY_SUFFIX: &str = "-replay.sh";
pub const META_SUFFIX: &str = "-meta.json";

/// Timestamp usable in a file name: `2026-10-19T10-00-00-123Z`.
pub fn timestamp_token(now: DateTime<Utc>) -> String {
    now.to_rfc3339_opts(SecondsFormat::Millis, true)
        .replace([':', '.'], "-")
}

pub fn replay_script_path(output_dir: &Path, token: &str) -> PathBuf {
    output_dir.join(format!("{}{}", token, REPLAY_SUFFIX))
}

pub fn meta_path(output_dir: &Path, token: &str) -> PathBuf {
    output_dir.join(format!("{}{}", token, META_SUFFIX))
}

pub fn ensure_dir(dir: &Path) -> io::Result<()> {
    if !dir.exists() {
        fs::create_dir_all(dir)?;
    }
    Ok(())
}

/// Metadata documents in `output_dir`, newest first. A missing directory
/// simply holds no captures.
pub fn list_meta_files(output_dir: &Path) -> io::Result<Vec<PathBuf>> {
    if !output_dir.exists() {
        return Ok(Vec::new());
    }
    let mut files = fs::read_dir(output_dir)?
        .map(|entry| entry.map(|e| e.path()))
        .collect::<io::Result<Vec<_>>>()?;
    files.retain(|path| {
        path.file_name()
            .is_some_and(|name| name.to_string_lossy().ends_with(META_SUFFIX))
    });
    // Tokens are zero-padded UTC timestamps, so names sort chronologically.
    files.sort();
    files.reverse();
    Ok(files)
}
