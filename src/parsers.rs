use crate::errors::{CaptureError, CaptureResult};
use crate::instrument::CONTROL_COMMAND;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// One command as written by the shell hook.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LogEntry {
    pub timestamp: Option<String>,
    pub command: String,
}

impl LogEntry {
    /// `<timestamp> <command>`, split on the first space. A line without a
    /// space is kept whole as the command.
    pub fn parse_line(line: &str) -> Self {
        match line.split_once(' ') {
            Some((timestamp, command)) => Self {
                timestamp: Some(timestamp.to_string()),
                command: command.to_string(),
            },
            None => Self {
                timestamp: None,
                command: line.to_string(),
            },
        }
    }

    /// `shellcap save`, `shellcap cancel` and friends.
    pub fn is_control_command(&self) -> bool {
        self.command.split_whitespace().next() == Some(CONTROL_COMMAND)
    }
}

pub fn parse_log_text(text: &str) -> Vec<LogEntry> {
    text.trim_end()
        .lines()
        .filter(|line| !line.is_empty())
        .map(LogEntry::parse_line)
        .filter(|entry| !entry.is_control_command())
        .collect()
}

pub fn parse_log(log_path: &Path) -> CaptureResult<Vec<LogEntry>> {
    let text = std::fs::read_to_string(log_path).map_err(|source| CaptureError::LogRead {
        path: log_path.to_path_buf(),
        source,
    })?;
    Ok(parse_log_text(&text))
}

pub fn parse_capture_index(s: &str) -> Result<u32, String> {
    s.strip_prefix("capture@{")
        .and_then(|rest| rest.strip_suffix('}'))
        .ok_or_else(|| {
            format!(
                "Capture name must be of the form capture@{{index}}, got '{}'",
                s
            )
        })?
        .parse::<u32>()
        .map_err(|_| format!("Invalid capture index in '{}'", s))
}
