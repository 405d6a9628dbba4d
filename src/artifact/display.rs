use super::CaptureMeta;
use chrono::{DateTime, Utc};

const MAX_LINE_LEN: usize = 50;

/// One line of `shellcap list`.
pub struct DisplayMeta {
    pub index: usize,
    pub meta: CaptureMeta,
}

impl std::fmt::Display for DisplayMeta {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let first_commands = self
            .meta
            .iter_commands()
            .take(2)
            .collect::<Vec<_>>()
            .join(" | ");
        let list_message = format!(
            "{}, commands: {}",
            Self::format_time_ago(self.meta.original_captured_at),
            first_commands,
        );
        write!(
            f,
            "capture@{{{}}}: {}",
            self.index,
            Self::truncate(&list_message, MAX_LINE_LEN)
        )
    }
}

const UNITS: [(i64, &str); 3] = [(86_400, "days"), (3_600, "hours"), (60, "minutes")];

impl DisplayMeta {
    fn format_time_ago(timestamp: DateTime<Utc>) -> String {
        let secs = Utc::now()
            .signed_duration_since(timestamp)
            .num_seconds()
            .max(0);
        let (count, unit) = UNITS
            .iter()
            .find(|(size, _)| secs >= *size)
            .map(|(size, unit)| (secs / size, *unit))
            .unwrap_or((secs, "seconds"));
        format!("{} {} ago", count, unit)
    }

    /// Cut after `max_len` chars, marking the cut with `...`.
    fn truncate(line: &str, max_len: usize) -> String {
        match line.char_indices().nth(max_len) {
            Some((cut, _)) => format!("{}...", &line[..cut]),
            None => line.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parsers::LogEntry;
    use chrono::Duration;
    use std::path::PathBuf;

    fn meta(age: Duration, commands: &[&str]) -> CaptureMeta {
        CaptureMeta {
            original_captured_at: Utc::now() - age,
            tmp_workspace: PathBuf::from("/tmp/ws"),
            entries: commands
                .iter()
                .map(|c| LogEntry {
                    timestamp: None,
                    command: c.to_string(),
                })
                .collect(),
        }
    }

    #[test]
    fn shows_first_two_commands() {
        let line = DisplayMeta {
            index: 1,
            meta: meta(Duration::days(3), &["ls", "echo hi", "pwd"]),
        };
        assert_eq!(line.to_string(), "capture@{1}: 3 days ago, commands: ls | echo hi");
    }

    #[test]
    fn ages_pick_the_largest_unit() {
        let at = |age: Duration| DisplayMeta::format_time_ago(Utc::now() - age);
        assert_eq!(at(Duration::minutes(5)), "5 minutes ago");
        assert_eq!(at(Duration::seconds(-30)), "0 seconds ago");
        assert_eq!(at(Duration::hours(49)), "2 days ago");
    }

    #[test]
    fn truncation_counts_chars_not_bytes() {
        assert_eq!(DisplayMeta::truncate("héllo", 5), "héllo");
        assert_eq!(DisplayMeta::truncate("héllo wörld", 7), "héllo w...");
    }

    #[test]
    fn long_lines_are_truncated() {
        let line = DisplayMeta {
            index: 0,
            meta: meta(
                Duration::hours(2),
                &["cargo build --release --all-features --workspace"],
            ),
        };
        assert_eq!(
            line.to_string(),
            "capture@{0}: 2 hours ago, commands: cargo build --release --all..."
        );
    }
}
