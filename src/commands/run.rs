use super::RunnableCommand;
use crate::args::{self, CaptureRef, OutputArgs};
use crate::artifact::CaptureMeta;
use crate::errors::{CaptureError, CaptureResult};
use clap::Args;
use std::io::{self, Write};
use std::os::unix::process::ExitStatusExt;
use std::process::Command;
use std::time::Duration;
use tracing::debug;

#[derive(Args, PartialEq, Eq, Debug)]
pub struct RunCommand {
    /// Capture to replay: capture@{N} or a path to a `-meta.json` file
    #[arg(
        value_name = "capture",
        default_value = "capture@{0}",
        value_parser = args::parse_capture_ref
    )]
    target: CaptureRef,

    /// Show commands without executing them
    #[arg(short, long)]
    show: bool,

    /// Delay (in milliseconds) between commands
    #[arg(long, short, default_value_t = 0, value_name = "ms", value_parser = args::parse_delay)]
    delay: u64,

    #[command(flatten)]
    output: OutputArgs,
}

impl RunnableCommand for RunCommand {
    fn run(&self) -> CaptureResult<()> {
        let meta = match &self.target {
            CaptureRef::Index(index) => CaptureMeta::load_by_index(&self.output.output_dir, *index)?,
            CaptureRef::File(path) => CaptureMeta::load(path)?,
        };
        replay(&meta, self.show, self.delay, &mut io::stdout())
    }
}

impl RunCommand {
    pub fn new(target: CaptureRef, show: bool, delay: u64, output: OutputArgs) -> Self {
        Self {
            target,
            show,
            delay,
            output,
        }
    }
}

/// Run every captured command through `sh -c`, in order, stopping at the
/// first one that fails.
pub fn replay<W: Write>(
    meta: &CaptureMeta,
    show: bool,
    delay: u64,
    out: &mut W,
) -> CaptureResult<()> {
    for (i, command) in meta.iter_commands().enumerate() {
        let step = i + 1;
        if show {
            writeln!(out, "{}: {}", step, command)?;
            continue;
        }

        if step > 1 && delay > 0 {
            std::thread::sleep(Duration::from_millis(delay));
        }

        debug!(step, command, "replaying");
        let status = Command::new("sh")
            .arg("-c")
            .arg(command)
            .status()
            .map_err(|source| CaptureError::Spawn {
                shell: "sh".into(),
                source,
            })?;

        if !status.success() {
            let code = status
                .code()
                .unwrap_or_else(|| 128 + status.signal().unwrap_or(0));
            return Err(CaptureError::StepFailed { step, code });
        }
    }
    Ok(())
}
