//! # Args
//!
//! Command-line surface of `shellcap`, parsed with `clap`. Turns the raw
//! arguments into a [`CliCommand`] ready to run.
use crate::{
    commands::{RunnableCommand, capture, list, run},
    errors::CaptureResult,
    parsers::parse_capture_index,
    paths::DEFAULT_OUTPUT_DIR,
};
use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(version, about, long_about = None)]
pub struct CliParser {
    #[command(subcommand)]
    pub command: CliCommand,
}

#[derive(Subcommand, PartialEq, Eq, Debug)]
pub enum CliCommand {
    /// Open a captured shell; `shellcap save` inside it writes a replay script
    Capture(capture::CaptureCommand),

    /// Replay a saved capture, the most recent one if not specified
    Run(run::RunCommand),

    /// List the saved captures
    List(list::ListCommand),
}

impl CliCommand {
    pub fn run(&self) -> CaptureResult<()> {
        match self {
            CliCommand::Capture(cmd) => cmd.run(),
            CliCommand::Run(cmd) => cmd.run(),
            CliCommand::List(cmd) => cmd.run(),
        }
    }
}

#[derive(Args, PartialEq, Eq, Debug, Clone)]
pub struct OutputArgs {
    /// Directory holding replay scripts and metadata
    #[arg(
        long,
        env = "SHELLCAP_OUTPUT_DIR",
        default_value = DEFAULT_OUTPUT_DIR,
        value_name = "DIR"
    )]
    pub output_dir: PathBuf,
}

impl OutputArgs {
    pub fn new(output_dir: impl Into<PathBuf>) -> Self {
        Self {
            output_dir: output_dir.into(),
        }
    }
}

/// Either `capture@{N}` or a path to a metadata document.
#[derive(Clone, PartialEq, Eq, Debug)]
pub enum CaptureRef {
    Index(u32),
    File(PathBuf),
}

pub fn parse_command(args: &[String]) -> CaptureResult<CliCommand> {
    let cli_command = CliParser::try_parse_from(args)?;
    Ok(cli_command.command)
}

pub fn parse_capture_ref(s: &str) -> Result<CaptureRef, String> {
    if s.starts_with("capture@") {
        parse_capture_index(s).map(CaptureRef::Index)
    } else {
        Ok(CaptureRef::File(PathBuf::from(s)))
    }
}

/// 0 disables the delay, otherwise 10ms to 10s.
pub fn parse_delay(s: &str) -> Result<u64, String> {
    let delay = s
        .parse::<u64>()
        .map_err(|_| format!("Delay must be a number of milliseconds, got '{}'", s))?;
    match delay {
        0 | 10..=10_000 => Ok(delay),
        _ => Err(format!("Delay must be 0 or between 10 and 10000 ms, got {}", delay)),
    }
}
