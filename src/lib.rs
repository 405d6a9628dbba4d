//! # shellcap
//!
//! `shellcap` is the core library for the `shellcap` CLI tool, a utility to
//! capture the commands typed in an interactive shell and turn them into a
//! standalone replay script.
//!
//! ## Pipeline
//!
//! - [`workspace`] creates the private temporary directory of a capture.
//! - [`instrument`] generates the shell startup file hooking every command.
//! - [`shell`] launches the instrumented shell and waits for it.
//! - [`parsers`] reads the command log back.
//! - [`artifact`] writes the replay script and its metadata.
//!
//! ## Usage
//!
//! ```no_run
//! fn main() {
//!     let args: Vec<String> = std::env::args().collect();
//!     if let Err(err) = shellcap::run(&args) {
//!         eprintln!("{}", err);
//!         std::process::exit(err.exit_code());
//!     }
//! }
//! ```

pub mod args;
pub mod artifact;
pub mod commands;
pub mod errors;
pub mod instrument;
pub mod parsers;
pub mod paths;
pub mod shell;
pub mod workspace;

use errors::CaptureResult;

/// Entrypoint called by the binary.
/// Parses CLI arguments and dispatches the appropriate command.
pub fn run(args: &[String]) -> CaptureResult<()> {
    let command = args::parse_command(args)?;
    command.run()
}
