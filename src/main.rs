// This is the entry point of our `shellcap` CLI tool.
// It delegates execution to the `shellcap` crate, which handles
// argument parsing, command dispatching and core logic.

use shellcap::errors::CaptureError;
use shellcap::run;
use std::{env, process};

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::WARN.into()),
        )
        .with_writer(std::io::stderr)
        .init();

    let args: Vec<String> = env::args().collect();
    match run(&args) {
        Ok(()) => {}
        // clap prints help and version on stdout and usage errors on stderr
        Err(CaptureError::Usage(err)) => err.exit(),
        Err(err) => {
            eprintln!("{}", err);
            process::exit(err.exit_code());
        }
    }
}
