//! # Commands
//!
//! One module per `shellcap` subcommand, each behind [`RunnableCommand`].

use crate::errors::CaptureResult;
use crossterm::style::Stylize;
use crossterm::tty::IsTty;
use std::io;

pub mod capture;
pub mod list;
pub mod run;

/// This trait is the common runner trait
pub trait RunnableCommand {
    /// A runner method is needed for each command
    fn run(&self) -> CaptureResult<()>;
}

/// Status line for the operator, highlighted on a terminal.
pub(crate) fn announce(message: &str) {
    if io::stdout().is_tty() {
        println!("{}", message.bold().green());
    } else {
        println!("{}", message);
    }
}
