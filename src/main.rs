use std::process::ExitCode;

use clap::Parser;
use colored::Colorize;
use msgkeys::cli::{Arguments, ExitStatus};

fn main() -> ExitCode {
    let args = Arguments::parse();

    match msgkeys::cli::run_cli(args) {
        Ok(status) => status.into(),
        Err(err) => {
            eprintln!("{} {:#}", "error:".bold().red(), err);
            ExitStatus::Error.into()
        }
    }
}
