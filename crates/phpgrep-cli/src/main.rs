//! CLI entrypoint for phpgrep.
//!
//! The binary delegates to [`phpgrep_cli::run`], which parses arguments,
//! compiles the pattern and filters, scans the requested path, and prints
//! one line per match.

use std::io::{self, StderrLock, StdoutLock};
use std::process::ExitCode;

fn main() -> ExitCode {
    let mut stdout: StdoutLock<'_> = io::stdout().lock();
    let mut stderr: StderrLock<'_> = io::stderr().lock();
    phpgrep_cli::run(std::env::args_os(), &mut stdout, &mut stderr)
}
