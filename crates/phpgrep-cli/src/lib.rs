//! Command-line runtime for phpgrep.
//!
//! [`run`] parses arguments, compiles the pattern and its filters once,
//! discovers PHP files, scans them in parallel, and prints the accepted
//! matches. The streams are parameters so tests can drive the runtime
//! in-process.
//!
//! Exit status is `0` when at least one match was printed, `1` when there
//! were none, and `2` on a fatal error.

use std::ffi::OsString;
use std::io::Write;
use std::process::ExitCode;

use clap::Parser as _;
use tracing::debug;

use phpgrep_core::{FilterSet, Pattern};

mod cli;
mod defaults;
mod discovery;
mod errors;
mod logging;
mod output;
mod scan;
mod telemetry;

use cli::Cli;
pub use cli::OutputFormat;
pub use defaults::{DEFAULT_LOG_FILTER, LOG_FILTER_ENV, default_log_format};
pub use errors::AppError;
pub use logging::{LogFormat, LogFormatParseError};
use scan::Search;
pub use telemetry::TelemetryError;

const EXIT_NO_MATCHES: u8 = 1;
const EXIT_FAILURE: u8 = 2;

/// Runs phpgrep with `args` (including the program name) and returns the
/// process exit status.
pub fn run<I, T, W, E>(args: I, stdout: &mut W, stderr: &mut E) -> ExitCode
where
    I: IntoIterator<Item = T>,
    T: Into<OsString> + Clone,
    W: Write,
    E: Write,
{
    match execute(args, stdout) {
        Ok(0) => ExitCode::from(EXIT_NO_MATCHES),
        Ok(_) => ExitCode::SUCCESS,
        Err(AppError::CliUsage(error)) => report_usage(&error, stdout, stderr),
        Err(error) => {
            let _ = writeln!(stderr, "phpgrep: {error}");
            ExitCode::from(EXIT_FAILURE)
        }
    }
}

fn execute<I, T, W>(args: I, stdout: &mut W) -> Result<usize, AppError>
where
    I: IntoIterator<Item = T>,
    T: Into<OsString> + Clone,
    W: Write,
{
    let cli = Cli::try_parse_from(args)?;
    telemetry::initialise(&cli.log_filter, cli.log_format)?;

    let pattern = Pattern::compile(&cli.pattern)?;
    let filters = FilterSet::compile(&cli.filters, &pattern)?;
    debug!(
        pattern = pattern.source(),
        filters = filters.filters().len(),
        "compiled search"
    );

    let files = discovery::discover_files(&cli.path, &cli.excludes)?;
    let matches = Search {
        pattern: &pattern,
        filters: &filters,
    }
    .run(&files, cli.jobs)?;

    output::write_matches(stdout, &matches, cli.format, cli.limit())
}

/// Help and version requests go to stdout and succeed; anything else is a
/// usage error.
fn report_usage<W: Write, E: Write>(
    error: &clap::Error,
    stdout: &mut W,
    stderr: &mut E,
) -> ExitCode {
    if error.use_stderr() {
        let _ = write!(stderr, "{}", error.render());
        ExitCode::from(EXIT_FAILURE)
    } else {
        let _ = write!(stdout, "{}", error.render());
        ExitCode::SUCCESS
    }
}
