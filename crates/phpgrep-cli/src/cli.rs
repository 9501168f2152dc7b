//! Command-line argument definitions for phpgrep.

use std::num::NonZeroUsize;
use std::path::PathBuf;

use clap::{Parser, ValueEnum};

use crate::defaults::{DEFAULT_LOG_FILTER, LOG_FILTER_ENV, default_log_format};
use crate::logging::LogFormat;

/// Output format selection for matches.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq, ValueEnum)]
pub enum OutputFormat {
    /// `<path>:<line>: <text>`, one match per line.
    #[default]
    Text,
    /// One JSON object per line, including captures.
    Json,
}

/// Structural grep for PHP sources.
///
/// Variables in the pattern act as metavariables: `$x` matches any node,
/// `$_` matches any node without binding, and `$*xs` matches a run of list
/// elements.
#[derive(Parser, Debug)]
#[command(name = "phpgrep", version)]
pub(crate) struct Cli {
    /// File or directory to search.
    #[arg(value_name = "PATH")]
    pub(crate) path: PathBuf,
    /// PHP code pattern, for example `define($name, $_)`.
    #[arg(value_name = "PATTERN", allow_hyphen_values = true)]
    pub(crate) pattern: String,
    /// Value filters, for example `name='FOO'` or `v!=1,2`.
    #[arg(value_name = "FILTER", num_args = 0.., allow_hyphen_values = true)]
    pub(crate) filters: Vec<String>,
    /// Glob of paths to leave out of a directory walk; may be repeated.
    #[arg(long = "exclude", value_name = "GLOB")]
    pub(crate) excludes: Vec<String>,
    /// Number of worker threads; defaults to the available cores.
    #[arg(long, value_name = "N")]
    pub(crate) jobs: Option<NonZeroUsize>,
    /// Stop printing after this many matches; 0 prints all of them.
    #[arg(long, value_name = "N", default_value_t = 0)]
    pub(crate) limit: usize,
    /// Controls how matches are rendered.
    #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
    pub(crate) format: OutputFormat,
    /// Tracing filter directive for diagnostics on stderr.
    #[arg(long, value_name = "FILTER", env = LOG_FILTER_ENV, default_value = DEFAULT_LOG_FILTER)]
    pub(crate) log_filter: String,
    /// Diagnostic log format (`compact` or `json`).
    #[arg(long, value_name = "FORMAT", default_value_t = default_log_format())]
    pub(crate) log_format: LogFormat,
}

impl Cli {
    /// Maximum number of matches to print, if bounded.
    pub(crate) const fn limit(&self) -> Option<usize> {
        if self.limit == 0 {
            None
        } else {
            Some(self.limit)
        }
    }
}
