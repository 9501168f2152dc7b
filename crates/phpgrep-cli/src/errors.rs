//! Error types for the CLI runtime.

use std::io;
use std::path::PathBuf;

use thiserror::Error;

use phpgrep_core::{FilterError, PatternError};

use crate::telemetry::TelemetryError;

/// Fatal errors; each one ends the run with exit status 2.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum AppError {
    /// Arguments could not be parsed.
    #[error("{0}")]
    CliUsage(Box<clap::Error>),
    /// The pattern failed to compile.
    #[error("invalid pattern: {0}")]
    Pattern(#[from] PatternError),
    /// A filter failed to compile.
    #[error("{0}")]
    Filter(#[from] FilterError),
    /// The search root does not exist or cannot be inspected.
    #[error("cannot read {}: {source}", .path.display())]
    Root {
        /// The requested path.
        path: PathBuf,
        /// Underlying IO error.
        source: io::Error,
    },
    /// An `--exclude` glob is malformed.
    #[error("invalid exclude glob `{glob}`: {source}")]
    Exclude {
        /// The offending glob.
        glob: String,
        /// Underlying glob error.
        source: ignore::Error,
    },
    /// The worker pool could not be started.
    #[error("failed to start worker pool: {0}")]
    ThreadPool(#[from] rayon::ThreadPoolBuildError),
    /// Diagnostics could not be configured.
    #[error(transparent)]
    Telemetry(#[from] TelemetryError),
    /// Matches could not be written to stdout.
    #[error("failed to write output: {0}")]
    Output(#[from] io::Error),
    /// A match could not be serialised as JSON.
    #[error("failed to serialise match: {0}")]
    Serialise(#[from] serde_json::Error),
}

impl From<clap::Error> for AppError {
    fn from(error: clap::Error) -> Self {
        Self::CliUsage(Box::new(error))
    }
}
