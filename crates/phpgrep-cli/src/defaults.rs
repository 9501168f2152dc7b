//! Default values for command-line options.

use crate::logging::LogFormat;

/// Default log filter expression; only warnings such as skipped files are
/// shown.
pub const DEFAULT_LOG_FILTER: &str = "warn";

/// Environment variable consulted when `--log-filter` is absent.
pub const LOG_FILTER_ENV: &str = "PHPGREP_LOG";

/// Default logging format.
#[must_use]
pub const fn default_log_format() -> LogFormat {
    LogFormat::Compact
}
