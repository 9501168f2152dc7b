//! Match rendering.

use std::io::Write;

use crate::cli::OutputFormat;
use crate::errors::AppError;
use crate::scan::FileMatch;

/// Writes up to `limit` matches to `out` and returns how many were written.
pub(crate) fn write_matches<W: Write>(
    out: &mut W,
    matches: &[FileMatch],
    format: OutputFormat,
    limit: Option<usize>,
) -> Result<usize, AppError> {
    let shown = limit.map_or(matches, |max| matches.get(..max).unwrap_or(matches));

    for found in shown {
        match format {
            OutputFormat::Text => {
                writeln!(out, "{}:{}: {}", found.path, found.line, one_line(&found.text))?;
            }
            OutputFormat::Json => {
                serde_json::to_writer(&mut *out, found)?;
                writeln!(out)?;
            }
        }
    }

    out.flush()?;
    Ok(shown.len())
}

/// Joins the lines of `text` with single spaces, dropping indentation.
fn one_line(text: &str) -> String {
    text.lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .collect::<Vec<_>>()
        .join(" ")
}
