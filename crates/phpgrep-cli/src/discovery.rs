//! Source file discovery.
//!
//! A file argument is searched as given. A directory is walked recursively
//! and every file with a PHP extension is kept, minus anything matched by an
//! `--exclude` glob. Ignore files are not consulted.

use std::fs;
use std::path::{Path, PathBuf};

use ignore::WalkBuilder;
use ignore::overrides::{Override, OverrideBuilder};
use phpgrep_syntax::is_php_path;
use tracing::{debug, warn};

use crate::errors::AppError;

/// Lists the files to search under `root`, sorted by path.
pub(crate) fn discover_files(root: &Path, excludes: &[String]) -> Result<Vec<PathBuf>, AppError> {
    let metadata = fs::metadata(root).map_err(|source| AppError::Root {
        path: root.to_path_buf(),
        source,
    })?;

    if !metadata.is_dir() {
        return Ok(vec![root.to_path_buf()]);
    }

    let mut builder = WalkBuilder::new(root);
    builder
        .standard_filters(false)
        .overrides(exclude_overrides(root, excludes)?);

    let mut files = Vec::new();
    for walked in builder.build() {
        match walked {
            Ok(entry) if entry.file_type().is_some_and(|kind| kind.is_file()) => {
                if is_php_path(entry.path()) {
                    files.push(entry.into_path());
                }
            }
            Ok(_) => {}
            Err(error) => warn!(%error, "skipping unreadable path"),
        }
    }

    files.sort();
    files.dedup();
    debug!(root = %root.display(), count = files.len(), "discovered files");
    Ok(files)
}

fn exclude_overrides(root: &Path, excludes: &[String]) -> Result<Override, AppError> {
    let mut overrides = OverrideBuilder::new(root);
    for glob in excludes {
        overrides
            .add(&format!("!{glob}"))
            .map_err(|source| AppError::Exclude {
                glob: glob.clone(),
                source,
            })?;
    }
    overrides.build().map_err(|source| AppError::Exclude {
        glob: excludes.join(" "),
        source,
    })
}
