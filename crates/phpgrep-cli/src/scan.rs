//! Parallel file scanning.
//!
//! Each file is read, parsed with a worker-local parser, searched, and
//! filtered independently. Results come back in the order of the file list
//! because the parallel iterator is indexed.
//!
//! Workers run on a local pool with a large stack, since matching recurses
//! over trees up to [`phpgrep_syntax::MAX_DEPTH`] levels deep.

use std::collections::BTreeMap;
use std::fs;
use std::num::NonZeroUsize;
use std::path::{Path, PathBuf};

use rayon::ThreadPoolBuilder;
use rayon::prelude::*;
use serde::Serialize;
use tracing::{debug, warn};

use phpgrep_core::{FilterSet, Match, Pattern};
use phpgrep_syntax::Parser;

use crate::errors::AppError;

/// Stack size for scanning workers.
const WORKER_STACK_BYTES: usize = 64 * 1024 * 1024;

/// One accepted match, detached from the parsed file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub(crate) struct FileMatch {
    pub(crate) path: String,
    pub(crate) line: u32,
    pub(crate) column: u32,
    #[serde(skip)]
    pub(crate) offset: usize,
    pub(crate) text: String,
    pub(crate) captures: BTreeMap<String, String>,
}

impl FileMatch {
    fn new(path: &str, found: &Match<'_>) -> Self {
        Self {
            path: path.to_owned(),
            line: found.line(),
            column: found.column(),
            offset: found.byte_range().start,
            text: found.text().to_owned(),
            captures: found
                .binding()
                .iter()
                .map(|(name, bound)| (name.to_owned(), bound.text().to_owned()))
                .collect(),
        }
    }

    const fn sort_key(&self) -> (u32, u32, usize) {
        (self.line, self.column, self.offset)
    }
}

/// Result of scanning a single file.
#[derive(Debug)]
pub(crate) enum FileOutcome {
    /// The file parsed; these matches survived the filters.
    Searched(Vec<FileMatch>),
    /// The file could not be read or parsed.
    Skipped {
        /// The file that was skipped.
        path: PathBuf,
        /// Why it was skipped.
        reason: String,
    },
}

impl FileOutcome {
    fn skipped(path: &Path, reason: impl Into<String>) -> Self {
        Self::Skipped {
            path: path.to_path_buf(),
            reason: reason.into(),
        }
    }
}

/// Compiled search shared by every worker.
#[derive(Debug, Clone, Copy)]
pub(crate) struct Search<'a> {
    pub(crate) pattern: &'a Pattern,
    pub(crate) filters: &'a FilterSet,
}

impl Search<'_> {
    /// Scans `files` on a pool of `jobs` workers, one per CPU by default,
    /// and returns the accepted matches in file order. Skipped files are
    /// logged.
    pub(crate) fn run(
        self,
        files: &[PathBuf],
        jobs: Option<NonZeroUsize>,
    ) -> Result<Vec<FileMatch>, AppError> {
        let mut builder = ThreadPoolBuilder::new().stack_size(WORKER_STACK_BYTES);
        if let Some(count) = jobs {
            builder = builder.num_threads(count.get());
        }
        let outcomes = builder.build()?.install(|| self.scan_all(files));

        let mut matches = Vec::new();
        for outcome in outcomes {
            match outcome {
                FileOutcome::Searched(found) => matches.extend(found),
                FileOutcome::Skipped { path, reason } => {
                    warn!(path = %path.display(), %reason, "skipping file");
                }
            }
        }
        Ok(matches)
    }

    fn scan_all(self, files: &[PathBuf]) -> Vec<FileOutcome> {
        files
            .par_iter()
            .map_init(Parser::new, |worker, path| match worker {
                Ok(parser) => self.scan_file(parser, path),
                Err(error) => FileOutcome::skipped(path, error.to_string()),
            })
            .collect()
    }

    fn scan_file(self, parser: &mut Parser, path: &Path) -> FileOutcome {
        let bytes = match fs::read(path) {
            Ok(bytes) => bytes,
            Err(error) => return FileOutcome::skipped(path, error.to_string()),
        };
        let source = String::from_utf8_lossy(&bytes);

        let parsed = match parser.parse(&source) {
            Ok(parsed) => parsed,
            Err(error) => return FileOutcome::skipped(path, error.to_string()),
        };
        if let Some(first) = parsed.errors().first() {
            return FileOutcome::skipped(
                path,
                format!(
                    "{} at {}:{} near `{}`",
                    first.message, first.line, first.column, first.context
                ),
            );
        }

        let tree = match parsed.into_source_tree() {
            Ok(tree) => tree,
            Err(error) => return FileOutcome::skipped(path, error.to_string()),
        };
        let shown = display_path(path);
        let mut found: Vec<FileMatch> = self
            .pattern
            .find_all(&tree)
            .iter()
            .filter(|candidate| self.filters.accepts(candidate.binding()))
            .map(|candidate| FileMatch::new(&shown, candidate))
            .collect();
        found.sort_by_key(FileMatch::sort_key);

        debug!(path = %shown, matches = found.len(), "searched file");
        FileOutcome::Searched(found)
    }
}

/// Renders `path` as discovered, without a leading `./`.
fn display_path(path: &Path) -> String {
    let shown = path.to_string_lossy();
    shown.strip_prefix("./").unwrap_or(&shown).to_owned()
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;
    use tempfile::TempDir;

    fn write(dir: &TempDir, name: &str, source: &str) -> PathBuf {
        let path = dir.path().join(name);
        fs::write(&path, source).expect("write fixture");
        path
    }

    fn search(pattern: &str, filters: &[&str], files: &[PathBuf]) -> Vec<FileMatch> {
        search_with_jobs(pattern, filters, files, NonZeroUsize::new(2))
    }

    fn search_with_jobs(
        pattern: &str,
        filters: &[&str],
        files: &[PathBuf],
        jobs: Option<NonZeroUsize>,
    ) -> Vec<FileMatch> {
        let compiled = Pattern::compile(pattern).expect("pattern");
        let filter_set = FilterSet::compile(filters, &compiled).expect("filters");
        Search {
            pattern: &compiled,
            filters: &filter_set,
        }
        .run(files, jobs)
        .expect("scan")
    }

    #[test]
    fn matches_keep_file_and_line_order() {
        let dir = TempDir::new().expect("temp dir");
        let files: Vec<PathBuf> = (0..12)
            .map(|index| {
                write(
                    &dir,
                    &format!("f{index:02}.php"),
                    &format!("<?php\nf({index});\n\nf({index}, 0);\n"),
                )
            })
            .collect();

        let found = search("f($*_)", &[], &files);

        let lines: Vec<_> = found.iter().map(|m| (m.text.clone(), m.line)).collect();
        let expected: Vec<_> = (0..12)
            .flat_map(|index| [(format!("f({index})"), 2), (format!("f({index}, 0)"), 4)])
            .collect();
        assert_eq!(lines, expected);
    }

    #[test]
    fn unparseable_files_are_skipped() {
        let dir = TempDir::new().expect("temp dir");
        let broken = write(&dir, "a.php", "<?php\ndefine('FOO', 1;\n");
        let good = write(&dir, "b.php", "<?php\ndefine('FOO', 1);\n");

        let found = search("define($name, $_)", &[], &[broken, good.clone()]);

        assert_eq!(found.len(), 1);
        assert_eq!(
            found.first().map(|m| m.path.clone()),
            Some(good.to_string_lossy().into_owned())
        );
    }

    #[rstest]
    #[case(None)]
    #[case(NonZeroUsize::new(1))]
    fn deeply_nested_files_are_skipped(#[case] jobs: Option<NonZeroUsize>) {
        let dir = TempDir::new().expect("temp dir");
        let terms = phpgrep_syntax::MAX_DEPTH * 2;
        let deep = write(
            &dir,
            "deep.php",
            &format!("<?php\n$s = {}$a;\nf(1);\n", "$a . ".repeat(terms)),
        );
        let good = write(&dir, "good.php", "<?php\nf(2);\n");

        let found = search_with_jobs("f($x)", &[], &[deep, good.clone()], jobs);

        let paths: Vec<_> = found.iter().map(|m| m.path.clone()).collect();
        assert_eq!(paths, vec![good.to_string_lossy().into_owned()]);
    }

    #[test]
    fn moderately_nested_files_are_searched() {
        let dir = TempDir::new().expect("temp dir");
        let terms = phpgrep_syntax::MAX_DEPTH / 2;
        let path = write(
            &dir,
            "long.php",
            &format!("<?php\n$s = {}$a;\nf(1);\n", "$a . ".repeat(terms)),
        );

        let found = search("f($x)", &[], &[path]);

        assert_eq!(found.len(), 1);
    }

    #[test]
    fn unreadable_files_are_skipped() {
        let dir = TempDir::new().expect("temp dir");
        let missing = dir.path().join("gone.php");

        let found = search("f()", &[], &[missing]);

        assert!(found.is_empty());
    }

    #[test]
    fn invalid_utf8_is_decoded_lossily() {
        let dir = TempDir::new().expect("temp dir");
        let path = dir.path().join("latin1.php");
        fs::write(&path, b"<?php\n$s = 'caf\xe9';\nf(1);\n").expect("write fixture");

        let found = search("f($x)", &[], &[path]);

        assert_eq!(found.iter().map(|m| m.line).collect::<Vec<_>>(), vec![3]);
    }

    #[test]
    fn captures_are_recorded_by_name() {
        let dir = TempDir::new().expect("temp dir");
        let path = write(&dir, "a.php", "<?php\ndefine('FOO', 1);\ndefine('BAR', 2);\n");

        let found = search("define($name, $v)", &["v=2"], &[path]);

        let captures: Vec<_> = found.iter().map(|m| m.captures.clone()).collect();
        assert_eq!(
            captures,
            vec![BTreeMap::from([
                ("name".to_owned(), "'BAR'".to_owned()),
                ("v".to_owned(), "2".to_owned()),
            ])]
        );
    }

    #[rstest]
    #[case("./src/a.php", "src/a.php")]
    #[case("src/a.php", "src/a.php")]
    #[case("/tmp/a.php", "/tmp/a.php")]
    fn leading_dot_slash_is_dropped(#[case] raw: &str, #[case] expected: &str) {
        assert_eq!(display_path(Path::new(raw)), expected);
    }
}
