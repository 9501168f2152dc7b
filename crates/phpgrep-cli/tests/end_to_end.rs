//! End-to-end tests for the `phpgrep` binary.
//!
//! Each case runs the binary from inside a fixture directory with `.` as the
//! search root, so output paths are relative to the fixture.

use std::fs;

use assert_cmd::cargo::cargo_bin_cmd;
use predicates::prelude::*;
use predicates::str::contains;
use rstest::{fixture, rstest};
use tempfile::TempDir;

const DEFINE_FIXTURE: &str =
    "<?php\n\ndefine(\"FOO\", 1);\ndefine('FOO', 2);\ndefine('BAR', 3);\n";

#[fixture]
fn fixture_dir() -> TempDir {
    let dir = TempDir::new().expect("temp dir");
    fs::write(dir.path().join("file.php"), DEFINE_FIXTURE).expect("write fixture");
    dir
}

fn expected_output(lines: &[&str]) -> String {
    lines.iter().map(|line| format!("{line}\n")).collect()
}

#[rstest]
#[case("define($name, $_)", &["name=\"FOO\""], &["file.php:3: define(\"FOO\", 1)"])]
#[case("define($name, $_)", &["name='FOO'"], &["file.php:4: define('FOO', 2)"])]
#[case(
    "define($name, $_)",
    &["name='FOO','BAR'"],
    &["file.php:4: define('FOO', 2)", "file.php:5: define('BAR', 3)"]
)]
#[case("define($name, $_)", &["name~\"FOO\""], &["file.php:3: define(\"FOO\", 1)"])]
#[case("define($name, $_)", &["name~^\"FOO\"$"], &["file.php:3: define(\"FOO\", 1)"])]
#[case("define($_, $v)", &["v=2"], &["file.php:4: define('FOO', 2)"])]
#[case(
    "define($_, $v)",
    &["v=1,2"],
    &["file.php:3: define(\"FOO\", 1)", "file.php:4: define('FOO', 2)"]
)]
#[case(
    "define($_, $v)",
    &["v!=2"],
    &["file.php:3: define(\"FOO\", 1)", "file.php:5: define('BAR', 3)"]
)]
#[case("define($_, $v)", &["v!=3,2"], &["file.php:3: define(\"FOO\", 1)"])]
fn filters_select_define_calls(
    fixture_dir: TempDir,
    #[case] pattern: &str,
    #[case] filters: &[&str],
    #[case] expected: &[&str],
) {
    let mut command = cargo_bin_cmd!("phpgrep");
    command
        .current_dir(fixture_dir.path())
        .arg(".")
        .arg(pattern)
        .args(filters);

    command
        .assert()
        .success()
        .stdout(expected_output(expected));
}

#[rstest]
#[case("name~^.\"FOO\"$")]
#[case("name~^..\"FOO\".$")]
fn unmatched_filters_exit_with_one(fixture_dir: TempDir, #[case] filter: &str) {
    let mut command = cargo_bin_cmd!("phpgrep");
    command
        .current_dir(fixture_dir.path())
        .args([".", "define($name, $_)", filter]);

    command.assert().code(1).stdout(predicate::str::is_empty());
}

#[rstest]
fn unknown_filter_names_are_fatal(fixture_dir: TempDir) {
    let mut command = cargo_bin_cmd!("phpgrep");
    command
        .current_dir(fixture_dir.path())
        .args([".", "define($name, $_)", "value=1"]);

    command
        .assert()
        .code(2)
        .stdout(predicate::str::is_empty())
        .stderr(contains("does not capture"));
}

#[rstest]
fn unparseable_files_are_skipped_with_a_warning(fixture_dir: TempDir) {
    fs::write(fixture_dir.path().join("broken.php"), "<?php\ndefine('FOO', 1;\n")
        .expect("write broken file");

    let mut command = cargo_bin_cmd!("phpgrep");
    command
        .current_dir(fixture_dir.path())
        .env_remove("PHPGREP_LOG")
        .args([".", "define($name, $_)", "name='BAR'"]);

    command
        .assert()
        .success()
        .stdout(expected_output(&["file.php:5: define('BAR', 3)"]))
        .stderr(contains("skipping file").and(contains("broken.php")));
}

#[rstest]
fn deeply_nested_files_are_skipped_with_a_warning(fixture_dir: TempDir) {
    let deep = format!(
        "<?php\n$s = {}$a;\ndefine('DEEP', 4);\n",
        "$a . ".repeat(20_000)
    );
    fs::write(fixture_dir.path().join("deep.php"), deep).expect("write deep file");

    let mut command = cargo_bin_cmd!("phpgrep");
    command
        .current_dir(fixture_dir.path())
        .env_remove("PHPGREP_LOG")
        .args([".", "define($name, $_)", "name='BAR','DEEP'"]);

    command
        .assert()
        .success()
        .stdout(expected_output(&["file.php:5: define('BAR', 3)"]))
        .stderr(contains("skipping file").and(contains("deep.php")));
}

#[rstest]
fn json_output_includes_captures(fixture_dir: TempDir) {
    let mut command = cargo_bin_cmd!("phpgrep");
    command
        .current_dir(fixture_dir.path())
        .args(["--format", "json", ".", "define($name, $v)", "v=3"]);

    command.assert().success().stdout(expected_output(&[
        r#"{"path":"file.php","line":5,"column":1,"text":"define('BAR', 3)","captures":{"name":"'BAR'","v":"3"}}"#,
    ]));
}

#[rstest]
fn explicit_file_paths_are_searched(fixture_dir: TempDir) {
    let mut command = cargo_bin_cmd!("phpgrep");
    command
        .current_dir(fixture_dir.path())
        .args(["file.php", "define($_, 1)"]);

    command
        .assert()
        .success()
        .stdout(expected_output(&["file.php:3: define(\"FOO\", 1)"]));
}

#[test]
fn missing_pattern_is_a_usage_error() {
    let mut command = cargo_bin_cmd!("phpgrep");
    command.arg(".");

    command.assert().code(2).stderr(contains("Usage"));
}
