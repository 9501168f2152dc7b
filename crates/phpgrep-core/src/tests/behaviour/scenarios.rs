//! Scenario bindings for the `phpgrep-core` BDD feature file.
//!
//! These functions bind Gherkin scenario names to the step definitions in the
//! parent module.

use std::cell::RefCell;

use rstest::fixture;
use rstest_bdd_macros::scenario;

use super::TestWorld;

/// Fixture providing the shared BDD world.
#[fixture]
fn world() -> RefCell<TestWorld> {
    super::world()
}

#[scenario(path = "tests/features/filtering.feature", name = "Pattern without filters matches every call")]
fn unfiltered_search(world: RefCell<TestWorld>) {
    drop(world);
}

#[scenario(path = "tests/features/filtering.feature", name = "Double-quoted string filter")]
fn double_quoted_string_filter(world: RefCell<TestWorld>) {
    drop(world);
}

#[scenario(path = "tests/features/filtering.feature", name = "Single-quoted string filter")]
fn single_quoted_string_filter(world: RefCell<TestWorld>) {
    drop(world);
}

#[scenario(path = "tests/features/filtering.feature", name = "String alternatives")]
fn string_alternatives(world: RefCell<TestWorld>) {
    drop(world);
}

#[scenario(path = "tests/features/filtering.feature", name = "Regex filter searches the raw literal")]
fn regex_filter(world: RefCell<TestWorld>) {
    drop(world);
}

#[scenario(path = "tests/features/filtering.feature", name = "Anchored regex filter")]
fn anchored_regex_filter(world: RefCell<TestWorld>) {
    drop(world);
}

#[scenario(path = "tests/features/filtering.feature", name = "Anchored regex filter that needs an extra character")]
fn anchored_regex_without_match(world: RefCell<TestWorld>) {
    drop(world);
}

#[scenario(path = "tests/features/filtering.feature", name = "Integer equality")]
fn integer_equality(world: RefCell<TestWorld>) {
    drop(world);
}

#[scenario(path = "tests/features/filtering.feature", name = "Integer alternatives")]
fn integer_alternatives(world: RefCell<TestWorld>) {
    drop(world);
}

#[scenario(path = "tests/features/filtering.feature", name = "Integer inequality")]
fn integer_inequality(world: RefCell<TestWorld>) {
    drop(world);
}

#[scenario(path = "tests/features/filtering.feature", name = "Integer inequality against several values")]
fn integer_inequality_set(world: RefCell<TestWorld>) {
    drop(world);
}

#[scenario(path = "tests/features/filtering.feature", name = "Filters on different names are combined")]
fn combined_filters(world: RefCell<TestWorld>) {
    drop(world);
}

#[scenario(path = "tests/features/filtering.feature", name = "Filter on an unknown name is rejected")]
fn unknown_filter_name(world: RefCell<TestWorld>) {
    drop(world);
}

#[scenario(
    path = "tests/features/filtering.feature",
    name = "Regex filter over a variadic capture searches its spanned text"
)]
fn variadic_regex_filter(world: RefCell<TestWorld>) {
    drop(world);
}

#[scenario(
    path = "tests/features/filtering.feature",
    name = "Integer filter over a variadic capture never accepts"
)]
fn variadic_integer_filter(world: RefCell<TestWorld>) {
    drop(world);
}
