//! Cross-module tests for phpgrep-core.
