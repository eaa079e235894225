//! Shared test utilities for the git-fixup workspace

pub mod git_test_utils;
