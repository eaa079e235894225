pub mod cache;
pub mod commit_info;
pub mod locate;
pub mod model;
pub mod operations;
pub mod publish;
pub mod rewrite;
pub mod session;
pub mod snapshot;

#[cfg(test)]
mod git_command_test;

#[cfg(test)]
mod locate_test;
