pub mod git_command_executor;
pub mod git_info;
pub mod retry;
