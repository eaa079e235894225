use crate::model::FixupError;
use git_executor::git_command_executor::GitCommandExecutor;
use tracing::instrument;

/// Stage the given paths into the index.
#[instrument(skip(git_executor, files), fields(file_count = files.len()))]
pub fn stage_files(git_executor: &GitCommandExecutor, repo_path: &str, files: &[String]) -> Result<(), FixupError> {
  let mut args = vec!["add", "--"];
  args.extend(files.iter().map(|f| f.as_str()));
  git_executor.execute_command(&args, repo_path).map_err(FixupError::Tool)?;
  Ok(())
}

/// Materialize the current index as an immutable tree object and return its ID.
/// The index must already represent the complete desired content for the
/// commit being amended; no merging happens here.
#[instrument(skip(git_executor))]
pub fn write_staged_tree(git_executor: &GitCommandExecutor, repo_path: &str) -> Result<String, FixupError> {
  let output = git_executor.execute_command(&["write-tree"], repo_path).map_err(FixupError::Tool)?;
  Ok(output.trim().to_string())
}
