use crate::model::FixupError;
use git_executor::git_command_executor::GitCommandExecutor;
use tracing::{info, instrument};

/// Move the branch to the new tip and force the working tree and index to
/// match it. Always the final step of a rewrite: everything before this point
/// only writes new objects, so a failure anywhere earlier leaves the
/// repository untouched. A contested ref update here is retried by the
/// executor like any other backend call.
#[instrument(skip(git_executor))]
pub fn publish_tip(git_executor: &GitCommandExecutor, repo_path: &str, new_tip: &str) -> Result<(), FixupError> {
  git_executor.execute_command(&["reset", "--hard", new_tip], repo_path).map_err(FixupError::Tool)?;
  info!(new_tip = %new_tip, "published rewritten branch tip");
  Ok(())
}
