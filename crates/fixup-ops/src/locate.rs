use crate::model::FixupError;
use anyhow::anyhow;
use git_executor::git_command_executor::GitCommandExecutor;
use tracing::{debug, instrument};

/// How a remembered commit was resolved against current repository state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResolvedCommit {
  /// The remembered hash still denotes an existing commit.
  ByIdentity(String),
  /// The hash is gone (e.g. history was rewritten); found the most recent
  /// commit whose full message matches the remembered one exactly.
  ByMessage(String),
}

impl ResolvedCommit {
  pub fn id(&self) -> &str {
    match self {
      ResolvedCommit::ByIdentity(id) | ResolvedCommit::ByMessage(id) => id,
    }
  }
}

/// Resolve a remembered commit by identity first, falling back to an exact
/// full-message search of the log from tip backward.
///
/// Identity resolution requires the commit to be reachable from HEAD. A prior
/// rewrite leaves the old object in the object store; treating such an
/// unreachable hash as the target would make the descendant range span the
/// whole current chain and duplicate the target on replay.
#[instrument(skip(git_executor, remembered_message))]
pub fn resolve_commit(git_executor: &GitCommandExecutor, repo_path: &str, remembered_id: &str, remembered_message: &str) -> Result<ResolvedCommit, FixupError> {
  let commit_ref = format!("{remembered_id}^{{commit}}");
  let (output, exit_code) = git_executor
    .execute_command_with_status(&["rev-parse", "--verify", "--quiet", &commit_ref], repo_path)
    .map_err(FixupError::Tool)?;

  if exit_code == 0 && !output.trim().is_empty() {
    let resolved_id = output.trim().to_string();
    let (_, ancestor_code) = git_executor
      .execute_command_with_status(&["merge-base", "--is-ancestor", &resolved_id, "HEAD"], repo_path)
      .map_err(FixupError::Tool)?;
    if ancestor_code == 0 {
      debug!(commit_id = %remembered_id, "remembered commit still exists on the current branch");
      return Ok(ResolvedCommit::ByIdentity(resolved_id));
    }
    debug!(commit_id = %remembered_id, "remembered commit exists but is no longer reachable from HEAD");
  }

  debug!(commit_id = %remembered_id, "remembered commit no longer resolves, searching log by message");

  if let Some(id) = find_by_exact_message(git_executor, repo_path, remembered_message)? {
    return Ok(ResolvedCommit::ByMessage(id));
  }

  Err(FixupError::CommitNotFound {
    id: remembered_id.to_string(),
    message: remembered_message.to_string(),
  })
}

/// Scan the log tip-to-root for the first commit whose full message equals
/// `wanted` (trimmed equality, never a substring match).
fn find_by_exact_message(git_executor: &GitCommandExecutor, repo_path: &str, wanted: &str) -> Result<Option<String>, FixupError> {
  let output = git_executor
    .execute_command(&["--no-pager", "log", "--first-parent", "--pretty=format:%H%x1f%B%x1e", "HEAD"], repo_path)
    .map_err(FixupError::Tool)?;

  let wanted = wanted.trim();
  for record in output.split('\u{1e}') {
    let rec = record.trim();
    if rec.is_empty() {
      continue;
    }
    let (id, message) = rec
      .split_once('\x1f')
      .ok_or_else(|| FixupError::Tool(anyhow!("Malformed log record while searching by message")))?;
    if message.trim() == wanted {
      return Ok(Some(id.trim().to_string()));
    }
  }

  Ok(None)
}
