use crate::cache::TreeIdCache;
use crate::commit_info::{get_commit_info, resolve_head};
use crate::locate::resolve_commit;
use crate::model::FixupError;
use crate::publish::publish_tip;
use crate::rewrite::rewrite_history;
use crate::session::CommitSession;
use crate::snapshot::{stage_files, write_staged_tree};
use git_executor::git_command_executor::GitCommandExecutor;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, instrument};

/// Parameters for creating a new commit from a set of files.
#[derive(Debug, Clone, Deserialize)]
pub struct CreateCommitParams {
  pub files: Vec<String>,
  pub message: String,
}

/// Outcome report for a create operation. Errors are folded into the report
/// text; callers never observe a raw failure.
#[derive(Debug, Serialize)]
pub struct CreateCommitReport {
  pub success: bool,
  pub file_count: usize,
  pub commit_id: Option<String>,
  /// Raw backend output on success, failure description otherwise.
  pub output: String,
}

/// Stage `files`, create one commit with `message`, and remember its identity
/// for a later amend in the same session.
#[instrument(skip(git_executor, session, params), fields(file_count = params.files.len()))]
pub fn create_commit(git_executor: &GitCommandExecutor, session: &CommitSession, repo_path: &str, params: CreateCommitParams) -> CreateCommitReport {
  let file_count = params.files.len();
  match try_create_commit(git_executor, session, repo_path, &params) {
    Ok((commit_id, raw_output)) => CreateCommitReport {
      success: true,
      file_count,
      commit_id: Some(commit_id.clone()),
      output: format!("Successfully committed {file_count} file(s) (commit: {commit_id}):\n{raw_output}"),
    },
    Err(e) => CreateCommitReport {
      success: false,
      file_count,
      commit_id: None,
      output: format!("Git commit failed: {e}"),
    },
  }
}

fn try_create_commit(
  git_executor: &GitCommandExecutor,
  session: &CommitSession,
  repo_path: &str,
  params: &CreateCommitParams,
) -> Result<(String, String), FixupError> {
  stage_files(git_executor, repo_path, &params.files)?;

  let raw_output = git_executor
    .execute_command(&["commit", "-m", &params.message], repo_path)
    .map_err(FixupError::Tool)?;

  let commit_id = resolve_head(git_executor, repo_path).map_err(FixupError::Tool)?;
  session.record(commit_id.clone(), params.message.clone());
  info!(commit_id = %commit_id, "created commit and recorded session state");

  Ok((commit_id, raw_output))
}

/// Parameters for amending files onto the last created commit.
#[derive(Debug, Clone, Deserialize)]
pub struct AmendCommitParams {
  pub files: Vec<String>,
}

/// Outcome report for an amend operation.
#[derive(Debug, Serialize)]
pub struct AmendCommitReport {
  pub success: bool,
  /// True when the remembered commit was still the tip and was amended in place.
  pub fast_path: bool,
  pub amended_commit_id: Option<String>,
  /// Tip of the reconstructed chain (general path only).
  pub new_tip: Option<String>,
  /// Identity the target had before amending (general path only).
  pub original_commit_id: Option<String>,
  pub message: String,
}

enum AmendOutcome {
  FastPath { amended_commit_id: String },
  Rewritten { amended_commit_id: String, new_tip: String, original_commit_id: String },
}

/// Amend `files` onto the commit most recently created in this session.
/// Fast in-place amend when that commit is still HEAD; otherwise the full
/// locate → snapshot → rewrite → publish sequence.
#[instrument(skip(git_executor, session, params), fields(file_count = params.files.len()))]
pub fn amend_commit(git_executor: &GitCommandExecutor, session: &CommitSession, repo_path: &str, params: AmendCommitParams) -> AmendCommitReport {
  let file_count = params.files.len();
  match try_amend_commit(git_executor, session, repo_path, &params) {
    Ok(AmendOutcome::FastPath { amended_commit_id }) => AmendCommitReport {
      success: true,
      fast_path: true,
      message: format!("Successfully amended HEAD commit {} with {file_count} file(s)", short(&amended_commit_id)),
      amended_commit_id: Some(amended_commit_id),
      new_tip: None,
      original_commit_id: None,
    },
    Ok(AmendOutcome::Rewritten {
      amended_commit_id,
      new_tip,
      original_commit_id,
    }) => AmendCommitReport {
      success: true,
      fast_path: false,
      message: format!("Successfully edited commit {} with {file_count} file(s)", short(&original_commit_id)),
      amended_commit_id: Some(amended_commit_id),
      new_tip: Some(new_tip),
      original_commit_id: Some(original_commit_id),
    },
    Err(e) => AmendCommitReport {
      success: false,
      fast_path: false,
      amended_commit_id: None,
      new_tip: None,
      original_commit_id: None,
      message: match e {
        FixupError::Usage(_) | FixupError::CommitNotFound { .. } => format!("Error: {e}"),
        _ => format!("Git operation failed: {e}"),
      },
    },
  }
}

fn try_amend_commit(
  git_executor: &GitCommandExecutor,
  session: &CommitSession,
  repo_path: &str,
  params: &AmendCommitParams,
) -> Result<AmendOutcome, FixupError> {
  let last = session
    .last()
    .ok_or_else(|| FixupError::Usage("No previous commit found. Use create_commit first.".to_string()))?;

  let head = resolve_head(git_executor, repo_path).map_err(FixupError::Tool)?;

  stage_files(git_executor, repo_path, &params.files)?;

  if last.id == head {
    debug!(commit_id = %last.id, "remembered commit is still HEAD, amending in place");
    git_executor
      .execute_command(&["commit", "--amend", "--no-edit"], repo_path)
      .map_err(FixupError::Tool)?;
    let amended_commit_id = resolve_head(git_executor, repo_path).map_err(FixupError::Tool)?;
    return Ok(AmendOutcome::FastPath { amended_commit_id });
  }

  // The target is buried in history: locate it, snapshot the staged state,
  // rebuild the chain, and only then move the branch.
  let resolved = resolve_commit(git_executor, repo_path, &last.id, &last.message)?;
  let target = get_commit_info(git_executor, repo_path, resolved.id()).map_err(FixupError::Tool)?;

  let new_tree = write_staged_tree(git_executor, repo_path)?;

  let cache = TreeIdCache::new();
  let outcome = rewrite_history(git_executor, repo_path, &target, &new_tree, &cache)?;

  publish_tip(git_executor, repo_path, &outcome.new_tip)?;

  Ok(AmendOutcome::Rewritten {
    amended_commit_id: outcome.amended_commit_id,
    new_tip: outcome.new_tip,
    original_commit_id: target.id,
  })
}

fn short(commit_id: &str) -> &str {
  &commit_id[..commit_id.len().min(8)]
}
