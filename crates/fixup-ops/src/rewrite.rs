use crate::cache::TreeIdCache;
use crate::commit_info::{Commit, create_commit_with_metadata, get_commit_info, prefetch_commit_infos_map};
use crate::model::FixupError;
use anyhow::anyhow;
use git_executor::git_command_executor::GitCommandExecutor;
use tracing::{debug, instrument};

/// Result of rewriting a chain: the amended target and the reconstructed tip.
/// Equal when the target had no descendants.
#[derive(Debug, Clone)]
pub struct RewriteOutcome {
  pub amended_commit_id: String,
  pub new_tip: String,
}

/// Rebuild history so that `target` carries `new_tree` while every descendant
/// up to HEAD is re-derived on top of it, preserving messages, authors,
/// timestamps, and relative order.
///
/// Only new objects are written here; nothing externally visible changes
/// until the caller publishes the returned tip. Works for a root commit
/// (target has no parent) the same as for any other ancestor.
#[instrument(skip(git_executor, target, cache), fields(target_id = %target.id))]
pub fn rewrite_history(
  git_executor: &GitCommandExecutor,
  repo_path: &str,
  target: &Commit,
  new_tree: &str,
  cache: &TreeIdCache,
) -> Result<RewriteOutcome, FixupError> {
  // Amended target: same parent, author, message, timestamps; only the tree changes.
  let amended_commit_id = create_commit_with_metadata(git_executor, repo_path, new_tree, target.parent_id.as_deref(), target, &target.message)
    .map_err(FixupError::Tool)?;
  debug!(amended_id = %amended_commit_id, "created amended target commit");

  // Descendants strictly after the target up to HEAD, oldest first, with
  // their original first parents. --parents avoids per-commit lookups.
  let range = format!("{}..HEAD", target.id);
  let lines = git_executor
    .execute_command_lines(&["rev-list", "--first-parent", "--reverse", "--parents", &range], repo_path)
    .map_err(FixupError::Tool)?;

  let mut descendants: Vec<(String, String)> = Vec::with_capacity(lines.len());
  for line in lines {
    let mut parts = line.split_whitespace();
    if let Some(commit) = parts.next() {
      let parent = parts.next().unwrap_or_default();
      descendants.push((commit.to_string(), parent.to_string()));
    }
  }

  if descendants.is_empty() {
    return Ok(RewriteOutcome {
      new_tip: amended_commit_id.clone(),
      amended_commit_id,
    });
  }

  let commit_info_map = prefetch_commit_infos_map(git_executor, repo_path, &range).map_err(FixupError::Tool)?;

  // Fold over the chain: each step is a pure function of (descendant, cursor).
  let mut cursor = amended_commit_id.clone();
  for (commit_id, original_parent) in &descendants {
    let commit = match commit_info_map.get(commit_id).cloned() {
      Some(info) => info,
      None => get_commit_info(git_executor, repo_path, commit_id).map_err(FixupError::Tool)?,
    };

    let replayed_tree = replay_tree(git_executor, repo_path, cache, &commit, original_parent, &cursor)?;

    cursor = create_commit_with_metadata(git_executor, repo_path, &replayed_tree, Some(&cursor), &commit, &commit.message).map_err(FixupError::Tool)?;
    debug!(original = %commit_id, rewritten = %cursor, "replayed descendant commit");
  }

  Ok(RewriteOutcome {
    amended_commit_id,
    new_tip: cursor,
  })
}

/// Re-derive a descendant's intended content change on top of `cursor`:
/// a three-way merge with the commit's original parent tree as base, the
/// rewritten chain as ours, and the commit's own tree as theirs.
///
/// Fails with `ReplayConflict` when the merge is ambiguous; nothing has been
/// published at that point, so the repository is left exactly as it was.
#[instrument(skip(git_executor, cache, commit), fields(commit_id = %commit.id))]
pub fn replay_tree(
  git_executor: &GitCommandExecutor,
  repo_path: &str,
  cache: &TreeIdCache,
  commit: &Commit,
  original_parent: &str,
  cursor: &str,
) -> Result<String, FixupError> {
  let base_tree = cache.get_tree_id(git_executor, repo_path, original_parent)?;
  let ours_tree = cache.get_tree_id(git_executor, repo_path, cursor)?;
  let theirs_tree = commit.tree_id.clone();

  // Tree-equality fast paths avoid merge-tree entirely
  if base_tree == ours_tree {
    // Nothing upstream actually changed; the commit's own tree still applies
    return Ok(theirs_tree);
  }
  if ours_tree == theirs_tree {
    // Replaying would produce the same tree; no-op merge
    return Ok(ours_tree);
  }
  if theirs_tree == base_tree {
    // The commit changed nothing relative to its parent; keep our tree
    return Ok(ours_tree);
  }

  let merge_base_arg = format!("--merge-base={base_tree}");
  let (merged_out, status) = git_executor
    .execute_command_with_status(&["merge-tree", "--write-tree", &merge_base_arg, &ours_tree, &theirs_tree], repo_path)
    .map_err(FixupError::Tool)?;

  if status == 1 {
    return Err(FixupError::ReplayConflict {
      commit_id: commit.id.clone(),
      subject: commit.subject.trim().to_string(),
    });
  } else if status != 0 {
    return Err(FixupError::Tool(anyhow!("git merge-tree failed while replaying {}: {}", commit.id, merged_out.trim())));
  }

  // First line is the merged tree OID
  Ok(merged_out.lines().next().unwrap_or_default().trim().to_string())
}
