use crate::model::FixupError;
use anyhow::anyhow;
use dashmap::DashMap;
use git_executor::git_command_executor::GitCommandExecutor;
use std::sync::Arc;
use tracing::{debug, instrument};

/// Cache for commit tree IDs to avoid redundant `git rev-parse` calls.
/// Created per rewrite operation so entries are always fresh; the fold
/// re-reads parent trees repeatedly while replaying descendants.
#[derive(Clone)]
pub struct TreeIdCache {
  cache: Arc<DashMap<String, String>>,
}

impl TreeIdCache {
  pub fn new() -> Self {
    Self { cache: Arc::new(DashMap::new()) }
  }

  /// Get the tree ID for a commit, using the cache when possible.
  #[instrument(skip(self, git_executor), fields(commit_id = %commit_id))]
  pub fn get_tree_id(&self, git_executor: &GitCommandExecutor, repo_path: &str, commit_id: &str) -> Result<String, FixupError> {
    if let Some(tree_id) = self.cache.get(commit_id) {
      debug!("cache hit for commit {}", commit_id);
      return Ok(tree_id.clone());
    }

    debug!("cache miss for commit {}", commit_id);
    let tree_ref = format!("{commit_id}^{{tree}}");
    let output = git_executor
      .execute_command(&["rev-parse", &tree_ref], repo_path)
      .map_err(|e| FixupError::Tool(anyhow!("Failed to get tree ID for {}: {}", commit_id, e)))?;

    let tree_id = output.trim().to_string();
    self.cache.insert(commit_id.to_string(), tree_id.clone());

    Ok(tree_id)
  }
}

impl Default for TreeIdCache {
  fn default() -> Self {
    Self::new()
  }
}
