use anyhow::{Result, anyhow};
use git_executor::git_command_executor::GitCommandExecutor;
use std::collections::HashMap;
use tracing::{debug, instrument};

/// Immutable commit metadata as reported by git.
/// Identity is content-addressed: changing any field, including the parent,
/// yields a new hash when the commit is recreated.
#[derive(Debug, Clone)]
pub struct Commit {
  pub id: String,
  /// First parent; `None` only for a root commit.
  pub parent_id: Option<String>,
  pub tree_id: String,
  pub author_name: String,
  pub author_email: String,
  pub author_timestamp: u32,
  pub committer_timestamp: u32,
  /// First line of the message.
  pub subject: String,
  /// Full commit message.
  pub message: String,
}

// Field order for the %x1f-delimited log format used below
const LOG_FORMAT: &str = "%H%x1f%B%x1f%an%x1f%ae%x1f%at%x1f%ct%x1f%P%x1f%T";

/// Parse a single `%x1f`-delimited commit record produced with [`LOG_FORMAT`].
pub fn parse_single_commit(record: &str) -> Result<Commit> {
  let mut fields = record.split('\x1f');

  let id_field = fields.next().ok_or_else(|| anyhow!("Missing commit ID field"))?;
  let message_field = fields.next().ok_or_else(|| anyhow!("Missing message field"))?;
  let author_name_field = fields.next().ok_or_else(|| anyhow!("Missing author name field"))?;
  let author_email_field = fields.next().ok_or_else(|| anyhow!("Missing author email field"))?;
  let author_timestamp_field = fields.next().ok_or_else(|| anyhow!("Missing author timestamp field"))?;
  let committer_timestamp_field = fields.next().ok_or_else(|| anyhow!("Missing committer timestamp field"))?;
  let parents_field = fields.next().ok_or_else(|| anyhow!("Missing parents field"))?;
  let tree_id_field = fields.next().ok_or_else(|| anyhow!("Missing tree ID field"))?;

  let message = message_field.trim().to_string();
  let subject = message.lines().next().unwrap_or("").to_string();

  let author_timestamp = author_timestamp_field
    .trim()
    .parse::<u32>()
    .map_err(|e| anyhow!("Failed to parse author timestamp '{}': {}", author_timestamp_field, e))?;
  let committer_timestamp = committer_timestamp_field
    .trim()
    .parse::<u32>()
    .map_err(|e| anyhow!("Failed to parse committer timestamp '{}': {}", committer_timestamp_field, e))?;

  // Only the first parent matters on a first-parent chain
  let parent_id = parents_field.split_whitespace().next().map(|p| p.to_string());

  Ok(Commit {
    id: id_field.trim().to_string(),
    parent_id,
    tree_id: tree_id_field.trim().to_string(),
    author_name: author_name_field.to_string(),
    author_email: author_email_field.to_string(),
    author_timestamp,
    committer_timestamp,
    subject,
    message,
  })
}

/// Fetch full metadata for one commit.
#[instrument(skip(git_executor))]
pub fn get_commit_info(git_executor: &GitCommandExecutor, repo_path: &str, commit_id: &str) -> Result<Commit> {
  let format_arg = format!("--format={LOG_FORMAT}");
  let output = git_executor.execute_command(&["show", "-s", &format_arg, commit_id], repo_path)?;
  parse_single_commit(output.trim())
}

/// Prefetch commit metadata for a range in one git invocation, keyed by hash.
/// Avoids a `git show` per descendant while rewriting a chain.
#[instrument(skip(git_executor))]
pub fn prefetch_commit_infos_map(git_executor: &GitCommandExecutor, repo_path: &str, range: &str) -> Result<HashMap<String, Commit>> {
  let pretty_format = format!("--pretty=format:{LOG_FORMAT}%x1e");
  let args = vec!["--no-pager", "log", "--first-parent", "--reverse", pretty_format.as_str(), range];

  let output = git_executor.execute_command(&args, repo_path)?;
  let mut map = HashMap::new();
  for record in output.split('\u{1e}') {
    let rec = record.trim();
    if rec.is_empty() {
      continue;
    }
    match parse_single_commit(rec) {
      Ok(commit) => {
        map.insert(commit.id.clone(), commit);
      }
      Err(e) => {
        debug!(error = %e, "failed to parse commit during prefetch");
      }
    }
  }
  Ok(map)
}

/// Create a commit object from a tree, carrying over an existing commit's
/// author, committer, and timestamps via `git commit-tree`. The parent can be
/// overridden (or omitted entirely for a root commit); message defaults come
/// from the caller so reworded recreations stay possible.
#[instrument(skip(git_executor, commit))]
pub fn create_commit_with_metadata(
  git_executor: &GitCommandExecutor,
  repo_path: &str,
  tree_id: &str,
  parent_id: Option<&str>,
  commit: &Commit,
  message: &str,
) -> Result<String> {
  let mut args = vec!["commit-tree", tree_id];

  if let Some(parent) = parent_id {
    args.push("-p");
    args.push(parent);
  }

  args.push("-m");
  args.push(message);

  let author_date = commit.author_timestamp.to_string();
  let committer_date = commit.committer_timestamp.to_string();

  let env_vars = vec![
    ("GIT_AUTHOR_NAME", commit.author_name.as_str()),
    ("GIT_AUTHOR_EMAIL", commit.author_email.as_str()),
    ("GIT_AUTHOR_DATE", author_date.as_str()),
    ("GIT_COMMITTER_NAME", commit.author_name.as_str()),
    ("GIT_COMMITTER_EMAIL", commit.author_email.as_str()),
    ("GIT_COMMITTER_DATE", committer_date.as_str()),
  ];

  let output = git_executor.execute_command_with_env(&args, repo_path, &env_vars)?;
  Ok(output.trim().to_string())
}

/// Resolve HEAD to a commit hash.
pub fn resolve_head(git_executor: &GitCommandExecutor, repo_path: &str) -> Result<String> {
  let output = git_executor.execute_command(&["rev-parse", "HEAD"], repo_path)?;
  Ok(output.trim().to_string())
}
