use crate::git_info::GitInfo;
use crate::retry::{RetryPolicy, is_transient_lock_error};
use anyhow::{Result, anyhow};
use std::process::{Command, Output};
use std::sync::{Arc, Mutex};
use tracing::instrument;

/// Executes git commands against a repository, transparently retrying
/// failures caused by concurrent git processes (index.lock contention,
/// contested ref updates). Every repository access in the workspace goes
/// through this type.
#[derive(Clone, Debug)]
pub struct GitCommandExecutor {
  info: Arc<Mutex<Option<GitInfo>>>,
  retry: RetryPolicy,
}

impl Default for GitCommandExecutor {
  fn default() -> Self {
    Self::new()
  }
}

impl GitCommandExecutor {
  #[must_use]
  pub fn new() -> Self {
    Self::with_retry_policy(RetryPolicy::default())
  }

  /// Executor with a custom retry policy. Tests use this to shrink delays.
  #[must_use]
  pub fn with_retry_policy(retry: RetryPolicy) -> Self {
    Self {
      info: Arc::new(Mutex::new(None)),
      retry,
    }
  }

  #[instrument(skip(self))]
  pub fn get_info(&self) -> Result<GitInfo> {
    let mut guard = self.info.lock().map_err(|e| anyhow!("Failed to acquire lock: {}", e))?;
    if guard.is_none() {
      let info = GitInfo::discover().map_err(|e| anyhow!(e))?;
      tracing::info!(git_version = %info.version, git_path = %info.path, "discovered git info");
      *guard = Some(info);
    }

    guard.as_ref().ok_or_else(|| anyhow!("Git info should be initialized")).cloned()
  }

  fn validate_path(repository_path: &str) -> Result<()> {
    if repository_path.is_empty() {
      Err(anyhow!("repository path cannot be blank"))
    } else {
      Ok(())
    }
  }

  fn handle_error<T>(&self, output: &Output, args: &[&str]) -> Result<T> {
    let stderr = String::from_utf8_lossy(&output.stderr).trim().to_string();
    tracing::Span::current().record("success", false);
    tracing::error!(stderr = %stderr, "git command failed");
    let git_info = self.get_info()?;
    Err(anyhow!("git command failed: {} {}\nError: {stderr}", git_info.path, args.join(" ")))
  }

  fn handle_success(output: &Output) -> String {
    let stdout = String::from_utf8_lossy(&output.stdout).trim().to_string();
    tracing::Span::current().record("success", true);
    stdout
  }

  // merge-tree reports conflicts via exit code 1; that is a signal, not a failure
  fn is_acceptable_failure(args: &[&str], status: &std::process::ExitStatus) -> bool {
    args.contains(&"merge-tree") && status.code() == Some(1)
  }

  pub fn parse_lines(output: &[u8]) -> Vec<String> {
    output
      .split(|&b| b == b'\n')
      .filter_map(|line| {
        let line_str = String::from_utf8_lossy(line);
        let trimmed = line_str.trim();
        if !trimmed.is_empty() { Some(trimmed.to_string()) } else { None }
      })
      .collect()
  }

  /// Runs the command, sleeping and rerunning it while the failure looks like
  /// transient lock contention and attempts remain. Non-matching failures are
  /// returned to the caller after the first run.
  fn run_with_retry(&self, args: &[&str], repository_path: &str, env_vars: &[(&str, &str)]) -> Result<(Output, i32)> {
    Self::validate_path(repository_path)?;
    let git_info = self.get_info()?;

    let mut attempt = 1;
    loop {
      let mut cmd = Command::new(&git_info.path);
      cmd.args(args).current_dir(repository_path);
      for (key, value) in env_vars {
        cmd.env(key, value);
      }
      let output = cmd.output().map_err(|e| anyhow!("Failed to execute git command: {e}"))?;
      let exit_code = output.status.code().unwrap_or(-1);

      if !output.status.success() && attempt < self.retry.max_attempts {
        let stderr = String::from_utf8_lossy(&output.stderr);
        if is_transient_lock_error(&stderr) {
          let delay = self.retry.delay_for(attempt);
          tracing::warn!(
            attempt,
            max_attempts = self.retry.max_attempts,
            delay_ms = delay.as_millis() as u64,
            git_command = args.join(" "),
            "git operation blocked by concurrent process, retrying"
          );
          std::thread::sleep(delay);
          attempt += 1;
          continue;
        }
      }

      return Ok((output, exit_code));
    }
  }

  #[instrument(
    skip(self),
    fields(
      git_command = args.join(" "),
      repository_path = repository_path,
      success = tracing::field::Empty,
    )
  )]
  pub fn execute_command(&self, args: &[&str], repository_path: &str) -> Result<String> {
    let (output, _exit_code) = self.run_with_retry(args, repository_path, &[])?;

    if output.status.success() || Self::is_acceptable_failure(args, &output.status) {
      if !output.status.success() {
        tracing::debug!("git merge-tree returned with conflicts");
      }
      Ok(Self::handle_success(&output))
    } else {
      self.handle_error(&output, args)
    }
  }

  /// Execute a git command and return the output with exit code.
  /// Useful when you need to distinguish between different kinds of failures
  /// (e.g. merge-tree conflicts, rev-parse --verify misses).
  #[instrument(
    skip(self),
    fields(
      git_command = args.join(" "),
      repository_path = repository_path,
      success = tracing::field::Empty,
    )
  )]
  pub fn execute_command_with_status(&self, args: &[&str], repository_path: &str) -> Result<(String, i32)> {
    let (output, exit_code) = self.run_with_retry(args, repository_path, &[])?;

    let stdout = String::from_utf8_lossy(&output.stdout).trim().to_string();
    let stderr = String::from_utf8_lossy(&output.stderr).trim().to_string();

    if output.status.success() || Self::is_acceptable_failure(args, &output.status) {
      tracing::Span::current().record("success", true);
      Ok((stdout, exit_code))
    } else {
      tracing::Span::current().record("success", false);
      tracing::debug!(stderr = %stderr, exit_code = exit_code, "git command failed with status");
      Ok((stderr, exit_code))
    }
  }

  #[instrument(
    skip(self),
    fields(
      git_command = args.join(" "),
      repository_path = repository_path,
      success = tracing::field::Empty,
    )
  )]
  pub fn execute_command_with_env(&self, args: &[&str], repository_path: &str, env_vars: &[(&str, &str)]) -> Result<String> {
    let (output, _exit_code) = self.run_with_retry(args, repository_path, env_vars)?;

    if output.status.success() {
      Ok(Self::handle_success(&output))
    } else {
      self.handle_error(&output, args)
    }
  }

  /// Execute a git command and return output as lines, filtering empty lines
  #[instrument(
    skip(self),
    fields(
      git_command = args.join(" "),
      repository_path = repository_path,
      success = tracing::field::Empty,
    )
  )]
  pub fn execute_command_lines(&self, args: &[&str], repository_path: &str) -> Result<Vec<String>> {
    let (output, _exit_code) = self.run_with_retry(args, repository_path, &[])?;

    if output.status.success() {
      tracing::Span::current().record("success", true);
      Ok(Self::parse_lines(&output.stdout))
    } else {
      self.handle_error(&output, args)
    }
  }
}
