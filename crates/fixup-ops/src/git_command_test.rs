use git_executor::git_command_executor::GitCommandExecutor;
use git_executor::retry::RetryPolicy;
use std::time::{Duration, Instant};
use test_log::test;
use test_utils::git_test_utils::TestRepo;

fn fast_policy(max_attempts: u32) -> RetryPolicy {
  RetryPolicy {
    max_attempts,
    initial_delay: Duration::from_millis(20),
    max_delay: Duration::from_millis(200),
  }
}

#[test]
fn test_execute_command_lines() {
  let repo = TestRepo::new();
  repo.create_commit("First commit", "file1.txt", "content1");
  repo.create_commit("Second commit", "file2.txt", "content2");

  let git_executor = GitCommandExecutor::new();
  let commits = git_executor.execute_command_lines(&["log", "--oneline", "-n", "2"], repo.path_str()).unwrap();

  assert_eq!(commits.len(), 2);
  assert!(commits[0].contains("Second commit"));
  assert!(commits[1].contains("First commit"));

  let branches = git_executor.execute_command_lines(&["branch", "--list", "non-existent-*"], repo.path_str()).unwrap();
  assert_eq!(branches.len(), 0);
}

#[test]
fn test_execute_command_with_status_distinguishes_failures() {
  let repo = TestRepo::new();
  repo.create_commit("Initial commit", "file.txt", "content");

  let git_executor = GitCommandExecutor::new();

  let (output, exit_code) = git_executor
    .execute_command_with_status(&["rev-parse", "--verify", "--quiet", "HEAD^{commit}"], repo.path_str())
    .unwrap();
  assert_eq!(exit_code, 0);
  assert!(!output.is_empty());

  let (_, exit_code) = git_executor
    .execute_command_with_status(&["rev-parse", "--verify", "--quiet", "0000000000000000000000000000000000000000^{commit}"], repo.path_str())
    .unwrap();
  assert_ne!(exit_code, 0);
}

#[test]
fn test_retry_succeeds_once_lock_is_released() {
  let repo = TestRepo::new();
  repo.create_commit("Initial commit", "file.txt", "content");
  repo.write_file("file.txt", "updated");

  let lock_path = repo.path().join(".git").join("index.lock");
  std::fs::write(&lock_path, "").unwrap();

  // Release the lock while the executor is backing off
  let lock_for_thread = lock_path.clone();
  let release = std::thread::spawn(move || {
    std::thread::sleep(Duration::from_millis(50));
    std::fs::remove_file(&lock_for_thread).unwrap();
  });

  let git_executor = GitCommandExecutor::with_retry_policy(fast_policy(5));
  let result = git_executor.execute_command(&["add", "file.txt"], repo.path_str());

  release.join().unwrap();
  assert!(result.is_ok(), "add should succeed after the lock is released: {result:?}");
}

#[test]
fn test_retry_exhaustion_propagates_lock_error() {
  let repo = TestRepo::new();
  repo.create_commit("Initial commit", "file.txt", "content");
  repo.write_file("file.txt", "updated");

  // Lock is never released
  let lock_path = repo.path().join(".git").join("index.lock");
  std::fs::write(&lock_path, "").unwrap();

  let policy = fast_policy(5);
  let git_executor = GitCommandExecutor::with_retry_policy(policy);

  let started = Instant::now();
  let result = git_executor.execute_command(&["add", "file.txt"], repo.path_str());
  let elapsed = started.elapsed();

  let error = result.unwrap_err().to_string();
  assert!(error.to_lowercase().contains("index.lock"), "captured stderr should name the lock: {error}");

  // 5 attempts means 4 backoff sleeps: 20 + 40 + 80 + 160 ms
  assert!(elapsed >= Duration::from_millis(300), "all retries should have run, elapsed {elapsed:?}");
}

#[test]
fn test_unrelated_failure_propagates_on_first_attempt() {
  let repo = TestRepo::new();
  repo.create_commit("Initial commit", "file.txt", "content");

  // Delays long enough that a single retry would be visible in elapsed time
  let git_executor = GitCommandExecutor::with_retry_policy(RetryPolicy {
    max_attempts: 5,
    initial_delay: Duration::from_secs(2),
    max_delay: Duration::from_secs(10),
  });

  let started = Instant::now();
  let result = git_executor.execute_command(&["add", "no-such-file.txt"], repo.path_str());
  let elapsed = started.elapsed();

  assert!(result.is_err());
  assert!(elapsed < Duration::from_secs(1), "pathspec errors must not be retried, elapsed {elapsed:?}");
}
