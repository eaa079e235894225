use std::time::Duration;

/// Stderr fragments that indicate another process is holding a repository lock.
/// Matched case-insensitively as substrings.
const TRANSIENT_LOCK_SIGNATURES: &[&str] = &[
  "another git process",
  "index.lock",
  "unable to create",
  "resource temporarily unavailable",
  "cannot lock ref",
];

/// Returns true if the stderr text looks like transient lock contention
/// from a concurrent git process, rather than a real failure.
pub fn is_transient_lock_error(stderr: &str) -> bool {
  let lowered = stderr.to_lowercase();
  TRANSIENT_LOCK_SIGNATURES.iter().any(|signature| lowered.contains(signature))
}

/// Bounded exponential backoff for retrying lock-contended git commands.
/// Deterministic: no jitter.
#[derive(Debug, Clone, Copy)]
pub struct RetryPolicy {
  /// Total attempts, including the first one.
  pub max_attempts: u32,
  pub initial_delay: Duration,
  pub max_delay: Duration,
}

impl Default for RetryPolicy {
  fn default() -> Self {
    Self {
      max_attempts: 5,
      initial_delay: Duration::from_millis(500),
      max_delay: Duration::from_secs(10),
    }
  }
}

impl RetryPolicy {
  /// Delay to sleep after the given failed attempt (1-based).
  /// Doubles each attempt, capped at `max_delay`.
  pub fn delay_for(&self, attempt: u32) -> Duration {
    let doubled = self.initial_delay.saturating_mul(1u32 << attempt.saturating_sub(1).min(30));
    doubled.min(self.max_delay)
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn classifies_lock_contention_stderr() {
    assert!(is_transient_lock_error("fatal: Unable to create '/repo/.git/index.lock': File exists."));
    assert!(is_transient_lock_error("Another git process seems to be running in this repository"));
    assert!(is_transient_lock_error("error: cannot lock ref 'refs/heads/main'"));
    assert!(is_transient_lock_error("Resource temporarily unavailable"));
  }

  #[test]
  fn does_not_classify_ordinary_failures() {
    assert!(!is_transient_lock_error("fatal: not a git repository"));
    assert!(!is_transient_lock_error("error: pathspec 'nope.txt' did not match any files"));
    assert!(!is_transient_lock_error(""));
  }

  #[test]
  fn backoff_doubles_and_caps() {
    let policy = RetryPolicy::default();
    let delays: Vec<_> = (1..=4).map(|attempt| policy.delay_for(attempt)).collect();
    assert_eq!(
      delays,
      vec![
        Duration::from_millis(500),
        Duration::from_secs(1),
        Duration::from_secs(2),
        Duration::from_secs(4),
      ]
    );
    // Beyond the doubling range the cap takes over
    assert_eq!(policy.delay_for(5), Duration::from_secs(8));
    assert_eq!(policy.delay_for(6), Duration::from_secs(10));
    assert_eq!(policy.delay_for(20), Duration::from_secs(10));
  }
}
