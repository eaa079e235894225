use std::sync::Mutex;

/// Identity and message of the most recently created commit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LastCommit {
  pub id: String,
  pub message: String,
}

/// Session-scoped memory correlating a `create_commit` call with a later
/// `amend_commit`. Empty until the first successful create; overwritten on
/// every successful create; never persisted across processes.
#[derive(Debug, Default)]
pub struct CommitSession {
  last: Mutex<Option<LastCommit>>,
}

impl CommitSession {
  pub fn new() -> Self {
    Self::default()
  }

  /// Record the commit just created, unconditionally replacing any prior value.
  pub fn record(&self, id: String, message: String) {
    let mut guard = self.last.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
    *guard = Some(LastCommit { id, message });
  }

  pub fn last(&self) -> Option<LastCommit> {
    let guard = self.last.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
    guard.clone()
  }
}
