/// Error taxonomy for fixup operations.
///
/// Transient lock contention never appears here: it is retried inside the
/// executor and, once exhausted, surfaces as `Tool` with the captured stderr.
#[derive(Debug)]
pub enum FixupError {
  /// The operation was called in an invalid sequence (e.g. amend before any create).
  Usage(String),
  /// The remembered commit could not be resolved by identity or by message.
  CommitNotFound { id: String, message: String },
  /// A descendant's change could not be re-derived on the new parent without ambiguity.
  ReplayConflict { commit_id: String, subject: String },
  /// Any other backend failure, diagnostic text captured verbatim.
  Tool(anyhow::Error),
}

impl From<anyhow::Error> for FixupError {
  fn from(err: anyhow::Error) -> Self {
    FixupError::Tool(err)
  }
}

impl std::fmt::Display for FixupError {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    match self {
      FixupError::Usage(msg) => write!(f, "{msg}"),
      FixupError::CommitNotFound { id, message } => {
        write!(f, "Could not find commit with hash {id} or message '{message}'")
      }
      FixupError::ReplayConflict { commit_id, subject } => {
        write!(
          f,
          "Replaying commit {} ({subject}) onto the amended history would create conflicts",
          &commit_id[..commit_id.len().min(8)]
        )
      }
      FixupError::Tool(e) => write!(f, "{e}"),
    }
  }
}

impl std::error::Error for FixupError {}
